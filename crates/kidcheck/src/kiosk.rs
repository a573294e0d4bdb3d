//! The kiosk: one store and the views over it.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::attendance::AttendanceLog;
use crate::bulletin::AnnouncementBoard;
use crate::config::{Config, DEFAULT_TEAM_PIN};
use crate::error::Result;
use crate::gate::AccessGate;
use crate::model::{Announcement, AttendanceEvent, ChildProfile, InstructorProfile};
use crate::registry::{ChildRegistry, NAME_SEARCH_LIMIT};
use crate::roster::InstructorRoster;
use crate::store::{keys, load_json, KeyValueStore, Loaded, ObservedStore, SqliteStore, StoreChange};

/// State of one stored entry, as reported by [`Kiosk::health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryHealth {
    /// Nothing stored.
    Absent,
    /// Parsed; `items` is the collection length (1 for a single value).
    Ok {
        /// Number of items.
        items: usize,
    },
    /// Stored but unreadable.
    Corrupt {
        /// Parser message.
        reason: String,
    },
}

impl EntryHealth {
    fn of_list<T>(loaded: Loaded<Vec<T>>) -> Self {
        match loaded {
            Loaded::Absent => Self::Absent,
            Loaded::Present(items) => Self::Ok { items: items.len() },
            Loaded::Corrupt { reason } => Self::Corrupt { reason },
        }
    }

    fn of_value<T>(loaded: Loaded<T>) -> Self {
        match loaded {
            Loaded::Absent => Self::Absent,
            Loaded::Present(_) => Self::Ok { items: 1 },
            Loaded::Corrupt { reason } => Self::Corrupt { reason },
        }
    }

    /// Whether the entry failed to parse.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Per-entry health of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    /// Child profiles.
    pub children: EntryHealth,
    /// Attendance events.
    pub events: EntryHealth,
    /// Instructor roster.
    pub instructors: EntryHealth,
    /// Announcement.
    pub announcement: EntryHealth,
}

impl StoreHealth {
    /// Whether any entry failed to parse.
    #[must_use]
    pub fn has_corruption(&self) -> bool {
        [
            &self.children,
            &self.events,
            &self.instructors,
            &self.announcement,
        ]
        .iter()
        .any(|e| e.is_corrupt())
    }
}

/// A kiosk over a store, with change notifications.
#[derive(Debug)]
pub struct Kiosk<S> {
    store: ObservedStore<S>,
    default_pin: String,
    search_limit: usize,
}

impl Kiosk<SqliteStore> {
    /// Open the kiosk database named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(config.database_path())?;
        info!(path = %store.path().display(), "Opened kiosk");
        Ok(Self::with_config(store, config))
    }
}

impl<S: KeyValueStore> Kiosk<S> {
    /// A kiosk over `store` with default settings.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store: ObservedStore::new(store),
            default_pin: DEFAULT_TEAM_PIN.to_string(),
            search_limit: NAME_SEARCH_LIMIT,
        }
    }

    /// A kiosk over `store` using the access and search settings in `config`.
    #[must_use]
    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store: ObservedStore::new(store),
            default_pin: config.access.default_pin.clone(),
            search_limit: config.kiosk.search_limit,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        self.store.inner()
    }

    /// Receive every write made through this kiosk from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    /// Registered children.
    #[must_use]
    pub fn children(&self) -> ChildRegistry<'_, ObservedStore<S>> {
        ChildRegistry::new(&self.store).with_search_limit(self.search_limit)
    }

    /// Sign-ins and sign-outs.
    #[must_use]
    pub fn attendance(&self) -> AttendanceLog<'_, ObservedStore<S>> {
        AttendanceLog::new(&self.store)
    }

    /// Instructor roster.
    #[must_use]
    pub fn instructors(&self) -> InstructorRoster<'_, ObservedStore<S>> {
        InstructorRoster::new(&self.store)
    }

    /// Announcement board.
    #[must_use]
    pub fn announcements(&self) -> AnnouncementBoard<'_, ObservedStore<S>> {
        AnnouncementBoard::new(&self.store)
    }

    /// Team access gate.
    #[must_use]
    pub fn gate(&self) -> AccessGate<'_, ObservedStore<S>> {
        AccessGate::new(&self.store).with_default_pin(&self.default_pin)
    }

    /// Hand the checked-in list to `render` on every tick of `every`, and
    /// straight away after a write to children or events made through this
    /// kiosk. The first tick is immediate.
    ///
    /// Writes from other processes sharing the database are only picked up
    /// on the next tick; the change feed covers callers that share this
    /// `Kiosk`, including `render` itself.
    ///
    /// Returns when `shutdown` completes or `render` breaks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn watch_checked_in<F>(
        &self,
        every: Duration,
        shutdown: impl Future<Output = ()>,
        mut render: F,
    ) -> Result<()>
    where
        F: FnMut(&[AttendanceEvent]) -> ControlFlow<()>,
    {
        let mut changes = self.subscribe();
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                change = changes.recv() => match change {
                    Ok(change) if change.key == keys::EVENTS || change.key == keys::CHILDREN => {
                        debug!(key = %change.key, "Store changed, refreshing");
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed store changes, refreshing");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                },
                () = &mut shutdown => return Ok(()),
            }

            if render(&self.attendance().checked_in()?).is_break() {
                return Ok(());
            }
        }
    }

    /// Remove all children and attendance events.
    ///
    /// Instructors, the announcement and team access are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_all(&self) -> Result<()> {
        self.store.remove(keys::CHILDREN)?;
        self.store.remove(keys::EVENTS)?;
        info!("Cleared children and attendance");
        Ok(())
    }

    /// Check that every stored entry parses.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn health(&self) -> Result<StoreHealth> {
        Ok(StoreHealth {
            children: EntryHealth::of_list(load_json::<_, Vec<ChildProfile>>(
                &self.store,
                keys::CHILDREN,
            )?),
            events: EntryHealth::of_list(load_json::<_, Vec<AttendanceEvent>>(
                &self.store,
                keys::EVENTS,
            )?),
            instructors: EntryHealth::of_list(load_json::<_, Vec<InstructorProfile>>(
                &self.store,
                keys::INSTRUCTORS,
            )?),
            announcement: EntryHealth::of_value(load_json::<_, Announcement>(
                &self.store,
                keys::ANNOUNCEMENT,
            )?),
        })
    }
}
