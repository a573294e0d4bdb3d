//! The announcement shown on the sign-in and sign-out screens.

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::Announcement;
use crate::store::{keys, load_json, save_json, KeyValueStore, Loaded};

/// Access to the stored announcement.
#[derive(Debug)]
pub struct AnnouncementBoard<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> AnnouncementBoard<'a, S> {
    /// Create a board over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the announcement, reporting whether it is missing or corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Loaded<Announcement>> {
        load_json(self.store, keys::ANNOUNCEMENT)
    }

    /// The current announcement, if one is set and readable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current(&self) -> Result<Option<Announcement>> {
        Ok(self
            .load()?
            .present()
            .filter(|a| !a.message.trim().is_empty()))
    }

    /// Replace the announcement.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank message, or an error if the
    /// store cannot be written.
    pub fn publish(&self, message: &str) -> Result<Announcement> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::missing("announcement message"));
        }

        let announcement = Announcement {
            message: message.to_string(),
            updated_at: Utc::now(),
        };
        save_json(self.store, keys::ANNOUNCEMENT, &announcement)?;
        info!("Published announcement");
        Ok(announcement)
    }

    /// Remove the announcement. Returns `false` if none was set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<bool> {
        self.store.remove(keys::ANNOUNCEMENT)
    }
}
