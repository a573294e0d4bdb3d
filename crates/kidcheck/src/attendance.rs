//! Attendance log: sign-in/sign-out events and the "here now" view.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{non_blank, AttendanceEvent, EventKind};
use crate::registry::ChildRegistry;
use crate::store::{keys, load_json, load_or_default, save_json, KeyValueStore, Loaded};

/// A sign-in or sign-out as entered at the kiosk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRequest {
    /// The child's id.
    pub child_id: String,
    /// Who is dropping off or picking up. Defaults to the registered parent.
    pub parent_name: Option<String>,
    /// Optional notes.
    pub notes: Option<String>,
}

impl CheckRequest {
    /// A request for `child_id` with no parent override or notes.
    #[must_use]
    pub fn new(child_id: impl Into<String>) -> Self {
        Self {
            child_id: child_id.into(),
            ..Self::default()
        }
    }
}

/// Access to the stored attendance events.
#[derive(Debug)]
pub struct AttendanceLog<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> AttendanceLog<'a, S> {
    /// Create a log over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the events, reporting whether the entry is missing or corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Loaded<Vec<AttendanceEvent>>> {
        load_json(self.store, keys::EVENTS)
    }

    /// All events, most recently recorded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<AttendanceEvent>> {
        load_or_default(self.store, keys::EVENTS)
    }

    /// Record an event at the front of the log.
    ///
    /// The child id is not checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn append(&self, event: AttendanceEvent) -> Result<()> {
        let mut events = self.list()?;
        debug!(id = %event.id, kind = %event.kind, child = %event.child_id, "Appending event");
        events.insert(0, event);
        save_json(self.store, keys::EVENTS, &events)
    }

    /// Children whose latest event is a sign-in, latest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn checked_in(&self) -> Result<Vec<AttendanceEvent>> {
        Ok(currently_checked_in(&self.list()?))
    }

    /// Sign a registered child in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChildNotFound`] if the id is blank or unknown (no
    /// event is recorded), or an error if the store fails.
    pub fn sign_in(&self, request: &CheckRequest) -> Result<AttendanceEvent> {
        self.record(EventKind::SignIn, request)
    }

    /// Sign a registered child out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChildNotFound`] if the id is blank or unknown (no
    /// event is recorded), or an error if the store fails.
    pub fn sign_out(&self, request: &CheckRequest) -> Result<AttendanceEvent> {
        self.record(EventKind::SignOut, request)
    }

    fn record(&self, kind: EventKind, request: &CheckRequest) -> Result<AttendanceEvent> {
        let id = request.child_id.trim();
        let child = if id.is_empty() {
            None
        } else {
            ChildRegistry::new(self.store).find_by_id(id)?
        };
        let Some(child) = child else {
            return Err(Error::child_not_found(id));
        };

        let parent_name = non_blank(request.parent_name.as_deref())
            .unwrap_or_else(|| child.details.parent_full_name.clone());
        let notes = non_blank(request.notes.as_deref());

        let event = AttendanceEvent::for_child(kind, &child, parent_name, notes, Utc::now());
        self.append(event.clone())?;

        info!(kind = %kind, child = %event.child_id, "Recorded attendance");
        Ok(event)
    }
}

/// Reduce a newest-first event list to the children currently signed in.
///
/// A child's latest event is the one with the greatest timestamp; among
/// equal timestamps the one recorded last wins. Children whose latest event
/// is a sign-in are returned, latest first.
///
/// This is not the same as taking each child's first event in the list.
/// When an event is appended with an older timestamp than one already
/// recorded (a late entry, or a clock change), the list order says the late
/// entry is newest but this reduction still follows the timestamps.
#[must_use]
pub fn currently_checked_in(events: &[AttendanceEvent]) -> Vec<AttendanceEvent> {
    let mut latest: Vec<&AttendanceEvent> = Vec::new();
    let mut slot_by_child: HashMap<&str, usize> = HashMap::new();

    for event in events {
        match slot_by_child.get(event.child_id.as_str()) {
            Some(&slot) => {
                if event.time > latest[slot].time {
                    latest[slot] = event;
                }
            }
            None => {
                slot_by_child.insert(event.child_id.as_str(), latest.len());
                latest.push(event);
            }
        }
    }

    let mut here: Vec<AttendanceEvent> = latest
        .into_iter()
        .filter(|e| e.is_sign_in())
        .cloned()
        .collect();
    here.sort_by(|a, b| b.time.cmp(&a.time));
    here
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChildDetails;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 14, 10, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn event(kind: EventKind, child: &str, minute: i64) -> AttendanceEvent {
        AttendanceEvent {
            id: format!("{child}-{minute}"),
            kind,
            child_id: child.into(),
            child_name: child.to_uppercase(),
            parent_name: "Parent".into(),
            time: at(minute),
            notes: None,
        }
    }

    fn register(store: &MemoryStore, id: &str, first: &str, last: &str) {
        ChildRegistry::new(store)
            .upsert(ChildDetails {
                id: id.into(),
                first_name: first.into(),
                last_name: last.into(),
                parent_full_name: "Jo Lee".into(),
                ..ChildDetails::default()
            })
            .unwrap();
    }

    #[test]
    fn test_append_prepends() {
        let store = MemoryStore::new();
        let log = AttendanceLog::new(&store);
        log.append(event(EventKind::SignIn, "a", 0)).unwrap();
        log.append(event(EventKind::SignIn, "b", 1)).unwrap();

        let events = log.list().unwrap();
        assert_eq!(events[0].child_id, "b");
        assert_eq!(events[1].child_id, "a");
    }

    #[test]
    fn test_append_does_not_dedupe() {
        let store = MemoryStore::new();
        let log = AttendanceLog::new(&store);
        let e = event(EventKind::SignIn, "a", 0);
        log.append(e.clone()).unwrap();
        log.append(e).unwrap();

        assert_eq!(log.list().unwrap().len(), 2);
    }

    #[test]
    fn test_checked_in_excludes_signed_out() {
        let store = MemoryStore::new();
        let log = AttendanceLog::new(&store);
        log.append(event(EventKind::SignIn, "a", 0)).unwrap();
        log.append(event(EventKind::SignIn, "b", 1)).unwrap();
        log.append(event(EventKind::SignOut, "a", 2)).unwrap();

        let here = log.checked_in().unwrap();
        assert_eq!(here.len(), 1);
        assert_eq!(here[0].child_id, "b");
    }

    #[test]
    fn test_checked_in_sorted_latest_first() {
        let events = vec![
            event(EventKind::SignIn, "c", 5),
            event(EventKind::SignIn, "a", 9),
            event(EventKind::SignIn, "b", 7),
        ];
        let ids: Vec<_> = currently_checked_in(&events)
            .into_iter()
            .map(|e| e.child_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_checked_in_signed_back_in() {
        // Newest first: a signed in, out, and in again.
        let events = vec![
            event(EventKind::SignIn, "a", 30),
            event(EventKind::SignOut, "a", 20),
            event(EventKind::SignIn, "a", 10),
        ];
        let here = currently_checked_in(&events);
        assert_eq!(here.len(), 1);
        assert_eq!(here[0].time, at(30));
    }

    #[test]
    fn test_checked_in_uses_timestamps_over_insertion_order() {
        // A late-recorded sign-in that happened before the sign-out.
        let events = vec![
            event(EventKind::SignIn, "a", 0),
            event(EventKind::SignOut, "a", 15),
        ];
        assert!(currently_checked_in(&events).is_empty());
    }

    #[test]
    fn test_checked_in_tie_prefers_latest_recorded() {
        let events = vec![
            event(EventKind::SignOut, "a", 5),
            event(EventKind::SignIn, "a", 5),
        ];
        assert!(currently_checked_in(&events).is_empty());
    }

    #[test]
    fn test_checked_in_empty() {
        assert!(currently_checked_in(&[]).is_empty());
    }

    #[test]
    fn test_sign_in_records_event() {
        let store = MemoryStore::new();
        register(&store, "lee-sam", "Sam", "Lee");
        let log = AttendanceLog::new(&store);

        let event = log.sign_in(&CheckRequest::new(" lee-sam ")).unwrap();
        assert_eq!(event.kind, EventKind::SignIn);
        assert_eq!(event.child_id, "lee-sam");
        assert_eq!(event.child_name, "Sam Lee");
        assert_eq!(event.parent_name, "Jo Lee");
        assert!(event.notes.is_none());

        assert_eq!(log.list().unwrap(), vec![event]);
    }

    #[test]
    fn test_sign_out_uses_given_parent_and_notes() {
        let store = MemoryStore::new();
        register(&store, "lee-sam", "Sam", "Lee");
        let log = AttendanceLog::new(&store);

        let request = CheckRequest {
            child_id: "lee-sam".into(),
            parent_name: Some(" Grandma Lee ".into()),
            notes: Some("  left early ".into()),
        };
        let event = log.sign_out(&request).unwrap();
        assert_eq!(event.kind, EventKind::SignOut);
        assert_eq!(event.parent_name, "Grandma Lee");
        assert_eq!(event.notes.as_deref(), Some("left early"));
    }

    #[test]
    fn test_sign_in_blank_parent_falls_back() {
        let store = MemoryStore::new();
        register(&store, "lee-sam", "Sam", "Lee");
        let log = AttendanceLog::new(&store);

        let request = CheckRequest {
            child_id: "lee-sam".into(),
            parent_name: Some("   ".into()),
            notes: Some("".into()),
        };
        let event = log.sign_in(&request).unwrap();
        assert_eq!(event.parent_name, "Jo Lee");
        assert!(event.notes.is_none());
    }

    #[test]
    fn test_sign_in_unknown_child_records_nothing() {
        let store = MemoryStore::new();
        let log = AttendanceLog::new(&store);

        let err = log.sign_in(&CheckRequest::new("nobody")).unwrap_err();
        assert!(err.is_not_found());
        let err = log.sign_out(&CheckRequest::new("  ")).unwrap_err();
        assert!(err.is_not_found());

        assert!(log.list().unwrap().is_empty());
        assert_eq!(log.load().unwrap(), Loaded::Absent);
    }

    #[test]
    fn test_events_survive_deleted_child() {
        let store = MemoryStore::new();
        let log = AttendanceLog::new(&store);
        log.append(event(EventKind::SignIn, "gone", 0)).unwrap();

        let here = log.checked_in().unwrap();
        assert_eq!(here[0].child_id, "gone");
    }
}
