//! Attendance events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChildId, ChildProfile};

/// Whether a child was dropped off or picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Drop-off.
    SignIn,
    /// Pick-up.
    SignOut,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignIn => write!(f, "SIGN_IN"),
            Self::SignOut => write!(f, "SIGN_OUT"),
        }
    }
}

/// One sign-in or sign-out.
///
/// Child and parent names are copied at event time so the log stays
/// readable even if the profile later changes or disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    /// `<epoch millis>_<random hex>`.
    pub id: String,
    /// Sign-in or sign-out.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The child's id. Not checked against the registry once stored.
    pub child_id: ChildId,
    /// "First Last" at event time.
    pub child_name: String,
    /// Who dropped off or picked up.
    pub parent_name: String,
    /// When it happened.
    #[serde(rename = "timeISO")]
    pub time: DateTime<Utc>,
    /// Optional notes from the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AttendanceEvent {
    /// Build an event for `child` happening at `time`.
    #[must_use]
    pub fn for_child(
        kind: EventKind,
        child: &ChildProfile,
        parent_name: String,
        notes: Option<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: event_id(time),
            kind,
            child_id: child.details.id.clone(),
            child_name: child.details.display_name(),
            parent_name,
            time,
            notes,
        }
    }

    /// Whether this is a sign-in.
    #[must_use]
    pub fn is_sign_in(&self) -> bool {
        self.kind == EventKind::SignIn
    }
}

/// Generate an event id from the event time and a random suffix.
#[must_use]
pub fn event_id(time: DateTime<Utc>) -> String {
    format!("{}_{:x}", time.timestamp_millis(), rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildDetails, Draft};

    fn sample_child() -> ChildProfile {
        Draft::from(ChildDetails {
            id: "lee-sam".into(),
            first_name: "Sam".into(),
            last_name: "Lee".into(),
            parent_full_name: "Jo Lee".into(),
            ..ChildDetails::default()
        })
        .stamp(Utc::now())
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::SignIn.to_string(), "SIGN_IN");
        assert_eq!(EventKind::SignOut.to_string(), "SIGN_OUT");
    }

    #[test]
    fn test_event_kind_serializes_like_display() {
        assert_eq!(
            serde_json::to_string(&EventKind::SignIn).unwrap(),
            "\"SIGN_IN\""
        );
        assert_eq!(
            serde_json::from_str::<EventKind>("\"SIGN_OUT\"").unwrap(),
            EventKind::SignOut
        );
    }

    #[test]
    fn test_event_id_format() {
        let time = Utc::now();
        let id = event_id(time);
        let (millis, suffix) = id.split_once('_').unwrap();
        assert_eq!(millis, time.timestamp_millis().to_string());
        assert!(!suffix.is_empty());
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_event_ids_differ() {
        let time = Utc::now();
        assert_ne!(event_id(time), event_id(time));
    }

    #[test]
    fn test_for_child_copies_names() {
        let child = sample_child();
        let time = Utc::now();
        let event = AttendanceEvent::for_child(
            EventKind::SignIn,
            &child,
            "Jo Lee".into(),
            Some("bring hat".into()),
            time,
        );

        assert!(event.is_sign_in());
        assert_eq!(event.child_id, "lee-sam");
        assert_eq!(event.child_name, "Sam Lee");
        assert_eq!(event.parent_name, "Jo Lee");
        assert_eq!(event.time, time);
        assert_eq!(event.notes.as_deref(), Some("bring hat"));
    }

    #[test]
    fn test_serialize_uses_stored_field_names() {
        let event = AttendanceEvent::for_child(
            EventKind::SignOut,
            &sample_child(),
            "Jo Lee".into(),
            None,
            Utc::now(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SIGN_OUT");
        assert_eq!(json["childId"], "lee-sam");
        assert!(json.get("timeISO").is_some());
        assert!(json.get("notes").is_none());
    }
}
