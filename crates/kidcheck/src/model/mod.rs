//! Kiosk data model.
//!
//! Field names on the wire are camelCase so a store written by one kiosk
//! build stays readable by the next.

mod announcement;
mod child;
mod event;
mod instructor;

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use announcement::Announcement;
pub use child::{child_id, ChildDetails, ChildId, ChildProfile};
pub use event::{event_id, AttendanceEvent, EventKind};
pub use instructor::{instructor_id, InstructorDetails, InstructorProfile};

/// Details that are stored under a unique id.
pub trait Keyed {
    /// The id entries are upserted by.
    fn id(&self) -> &str;
}

/// Stored details plus their creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<D> {
    /// The stored details.
    #[serde(flatten)]
    pub details: D,
    /// When the entry was first saved.
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
}

impl<D: Keyed> Record<D> {
    /// The record id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.details.id()
    }
}

impl<D> Record<D> {
    /// Turn the record back into a draft that keeps its creation time.
    #[must_use]
    pub fn into_draft(self) -> Draft<D> {
        Draft {
            details: self.details,
            created_at: Some(self.created_at),
        }
    }
}

/// Details about to be upserted. A missing creation time is stamped on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft<D> {
    /// The details to store.
    pub details: D,
    /// Creation time to keep, if known.
    pub created_at: Option<DateTime<Utc>>,
}

impl<D> Draft<D> {
    /// Stamp the draft, using `now` if it has no creation time.
    #[must_use]
    pub fn stamp(self, now: DateTime<Utc>) -> Record<D> {
        Record {
            details: self.details,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl<D> From<D> for Draft<D> {
    fn from(details: D) -> Self {
        Self {
            details,
            created_at: None,
        }
    }
}

/// Up to two upper-cased initials for an avatar placeholder.
///
/// Blank names get the kiosk's own initials, `CK`.
#[must_use]
pub fn initials(full_name: &str) -> String {
    let letters: String = full_name
        .split_whitespace()
        .take(2)
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "CK".to_string()
    } else {
        letters
    }
}

/// Trim `value`, mapping blank input to `None`.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn non_alphanumeric_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}
