//! The announcement for parents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The message shown to parents on the sign-in and sign-out screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Message text.
    pub message: String,
    /// When the message was last published.
    #[serde(rename = "updatedAtISO")]
    pub updated_at: DateTime<Utc>,
}
