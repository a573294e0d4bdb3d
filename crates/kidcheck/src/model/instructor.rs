//! Instructor roster entries.

use serde::{Deserialize, Serialize};

use super::{non_alphanumeric_runs, Keyed, Record};

/// An instructor shown to parents. Holds no contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDetails {
    /// Slug of the name at creation, see [`instructor_id`].
    pub id: String,
    /// Full name.
    pub full_name: String,
    /// e.g. "Lead teacher".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// A short line for parents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Photo file name or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Only active instructors are shown on the kiosk screens.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A stored instructor.
pub type InstructorProfile = Record<InstructorDetails>;

fn default_active() -> bool {
    true
}

impl Keyed for InstructorDetails {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Slug an instructor name: lower-case, runs of anything outside `[a-z0-9]`
/// become `-`, leading and trailing `-` dropped.
///
/// Returns an empty string for names with no usable characters.
#[must_use]
pub fn instructor_id(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    non_alphanumeric_runs()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
