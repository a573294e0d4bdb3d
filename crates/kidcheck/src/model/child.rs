//! Child profiles.

use serde::{Deserialize, Serialize};

use super::{whitespace_runs, Keyed, Record};

/// Human-readable child id, e.g. `lee-sam` or `lee-sam-2018-04-01`.
pub type ChildId = String;

/// A registered child and their parent/guardian contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildDetails {
    /// Derived from the name and date of birth, see [`child_id`].
    pub id: ChildId,
    /// Child's first name.
    #[serde(rename = "childFirstName")]
    pub first_name: String,
    /// Child's last name.
    #[serde(rename = "childLastName")]
    pub last_name: String,
    /// Date of birth, `yyyy-mm-dd`.
    #[serde(rename = "childDob", default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Free-text allergy and medical notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies_notes: Option<String>,
    /// Comma-separated known allergies, e.g. `nuts, dairy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_allergies: Option<String>,
    /// Whether the parent agreed to photos of the child.
    #[serde(default)]
    pub photo_capture_consent: bool,
    /// Parent/guardian full name.
    pub parent_full_name: String,
    /// Parent/guardian phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    /// Parent/guardian email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
    /// Emergency contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    /// Emergency contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

/// A stored child profile.
pub type ChildProfile = Record<ChildDetails>;

impl Keyed for ChildDetails {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ChildDetails {
    /// "First Last", as shown on the kiosk and copied onto events.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The known allergies as a list.
    #[must_use]
    pub fn allergy_list(&self) -> Vec<String> {
        self.known_allergies
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether `query` (already lower-cased) occurs in "first last".
    pub(crate) fn name_contains(&self, query: &str) -> bool {
        self.display_name().to_lowercase().contains(query)
    }
}

/// Derive a child id: `last-first`, plus `-dob` when a date of birth is given.
///
/// Names are trimmed and lower-cased, with whitespace runs turned into `-`.
#[must_use]
pub fn child_id(first: &str, last: &str, dob: Option<&str>) -> ChildId {
    let slug = |name: &str| {
        whitespace_runs()
            .replace_all(&name.trim().to_lowercase(), "-")
            .into_owned()
    };

    let mut id = format!("{}-{}", slug(last), slug(first));
    if let Some(dob) = dob.map(str::trim).filter(|d| !d.is_empty()) {
        id.push('-');
        id.push_str(dob);
    }
    id
}
