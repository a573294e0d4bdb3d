//! Child registry: registration, lookup and name search.

use chrono::Utc;
use tracing::{debug, info};

use crate::collection::{find_record, upsert_record};
use crate::error::{Error, Result};
use crate::model::{child_id, non_blank, ChildDetails, ChildId, ChildProfile, Draft};
use crate::store::{keys, load_json, load_or_default, KeyValueStore, Loaded};

/// Default cap on name search results.
pub const NAME_SEARCH_LIMIT: usize = 20;

/// The first-time registration form.
///
/// Text is taken as typed; [`ChildRegistry::register`] trims it and drops
/// blank optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Child first name (required).
    pub first_name: String,
    /// Child last name (required).
    pub last_name: String,
    /// Date of birth, `yyyy-mm-dd`.
    pub dob: Option<String>,
    /// Allergy or medical notes.
    pub allergies_notes: Option<String>,
    /// Comma-separated known allergies.
    pub known_allergies: Option<String>,
    /// Photo consent.
    pub photo_capture_consent: bool,
    /// Parent/guardian full name (required).
    pub parent_full_name: String,
    /// Parent phone.
    pub parent_phone: Option<String>,
    /// Parent email.
    pub parent_email: Option<String>,
    /// Emergency contact name.
    pub emergency_contact_name: Option<String>,
    /// Emergency contact phone.
    pub emergency_contact_phone: Option<String>,
}

impl Registration {
    /// The id this form will be stored under.
    #[must_use]
    pub fn child_id(&self) -> ChildId {
        child_id(&self.first_name, &self.last_name, self.dob.as_deref())
    }

    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first blank required field.
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::missing("child first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::missing("child last name"));
        }
        if self.parent_full_name.trim().is_empty() {
            return Err(Error::missing("parent/guardian full name"));
        }
        Ok(())
    }

    fn to_details(&self) -> ChildDetails {
        ChildDetails {
            id: self.child_id(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            dob: non_blank(self.dob.as_deref()),
            allergies_notes: non_blank(self.allergies_notes.as_deref()),
            known_allergies: non_blank(self.known_allergies.as_deref()),
            photo_capture_consent: self.photo_capture_consent,
            parent_full_name: self.parent_full_name.trim().to_string(),
            parent_phone: non_blank(self.parent_phone.as_deref()),
            parent_email: non_blank(self.parent_email.as_deref()),
            emergency_contact_name: non_blank(self.emergency_contact_name.as_deref()),
            emergency_contact_phone: non_blank(self.emergency_contact_phone.as_deref()),
        }
    }
}

/// Access to the stored child profiles.
#[derive(Debug)]
pub struct ChildRegistry<'a, S: ?Sized> {
    store: &'a S,
    search_limit: usize,
}

impl<'a, S: KeyValueStore + ?Sized> ChildRegistry<'a, S> {
    /// Create a registry over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            search_limit: NAME_SEARCH_LIMIT,
        }
    }

    /// Cap name searches at `limit` results.
    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Load the profiles, reporting whether the entry is missing or corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Loaded<Vec<ChildProfile>>> {
        load_json(self.store, keys::CHILDREN)
    }

    /// All profiles, most recently registered first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<ChildProfile>> {
        load_or_default(self.store, keys::CHILDREN)
    }

    /// Insert or replace a profile by id.
    ///
    /// New ids are prepended; existing ids keep their position. The creation
    /// time is stamped if the draft has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn upsert(&self, draft: impl Into<Draft<ChildDetails>>) -> Result<ChildProfile> {
        let profile = upsert_record(self.store, keys::CHILDREN, draft.into(), Utc::now())?;
        debug!(id = %profile.details.id, "Upserted child profile");
        Ok(profile)
    }

    /// Find a profile by exact id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn find_by_id(&self, id: &str) -> Result<Option<ChildProfile>> {
        find_record(self.store, keys::CHILDREN, id)
    }

    /// Case-insensitive substring search on "first last".
    ///
    /// A blank query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn find_by_name(&self, query: &str) -> Result<Vec<ChildProfile>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.details.name_contains(&query))
            .take(self.search_limit)
            .collect())
    }

    /// Validate a registration form and store it.
    ///
    /// Registering the same name and date of birth again replaces the
    /// earlier profile.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is blank (nothing is
    /// stored), or an error if the store cannot be read or written.
    pub fn register(&self, form: &Registration) -> Result<ChildProfile> {
        form.validate()?;
        let profile = self.upsert(form.to_details())?;
        info!(id = %profile.details.id, "Registered child");
        Ok(profile)
    }
}
