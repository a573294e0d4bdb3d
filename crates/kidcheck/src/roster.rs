//! Instructor roster.

use chrono::Utc;
use tracing::{debug, info};

use crate::collection::{find_record, upsert_record};
use crate::error::{Error, Result};
use crate::model::{instructor_id, non_blank, Draft, InstructorDetails, InstructorProfile};
use crate::store::{keys, load_json, load_or_default, save_json, KeyValueStore, Loaded};

/// The add/edit instructor form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructorForm {
    /// Id of the instructor being edited; `None` adds a new one.
    pub id: Option<String>,
    /// Full name (required).
    pub full_name: String,
    /// Role.
    pub role: Option<String>,
    /// Short bio.
    pub bio: Option<String>,
    /// Photo file name or URL.
    pub photo_url: Option<String>,
}

/// Access to the stored instructors.
#[derive(Debug)]
pub struct InstructorRoster<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> InstructorRoster<'a, S> {
    /// Create a roster over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the roster, reporting whether the entry is missing or corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Loaded<Vec<InstructorProfile>>> {
        load_json(self.store, keys::INSTRUCTORS)
    }

    /// All instructors, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<InstructorProfile>> {
        load_or_default(self.store, keys::INSTRUCTORS)
    }

    /// Instructors shown on the kiosk screens.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn active(&self) -> Result<Vec<InstructorProfile>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|i| i.details.active)
            .collect())
    }

    /// Find an instructor by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn find_by_id(&self, id: &str) -> Result<Option<InstructorProfile>> {
        find_record(self.store, keys::INSTRUCTORS, id)
    }

    /// Insert or replace an instructor by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn upsert(
        &self,
        draft: impl Into<Draft<InstructorDetails>>,
    ) -> Result<InstructorProfile> {
        let profile = upsert_record(self.store, keys::INSTRUCTORS, draft.into(), Utc::now())?;
        debug!(id = %profile.details.id, "Upserted instructor");
        Ok(profile)
    }

    /// Validate the add/edit form and store it as an active instructor.
    ///
    /// Editing keeps the instructor's id and creation time even if the name
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or one with no usable
    /// characters for an id, or an error if the store fails.
    pub fn save(&self, form: &InstructorForm) -> Result<InstructorProfile> {
        let full_name = form.full_name.trim();
        if full_name.is_empty() {
            return Err(Error::missing("instructor name"));
        }

        let id = match non_blank(form.id.as_deref()) {
            Some(id) => id,
            None => instructor_id(full_name),
        };
        if id.is_empty() {
            return Err(Error::invalid(
                "instructor name",
                "needs at least one letter or digit",
            ));
        }

        let created_at = self.find_by_id(&id)?.map(|existing| existing.created_at);
        let draft = Draft {
            details: InstructorDetails {
                id,
                full_name: full_name.to_string(),
                role: non_blank(form.role.as_deref()),
                bio: non_blank(form.bio.as_deref()),
                photo_url: non_blank(form.photo_url.as_deref()),
                active: true,
            },
            created_at,
        };

        let profile = self.upsert(draft)?;
        info!(id = %profile.details.id, "Saved instructor");
        Ok(profile)
    }

    /// Show or hide an instructor. Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn set_active(&self, id: &str, active: bool) -> Result<bool> {
        let mut instructors = self.list()?;
        let Some(instructor) = instructors.iter_mut().find(|i| i.details.id == id) else {
            return Ok(false);
        };
        instructor.details.active = active;

        save_json(self.store, keys::INSTRUCTORS, &instructors)?;
        info!(id, active, "Changed instructor visibility");
        Ok(true)
    }

    /// Remove an instructor. Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut instructors = self.list()?;
        let before = instructors.len();
        instructors.retain(|i| i.details.id != id);
        if instructors.len() == before {
            return Ok(false);
        }

        save_json(self.store, keys::INSTRUCTORS, &instructors)?;
        info!(id, "Deleted instructor");
        Ok(true)
    }
}
