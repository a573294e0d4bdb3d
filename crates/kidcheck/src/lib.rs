//! `kidcheck` - A check-in kiosk for a children's church
//!
//! This library registers children and their parents, records sign-ins and
//! sign-outs, keeps an instructor roster and an announcement, and exports
//! children and attendance as CSV. Everything is stored on the device in a
//! small key-value store.
//!
//! ```no_run
//! use kidcheck::{CheckRequest, Config, Kiosk, Registration};
//!
//! # fn main() -> kidcheck::Result<()> {
//! let kiosk = Kiosk::open(&Config::load()?)?;
//! let child = kiosk.children().register(&Registration {
//!     first_name: "Sam".into(),
//!     last_name: "Lee".into(),
//!     parent_full_name: "Jo Lee".into(),
//!     ..Registration::default()
//! })?;
//! kiosk.attendance().sign_in(&CheckRequest::new(&child.details.id))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod attendance;
pub mod bulletin;
pub mod cli;
mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod gate;
pub mod kiosk;
pub mod logging;
pub mod model;
pub mod registry;
pub mod roster;
pub mod store;

pub use attendance::{currently_checked_in, AttendanceLog, CheckRequest};
pub use bulletin::AnnouncementBoard;
pub use config::Config;
pub use error::{Error, Result};
pub use export::{children_csv, events_csv, export_file_name, write_export, ExportKind};
pub use gate::AccessGate;
pub use kiosk::{EntryHealth, Kiosk, StoreHealth};
pub use logging::init_logging;
pub use model::{
    Announcement, AttendanceEvent, ChildDetails, ChildProfile, EventKind, InstructorDetails,
    InstructorProfile,
};
pub use registry::{ChildRegistry, Registration};
pub use roster::{InstructorForm, InstructorRoster};
pub use store::{KeyValueStore, Loaded, MemoryStore, ObservedStore, SqliteStore};
