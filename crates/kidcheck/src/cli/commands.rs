//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::attendance::CheckRequest;
use crate::export::ExportKind;
use crate::registry::Registration;
use crate::roster::InstructorForm;

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Child's first name
    #[arg(long = "first")]
    pub first_name: String,

    /// Child's last name
    #[arg(long = "last")]
    pub last_name: String,

    /// Date of birth (yyyy-mm-dd)
    #[arg(long)]
    pub dob: Option<String>,

    /// Allergy or medical notes
    #[arg(long)]
    pub allergies_notes: Option<String>,

    /// Known allergies, comma separated (e.g. "nuts, dairy")
    #[arg(long)]
    pub allergies: Option<String>,

    /// The parent agrees to photos of the child
    #[arg(long)]
    pub photo_consent: bool,

    /// Parent/guardian full name
    #[arg(long = "parent")]
    pub parent_full_name: String,

    /// Parent/guardian phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Parent/guardian email
    #[arg(long)]
    pub email: Option<String>,

    /// Emergency contact name
    #[arg(long)]
    pub emergency_name: Option<String>,

    /// Emergency contact phone
    #[arg(long)]
    pub emergency_phone: Option<String>,
}

impl RegisterCommand {
    /// The registration form these arguments describe.
    #[must_use]
    pub fn to_registration(&self) -> Registration {
        Registration {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            dob: self.dob.clone(),
            allergies_notes: self.allergies_notes.clone(),
            known_allergies: self.allergies.clone(),
            photo_capture_consent: self.photo_consent,
            parent_full_name: self.parent_full_name.clone(),
            parent_phone: self.phone.clone(),
            parent_email: self.email.clone(),
            emergency_contact_name: self.emergency_name.clone(),
            emergency_contact_phone: self.emergency_phone.clone(),
        }
    }
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Part of the child's name
    pub query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Sign-in and sign-out arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// The child's id (see `kidcheck search`)
    pub child_id: String,

    /// Who is dropping off or picking up (defaults to the registered parent)
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Notes for the team
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl CheckCommand {
    /// The request these arguments describe.
    #[must_use]
    pub fn to_request(&self) -> CheckRequest {
        CheckRequest {
            child_id: self.child_id.clone(),
            parent_name: self.parent.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Present command arguments.
#[derive(Debug, Args)]
pub struct PresentCommand {
    /// Keep the list on screen and refresh it as children come and go
    #[arg(short, long)]
    pub watch: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Announcement commands.
#[derive(Debug, Subcommand)]
pub enum AnnouncementCommand {
    /// Show the current announcement
    Show,

    /// Replace the announcement
    Set {
        /// Message shown to parents
        message: String,
    },

    /// Remove the announcement
    Clear,
}

/// Instructor roster commands.
#[derive(Debug, Subcommand)]
pub enum InstructorCommand {
    /// List instructors
    List {
        /// Include hidden instructors
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add an instructor, or edit one with --id
    Save(InstructorArgs),

    /// Show an instructor on the kiosk screens
    Show {
        /// Instructor id
        id: String,
    },

    /// Hide an instructor from the kiosk screens
    Hide {
        /// Instructor id
        id: String,
    },

    /// Remove an instructor
    Remove {
        /// Instructor id
        id: String,
    },
}

/// Instructor form arguments.
#[derive(Debug, Args)]
pub struct InstructorArgs {
    /// Id of the instructor to edit
    #[arg(long)]
    pub id: Option<String>,

    /// Full name
    #[arg(long = "name")]
    pub full_name: String,

    /// Role (e.g. "Lead teacher")
    #[arg(long)]
    pub role: Option<String>,

    /// Short bio
    #[arg(long)]
    pub bio: Option<String>,

    /// Photo file name or URL
    #[arg(long)]
    pub photo: Option<String>,
}

impl InstructorArgs {
    /// The form these arguments describe.
    #[must_use]
    pub fn to_form(&self) -> InstructorForm {
        InstructorForm {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
            bio: self.bio.clone(),
            photo_url: self.photo.clone(),
        }
    }
}

/// Listing command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// What to export
    #[arg(value_enum)]
    pub kind: ExportKindArg,

    /// Directory to write to (defaults to the configured export directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print the CSV instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Unlock command arguments.
#[derive(Debug, Args)]
pub struct UnlockCommand {
    /// Team PIN
    pub pin: String,
}

/// Team PIN commands.
#[derive(Debug, Subcommand)]
pub enum PinCommand {
    /// Set a new team PIN
    Set {
        /// The new PIN
        pin: String,
    },

    /// Forget the stored PIN and lock the team area
    Reset,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Export kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKindArg {
    /// Child profiles
    Children,
    /// Sign-in and sign-out events
    Attendance,
}

impl From<ExportKindArg> for ExportKind {
    fn from(arg: ExportKindArg) -> Self {
        match arg {
            ExportKindArg::Children => Self::Children,
            ExportKindArg::Attendance => Self::Attendance,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
