//! Command-line interface for kidcheck.
//!
//! This module provides the CLI structure for the `kidcheck` binary. Each
//! subcommand stands in for one kiosk screen.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnnouncementCommand, CheckCommand, ClearCommand, ConfigCommand, ExportCommand,
    ExportKindArg, InstructorArgs, InstructorCommand, ListCommand, OutputFormat, PinCommand,
    PresentCommand, RegisterCommand, SearchCommand, StatusCommand, UnlockCommand,
};

use crate::logging::Verbosity;

/// kidcheck - Children's church check-in kiosk
///
/// Register children, sign them in and out, and keep the team's roster,
/// announcement and exports on this device.
#[derive(Debug, Parser)]
#[command(name = "kidcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands that work on the kiosk's stored data
    #[command(flatten)]
    Kiosk(KioskCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that open the kiosk database.
#[derive(Debug, Subcommand)]
pub enum KioskCommand {
    /// Register a child (first visit)
    Register(RegisterCommand),

    /// Find registered children by name
    Search(SearchCommand),

    /// Sign a child in
    SignIn(CheckCommand),

    /// Sign a child out
    SignOut(CheckCommand),

    /// List the children currently signed in
    Present(PresentCommand),

    /// Show or change the announcement
    #[command(subcommand)]
    Announcement(AnnouncementCommand),

    /// Manage the instructor roster
    #[command(subcommand)]
    Instructors(InstructorCommand),

    /// List registered children (team only)
    Children(ListCommand),

    /// List sign-in and sign-out events (team only)
    Events(ListCommand),

    /// Export children or attendance as CSV (team only)
    Export(ExportCommand),

    /// Unlock the team area
    Unlock(UnlockCommand),

    /// Lock the team area
    Lock,

    /// Manage the team PIN
    #[command(subcommand)]
    Pin(PinCommand),

    /// Delete all children and attendance events (team only)
    Clear(ClearCommand),

    /// Show store status
    Status(StatusCommand),

    /// Show the public kiosk URL encoded by the QR code
    Qr,
}

impl KioskCommand {
    /// Whether the command changes or reveals team-only data.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        match self {
            Self::Children(_)
            | Self::Events(_)
            | Self::Export(_)
            | Self::Clear(_)
            | Self::Pin(_) => true,
            Self::Announcement(cmd) => !matches!(cmd, AnnouncementCommand::Show),
            Self::Instructors(cmd) => !matches!(cmd, InstructorCommand::List { all: false, .. }),
            Self::Register(_)
            | Self::Search(_)
            | Self::SignIn(_)
            | Self::SignOut(_)
            | Self::Present(_)
            | Self::Unlock(_)
            | Self::Lock
            | Self::Status(_)
            | Self::Qr => false,
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn parse_kiosk(args: &[&str]) -> KioskCommand {
        match parse(args).command {
            Command::Kiosk(cmd) => cmd,
            Command::Config(cmd) => panic!("expected a kiosk command, got {cmd:?}"),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "kidcheck");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["kidcheck", "-q", "qr"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["kidcheck", "qr"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["kidcheck", "-v", "qr"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["kidcheck", "-vv", "qr"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_register() {
        let cmd = parse_kiosk(&[
            "kidcheck", "register", "--first", "Sam", "--last", "Lee", "--parent", "Jo Lee",
            "--allergies", "nuts", "--photo-consent",
        ]);
        let KioskCommand::Register(cmd) = cmd else {
            panic!("expected register");
        };
        assert_eq!(cmd.first_name, "Sam");
        assert_eq!(cmd.allergies.as_deref(), Some("nuts"));
        assert!(cmd.photo_consent);
    }

    #[test]
    fn test_register_requires_parent() {
        let result = Cli::try_parse_from(["kidcheck", "register", "--first", "Sam", "--last", "Lee"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_sign_in_and_out() {
        let cmd = parse_kiosk(&["kidcheck", "sign-in", "lee-sam", "--notes", "nap at 11"]);
        let KioskCommand::SignIn(cmd) = cmd else {
            panic!("expected sign-in");
        };
        assert_eq!(cmd.child_id, "lee-sam");
        assert_eq!(cmd.notes.as_deref(), Some("nap at 11"));

        let cmd = parse_kiosk(&["kidcheck", "sign-out", "lee-sam", "-p", "Grandma"]);
        assert!(matches!(cmd, KioskCommand::SignOut(ref c) if c.parent.as_deref() == Some("Grandma")));
    }

    #[test]
    fn test_parse_present_watch() {
        let cmd = parse_kiosk(&["kidcheck", "present", "--watch"]);
        assert!(matches!(cmd, KioskCommand::Present(PresentCommand { watch: true, .. })));
    }

    #[test]
    fn test_parse_export() {
        let cmd = parse_kiosk(&["kidcheck", "export", "attendance", "-o", "/tmp/out"]);
        let KioskCommand::Export(cmd) = cmd else {
            panic!("expected export");
        };
        assert_eq!(cmd.kind, ExportKindArg::Attendance);
        assert_eq!(cmd.output, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_pin_set() {
        let cmd = parse_kiosk(&["kidcheck", "pin", "set", "4321"]);
        assert!(matches!(cmd, KioskCommand::Pin(PinCommand::Set { ref pin }) if pin == "4321"));
    }

    #[test]
    fn test_parse_config_commands() {
        let cli = parse(&["kidcheck", "config", "validate", "-f", "/tmp/c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
        assert!(matches!(
            parse(&["kidcheck", "config", "path"]).command,
            Command::Config(ConfigCommand::Path)
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["kidcheck", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_admin_commands() {
        assert!(parse_kiosk(&["kidcheck", "children"]).is_admin());
        assert!(parse_kiosk(&["kidcheck", "export", "children"]).is_admin());
        assert!(parse_kiosk(&["kidcheck", "clear", "--yes"]).is_admin());
        assert!(parse_kiosk(&["kidcheck", "announcement", "set", "hi"]).is_admin());
        assert!(parse_kiosk(&["kidcheck", "instructors", "list", "--all"]).is_admin());
        assert!(parse_kiosk(&["kidcheck", "instructors", "hide", "grace"]).is_admin());

        assert!(!parse_kiosk(&["kidcheck", "announcement", "show"]).is_admin());
        assert!(!parse_kiosk(&["kidcheck", "instructors", "list"]).is_admin());
        assert!(!parse_kiosk(&["kidcheck", "sign-in", "lee-sam"]).is_admin());
        assert!(!parse_kiosk(&["kidcheck", "unlock", "1234"]).is_admin());
        assert!(!parse_kiosk(&["kidcheck", "present"]).is_admin());
    }
}
