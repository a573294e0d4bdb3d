//! `kidcheck` - CLI for the check-in kiosk
//!
//! Each subcommand takes the place of one kiosk screen: registration,
//! sign-in, sign-out, the team's admin area and the QR page.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use tracing::warn;

use kidcheck::cli::{
    AnnouncementCommand, CheckCommand, Cli, Command, ConfigCommand, ExportCommand,
    InstructorCommand, KioskCommand, ListCommand, OutputFormat, PinCommand, PresentCommand,
    SearchCommand,
};
use kidcheck::model::initials;
use kidcheck::{
    children_csv, events_csv, init_logging, write_export, AttendanceEvent, ChildProfile, Config,
    ExportKind, InstructorProfile, Kiosk, SqliteStore,
};

type Result<T> = anyhow::Result<T>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let Cli {
        config: config_path,
        command,
        ..
    } = cli;

    // Load configuration
    let config = Config::load_from(config_path.clone())?;

    match command {
        Command::Config(config_cmd) => handle_config(&config, config_path.as_deref(), config_cmd),
        Command::Kiosk(kiosk_cmd) => run(&config, kiosk_cmd),
    }
}

fn run(config: &Config, command: KioskCommand) -> Result<()> {
    let kiosk = Kiosk::open(config)?;

    if command.is_admin() && config.access.require_unlock {
        kiosk
            .gate()
            .ensure_unlocked()
            .context("this command is for the team")?;
    }

    match command {
        KioskCommand::Register(cmd) => {
            let child = kiosk.children().register(&cmd.to_registration())?;
            println!(
                "Registered {} as {}",
                child.details.display_name(),
                child.details.id
            );
            print_allergies(&child);
            println!("Sign in with: kidcheck sign-in {}", child.details.id);
            Ok(())
        }
        KioskCommand::Search(cmd) => handle_search(&kiosk, &cmd),
        KioskCommand::SignIn(cmd) => handle_check(&kiosk, &cmd, true),
        KioskCommand::SignOut(cmd) => handle_check(&kiosk, &cmd, false),
        KioskCommand::Present(cmd) => handle_present(&kiosk, config, &cmd),
        KioskCommand::Announcement(cmd) => handle_announcement(&kiosk, cmd),
        KioskCommand::Instructors(cmd) => handle_instructors(&kiosk, cmd),
        KioskCommand::Children(cmd) => handle_children(&kiosk, &cmd),
        KioskCommand::Events(cmd) => handle_events(&kiosk, &cmd),
        KioskCommand::Export(cmd) => handle_export(&kiosk, config, &cmd),
        KioskCommand::Unlock(cmd) => {
            if !kiosk.gate().unlock(&cmd.pin)? {
                bail!("incorrect PIN");
            }
            println!("Team area unlocked.");
            Ok(())
        }
        KioskCommand::Lock => {
            kiosk.gate().lock()?;
            println!("Team area locked.");
            Ok(())
        }
        KioskCommand::Pin(PinCommand::Set { pin }) => {
            kiosk.gate().set_pin(&pin)?;
            println!("Team PIN changed.");
            Ok(())
        }
        KioskCommand::Pin(PinCommand::Reset) => {
            kiosk.gate().reset()?;
            println!("Team PIN reset to the default. The team area is locked.");
            Ok(())
        }
        KioskCommand::Clear(cmd) => {
            if cmd.yes {
                kiosk.clear_all()?;
                println!("All children and attendance events deleted.");
            } else {
                println!("This deletes every registered child and attendance event.");
                println!("Instructors, the announcement and the team PIN are kept.");
                println!("Use --yes to confirm.");
            }
            Ok(())
        }
        KioskCommand::Status(cmd) => handle_status(&kiosk, cmd.json),
        KioskCommand::Qr => {
            println!("{}", config.kiosk.site_url);
            Ok(())
        }
    }
}

fn handle_search(kiosk: &Kiosk<SqliteStore>, cmd: &SearchCommand) -> Result<()> {
    let matches = kiosk.children().find_by_name(&cmd.query)?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
        OutputFormat::Table => {
            if matches.is_empty() {
                println!("No children found. If this is the first visit, please register first.");
            }
            for child in &matches {
                let d = &child.details;
                println!(
                    "{:<28} {:<24} parent: {}",
                    d.id,
                    d.display_name(),
                    d.parent_full_name
                );
            }
        }
    }
    Ok(())
}

fn handle_check(kiosk: &Kiosk<SqliteStore>, cmd: &CheckCommand, sign_in: bool) -> Result<()> {
    let request = cmd.to_request();
    let event = if sign_in {
        kiosk.attendance().sign_in(&request)?
    } else {
        kiosk.attendance().sign_out(&request)?
    };

    let verb = if sign_in { "Signed in" } else { "Signed out" };
    println!(
        "{verb} {} at {} ({})",
        event.child_name,
        clock(event.time),
        event.parent_name
    );

    if sign_in {
        if let Some(child) = kiosk.children().find_by_id(&event.child_id)? {
            print_allergies(&child);
        }
    }

    if let Some(announcement) = kiosk.announcements().current()? {
        println!();
        println!("Announcement: {}", announcement.message);
    }

    let instructors = kiosk.instructors().active()?;
    if !instructors.is_empty() {
        println!();
        println!("Today's team:");
        for instructor in &instructors {
            print_instructor(instructor);
        }
    }
    Ok(())
}

fn handle_present(
    kiosk: &Kiosk<SqliteStore>,
    config: &Config,
    cmd: &PresentCommand,
) -> Result<()> {
    if !cmd.watch {
        return print_present(kiosk, cmd.format);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the watch loop")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let format = cmd.format;
    runtime.block_on(kiosk.watch_checked_in(config.refresh_interval(), shutdown, |here| {
        if format == OutputFormat::Table {
            // Clear the terminal and home the cursor.
            print!("\x1b[2J\x1b[H");
        }
        match print_checked_in(here, format) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                warn!(error = %e, "Cannot print the checked-in list");
                ControlFlow::Break(())
            }
        }
    }))?;
    Ok(())
}

fn print_present(kiosk: &Kiosk<SqliteStore>, format: OutputFormat) -> Result<()> {
    print_checked_in(&kiosk.attendance().checked_in()?, format)
}

fn print_checked_in(here: &[AttendanceEvent], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(here)?),
        OutputFormat::Table => {
            println!("Checked in now: {}", here.len());
            println!("---------------");
            for event in here {
                println!(
                    "{}  {:<24} {:<28} by {}",
                    clock(event.time),
                    event.child_name,
                    event.child_id,
                    event.parent_name
                );
            }
        }
    }
    Ok(())
}

fn handle_announcement(kiosk: &Kiosk<SqliteStore>, cmd: AnnouncementCommand) -> Result<()> {
    let board = kiosk.announcements();
    match cmd {
        AnnouncementCommand::Show => match board.current()? {
            Some(announcement) => println!(
                "{}\n(updated {})",
                announcement.message,
                announcement.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            None => println!("No announcement."),
        },
        AnnouncementCommand::Set { message } => {
            board.publish(&message)?;
            println!("Announcement updated.");
        }
        AnnouncementCommand::Clear => {
            if board.clear()? {
                println!("Announcement removed.");
            } else {
                println!("No announcement to remove.");
            }
        }
    }
    Ok(())
}

fn handle_instructors(kiosk: &Kiosk<SqliteStore>, cmd: InstructorCommand) -> Result<()> {
    let roster = kiosk.instructors();
    match cmd {
        InstructorCommand::List { all, format } => {
            let instructors = if all { roster.list()? } else { roster.active()? };
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&instructors)?),
                OutputFormat::Table => {
                    if instructors.is_empty() {
                        println!("No instructors.");
                    }
                    for instructor in &instructors {
                        print_instructor(instructor);
                    }
                }
            }
        }
        InstructorCommand::Save(args) => {
            let saved = roster.save(&args.to_form())?;
            println!("Saved {} ({})", saved.details.full_name, saved.details.id);
        }
        InstructorCommand::Show { id } => {
            if !roster.set_active(&id, true)? {
                bail!("no instructor with id '{id}'");
            }
            println!("{id} is shown on the kiosk.");
        }
        InstructorCommand::Hide { id } => {
            if !roster.set_active(&id, false)? {
                bail!("no instructor with id '{id}'");
            }
            println!("{id} is hidden from the kiosk.");
        }
        InstructorCommand::Remove { id } => {
            if !roster.delete(&id)? {
                bail!("no instructor with id '{id}'");
            }
            println!("Removed {id}.");
        }
    }
    Ok(())
}

fn handle_children(kiosk: &Kiosk<SqliteStore>, cmd: &ListCommand) -> Result<()> {
    let children = limited(kiosk.children().list()?, cmd.limit);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&children)?),
        OutputFormat::Table => {
            println!("Registered children: {}", children.len());
            for child in &children {
                let d = &child.details;
                let allergies = d.allergy_list().join(", ");
                println!(
                    "{:<28} {:<24} {:<20} {}",
                    d.id,
                    d.display_name(),
                    d.parent_full_name,
                    if allergies.is_empty() { "-" } else { &allergies }
                );
            }
        }
    }
    Ok(())
}

fn handle_events(kiosk: &Kiosk<SqliteStore>, cmd: &ListCommand) -> Result<()> {
    let events = limited(kiosk.attendance().list()?, cmd.limit);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Table => {
            for event in &events {
                print_event(event);
            }
        }
    }
    Ok(())
}

fn handle_export(kiosk: &Kiosk<SqliteStore>, config: &Config, cmd: &ExportCommand) -> Result<()> {
    let kind = ExportKind::from(cmd.kind);
    let text = match kind {
        ExportKind::Children => children_csv(&kiosk.children().list()?)?,
        ExportKind::Attendance => events_csv(&kiosk.attendance().list()?)?,
    };

    if cmd.stdout {
        println!("{text}");
        return Ok(());
    }

    let dir = cmd.output.clone().unwrap_or_else(|| config.export_dir());
    let path = write_export(&dir, kind, Local::now().date_naive(), &text)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn handle_status(kiosk: &Kiosk<SqliteStore>, json: bool) -> Result<()> {
    let store = kiosk.store();
    let health = kiosk.health()?;
    let entries = store.entries()?;
    let unlocked = kiosk.gate().is_unlocked()?;
    let checked_in = kiosk.attendance().checked_in()?.len();

    if json {
        let entries: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "key": e.key,
                    "bytes": e.bytes,
                    "updated_at": e.updated_at,
                })
            })
            .collect();
        let status = serde_json::json!({
            "database_path": store.path(),
            "database_bytes": store.size_bytes(),
            "team_unlocked": unlocked,
            "checked_in": checked_in,
            "health": health,
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("kidcheck status");
        println!("---------------");
        println!("Database:      {}", store.path().display());
        println!("Size:          {} bytes", store.size_bytes());
        println!(
            "Team area:     {}",
            if unlocked { "unlocked" } else { "locked" }
        );
        println!("Checked in:    {checked_in}");
        println!();
        println!("[Entries]");
        for entry in &entries {
            println!(
                "  {:<28} {:>8} bytes  {}",
                entry.key, entry.bytes, entry.updated_at
            );
        }
        println!();
        println!("[Health]");
        println!("  Children:     {}", describe(&health.children));
        println!("  Events:       {}", describe(&health.events));
        println!("  Instructors:  {}", describe(&health.instructors));
        println!("  Announcement: {}", describe(&health.announcement));
        if health.has_corruption() {
            println!();
            println!("Corrupt entries are read as empty and replaced on the next write.");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, custom_path: Option<&Path>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Access]");
                println!("  Require unlock:     {}", config.access.require_unlock);
                println!();
                println!("[Kiosk]");
                println!("  Refresh (ms):       {}", config.kiosk.refresh_interval_ms);
                println!("  Search limit:       {}", config.kiosk.search_limit);
                println!("  Site URL:           {}", config.kiosk.site_url);
                println!();
                println!("[Export]");
                println!("  Output directory:   {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            let path = custom_path.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or_else(|| custom_path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_allergies(child: &ChildProfile) {
    let allergies = child.details.allergy_list();
    if !allergies.is_empty() {
        println!("Allergies: {}", allergies.join(", "));
    }
    if let Some(notes) = &child.details.allergies_notes {
        println!("Notes: {notes}");
    }
}

fn print_instructor(instructor: &InstructorProfile) {
    let d = &instructor.details;
    let role = d.role.as_deref().unwrap_or("Instructor");
    let hidden = if d.active { "" } else { "  (hidden)" };
    println!(
        "  [{}] {} - {role} ({}){hidden}",
        initials(&d.full_name),
        d.full_name,
        d.id
    );
}

fn print_event(event: &AttendanceEvent) {
    println!(
        "{}  {:<8} {:<24} {:<20} {}",
        event.time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        event.kind.to_string(),
        event.child_name,
        event.parent_name,
        event.notes.as_deref().unwrap_or("")
    );
}

fn describe(health: &kidcheck::EntryHealth) -> String {
    match health {
        kidcheck::EntryHealth::Absent => "empty".to_string(),
        kidcheck::EntryHealth::Ok { items } => format!("ok ({items})"),
        kidcheck::EntryHealth::Corrupt { reason } => format!("CORRUPT: {reason}"),
    }
}

fn clock(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M").to_string()
}

fn limited<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
