//! CSV export of children and attendance.
//!
//! Both exports have a fixed header row, even when there are no records.
//! Fields are quoted only when they contain a comma, quote or newline, and
//! rows are joined with `\n` with no trailing newline. A bare `\r` inside a
//! field also gets the field quoted, which CSV readers accept either way.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{AttendanceEvent, ChildProfile};

/// Column order of the children export.
pub const CHILDREN_COLUMNS: [&str; 13] = [
    "id",
    "childFirstName",
    "childLastName",
    "childDob",
    "allergiesNotes",
    "knownAllergies",
    "photoCaptureConsent",
    "parentFullName",
    "parentPhone",
    "parentEmail",
    "emergencyContactName",
    "emergencyContactPhone",
    "createdAtISO",
];

/// Column order of the attendance export.
pub const EVENT_COLUMNS: [&str; 7] = [
    "id",
    "type",
    "childId",
    "childName",
    "parentName",
    "timeISO",
    "notes",
];

/// Which collection an export file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Child profiles.
    Children,
    /// Attendance events.
    Attendance,
}

impl ExportKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::Attendance => "attendance",
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Render child profiles as CSV.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn children_csv(children: &[ChildProfile]) -> Result<String> {
    let rows = children.iter().map(|child| {
        let d = &child.details;
        vec![
            d.id.clone(),
            d.first_name.clone(),
            d.last_name.clone(),
            text(d.dob.as_deref()),
            text(d.allergies_notes.as_deref()),
            text(d.known_allergies.as_deref()),
            if d.photo_capture_consent { "yes" } else { "no" }.to_string(),
            d.parent_full_name.clone(),
            text(d.parent_phone.as_deref()),
            text(d.parent_email.as_deref()),
            text(d.emergency_contact_name.as_deref()),
            text(d.emergency_contact_phone.as_deref()),
            timestamp(child.created_at),
        ]
    });
    render(&CHILDREN_COLUMNS, rows)
}

/// Render attendance events as CSV, in the order given.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn events_csv(events: &[AttendanceEvent]) -> Result<String> {
    let rows = events.iter().map(|event| {
        vec![
            event.id.clone(),
            event.kind.to_string(),
            event.child_id.clone(),
            event.child_name.clone(),
            event.parent_name.clone(),
            timestamp(event.time),
            text(event.notes.as_deref()),
        ]
    });
    render(&EVENT_COLUMNS, rows)
}

/// File name for an export made on `date`, e.g. `attendance-2024-01-14.csv`.
#[must_use]
pub fn export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!("{}-{}.csv", kind.prefix(), date.format("%Y-%m-%d"))
}

/// Write `contents` into `dir` under the file name for `kind` and `date`,
/// creating `dir` if needed. An existing file of the same name is replaced.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_export(
    dir: &Path,
    kind: ExportKind,
    date: NaiveDate,
    contents: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(export_file_name(kind, date));
    fs::write(&path, contents)?;
    info!(path = %path.display(), %kind, bytes = contents.len(), "Wrote export");
    Ok(path)
}

fn render<I>(header: &[&str], rows: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("flushing CSV buffer: {}", e.error())))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| Error::internal(format!("CSV output is not UTF-8: {e}")))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
