//! Human-readable summary of an organization run.
//!
//! The summary is the text handed back to whoever asked for the run, so it
//! is plain text with a few emoji markers and no terminal styling.

use crate::file_organizer::{MoveRecord, OrganizationReport};
use std::fmt::{self, Write};

/// Number of original file names listed in the "before" preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Returns `"1 file"`, `"3 files"` and so on.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Returns the first [`PREVIEW_LIMIT`] names joined by commas, with `...`
/// appended when names were left out.
pub fn preview(names: &[String]) -> String {
    let mut preview = names
        .iter()
        .take(PREVIEW_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview
}

fn change_line(record: &MoveRecord) -> String {
    if record.was_renamed() {
        format!(
            "• {} → {}/{} (renamed)",
            record.file, record.category, record.new_name
        )
    } else {
        format!("• {} → {}/", record.file, record.category)
    }
}

impl fmt::Display for OrganizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut summary = String::new();

        if self.dry_run {
            summary.push_str("🔍 Dry run complete! No files were moved.\n\n");
        } else {
            summary.push_str("✅ File organization complete!\n\n");
        }

        writeln!(
            summary,
            "📋 BEFORE: {} in root directory",
            pluralize(self.before.len(), "file")
        )?;
        writeln!(summary, "Files: {}", preview(&self.before))?;
        summary.push('\n');

        let heading = if self.dry_run {
            "PLANNED CHANGES"
        } else {
            "CHANGES MADE"
        };
        writeln!(
            summary,
            "🔄 {}: {} moved",
            heading,
            pluralize(self.files_processed(), "file")
        )?;
        for record in &self.moves {
            writeln!(summary, "{}", change_line(record))?;
        }

        let folders = pluralize(self.folders_created(), "folder");
        if self.dry_run {
            writeln!(summary, "\n📂 AFTER: Would create {}", folders)?;
        } else {
            writeln!(summary, "\n📂 AFTER: Created {}", folders)?;
        }
        for (folder, count) in self.created_folder_counts() {
            writeln!(summary, "• {}: {}", folder, pluralize(count, "file"))?;
        }

        write!(summary, "\n📍 Location: {}", self.source)?;

        f.write_str(&summary)
    }
}
