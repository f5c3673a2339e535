//! Output formatting and styling module.
//!
//! Provides a centralized interface for CLI output: colored status lines,
//! the move progress bar, and the tables printed by the dry run and the
//! category listing. Reports returned by the organizer are printed with
//! [`OutputFormatter::plain`] so their text reaches the terminal unchanged.

use crate::file_category::{CategoryTable, FALLBACK_CATEGORY};
use crate::file_organizer::{MoveObserver, MoveRecord, OrganizationReport};
use crate::summary::pluralize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidybox::output::OutputFormatter;
    /// OutputFormatter::error("Failed to organize directory");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for file moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");

        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints a table of planned or completed moves per category.
    ///
    /// Unlike the summary text, which only lists newly created folders, this
    /// table counts every destination folder.
    pub fn summary_table(report: &OrganizationReport) {
        Self::header(if report.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let mut categories: Vec<(&str, usize)> = Vec::new();
        for record in &report.moves {
            match categories
                .iter_mut()
                .find(|(name, _)| *name == record.category)
            {
                Some((_, count)) => *count += 1,
                None => categories.push((record.category.as_str(), 1)),
            }
        }
        categories.sort_by_key(|&(name, _)| name);

        // At least "Category" width
        let width = categories
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in &categories {
            let marker = if report.created_folders.contains(*category) {
                " (new)".dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "{:<width$} | {}{}",
                category,
                pluralize(*count, "file").green(),
                marker,
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            pluralize(report.files_processed(), "file").green().bold(),
            width = width
        );
    }

    /// Prints the category table in lookup order.
    pub fn category_table(table: &CategoryTable) {
        Self::header("CATEGORIES (first match wins)");

        let width = table
            .categories()
            .iter()
            .map(|category| category.name().chars().count())
            .max()
            .unwrap_or(0)
            .max(FALLBACK_CATEGORY.len());

        for category in table.categories() {
            println!(
                "{:<width$}  {}",
                category.name().bold(),
                category.extensions().join(" "),
                width = width
            );
        }
        println!(
            "{:<width$}  {}",
            FALLBACK_CATEGORY.bold(),
            "anything unmatched".dimmed(),
            width = width
        );

        for overlap in table.shadowed_extensions() {
            Self::warning(&format!(
                "{} is listed by both {} and {}; files go to {}",
                overlap.extension, overlap.winner, overlap.shadowed, overlap.winner
            ));
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// Drives a progress bar from organizer notifications.
pub struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    /// Creates an observer; a hidden observer draws nothing.
    pub fn new(visible: bool) -> Self {
        Self {
            bar: visible.then(|| OutputFormatter::create_progress_bar(0)),
        }
    }

    /// Removes the progress bar from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl MoveObserver for ProgressObserver {
    fn on_scan(&mut self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
        }
    }

    fn on_move(&mut self, record: &MoveRecord) {
        if let Some(bar) = &self.bar {
            bar.set_message(record.file.clone());
            bar.inc(1);
        }
    }
}
