//! Command-line interface module for tidybox.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading
//! - Organization and dry-run output
//! - Tool invocation with JSON arguments

use crate::config::Config;
use crate::file_organizer::FileOrganizer;
use crate::output::{OutputFormatter, ProgressObserver};
use crate::tool::OrganizerTool;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Organize the files of a directory into category folders by extension.
#[derive(Parser, Debug)]
#[command(name = "tidybox", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the report or errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move the files of a directory into category folders
    Organize {
        /// Directory to organize
        directory: String,

        /// Show what would be moved without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Organize by file type categories
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        by_type: bool,

        /// Output format for the report
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the categories and their extensions
    Categories,

    /// Run the organizer tool with JSON arguments, as an agent runtime would
    Call {
        /// JSON arguments, e.g. '{"source_directory": "/tmp/inbox"}' (read from stdin if omitted)
        arguments: Option<String>,
    },

    /// Print the tool description as JSON
    Schema,
}

/// Output format of the `organize` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The human-readable summary
    #[default]
    Text,
    /// The report as pretty-printed JSON
    Json,
}

/// Runs the CLI application.
///
/// Reports are printed to stdout. On failure the returned message has not
/// been printed yet.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use tidybox::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["tidybox", "organize", "/path/to/directory"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Organize {
            directory,
            dry_run,
            by_type,
            format,
        } => {
            let organizer = config.build_organizer().map_err(|e| e.to_string())?;
            if !by_type {
                debug!("--by-type false requested, organizing by type anyway");
            }
            if *dry_run {
                organize_directory_dry_run(&organizer, directory, *format, cli.quiet)
            } else {
                organize_directory(&organizer, directory, *format, cli.quiet)
            }
        }
        Command::Categories => {
            let table = config.category_table().map_err(|e| e.to_string())?;
            OutputFormatter::category_table(&table);
            Ok(())
        }
        Command::Call { arguments } => {
            let organizer = config.build_organizer().map_err(|e| e.to_string())?;
            let arguments = match arguments {
                Some(arguments) => arguments.clone(),
                None => read_stdin()?,
            };
            OutputFormatter::plain(&OrganizerTool::new(organizer).call_json(&arguments));
            Ok(())
        }
        Command::Schema => {
            let organizer = config.build_organizer().map_err(|e| e.to_string())?;
            let schema = OrganizerTool::new(organizer).schema();
            let text = serde_json::to_string_pretty(&schema)
                .map_err(|e| format!("Error serializing tool description: {}", e))?;
            OutputFormatter::plain(&text);
            Ok(())
        }
    }
}

fn load_config(config_path: Option<&Path>) -> Result<Config, String> {
    Config::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))
}

fn read_stdin() -> Result<String, String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Error reading tool arguments from stdin: {}", e))?;
    Ok(buffer)
}

/// Organizes a directory and prints the report.
///
/// A progress bar is shown while files move unless `quiet` is set or the
/// report is printed as JSON.
pub fn organize_directory(
    organizer: &FileOrganizer,
    directory: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    if !quiet && format == OutputFormat::Text {
        OutputFormatter::info(&format!("Organizing contents of: {}", directory));
    }

    let mut progress = ProgressObserver::new(!quiet && format == OutputFormat::Text);
    let result = organizer.organize_with(directory, &mut progress);
    progress.finish();

    let report = result.map_err(|e| e.to_string())?;
    match format {
        OutputFormat::Text => OutputFormatter::plain(&report.to_string()),
        OutputFormat::Json => OutputFormatter::plain(&to_json(&report)?),
    }
    Ok(())
}

/// Prints what organizing a directory would do, without making changes.
pub fn organize_directory_dry_run(
    organizer: &FileOrganizer,
    directory: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    let report = organizer.plan(directory).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Json => OutputFormatter::plain(&to_json(&report)?),
        OutputFormat::Text => {
            if !quiet {
                OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", directory));
            }
            OutputFormatter::plain(&report.to_string());
            if !quiet {
                OutputFormatter::summary_table(&report);
                OutputFormatter::success("Dry run complete. No files were modified.");
                OutputFormatter::info(&format!(
                    "Run 'tidybox organize {}' (without --dry-run) to execute the organization.",
                    directory
                ));
            }
        }
    }
    Ok(())
}

fn to_json(report: &crate::file_organizer::OrganizationReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("Error serializing report: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_organize_defaults() {
        let cli = Cli::parse_from(["tidybox", "organize", "/tmp/inbox"]);
        assert_eq!(
            cli.command,
            Command::Organize {
                directory: "/tmp/inbox".to_string(),
                dry_run: false,
                by_type: true,
                format: OutputFormat::Text,
            }
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_organize_flags() {
        let cli = Cli::parse_from([
            "tidybox",
            "--config",
            "rules.toml",
            "organize",
            "/tmp/inbox",
            "--dry-run",
            "--by-type",
            "false",
            "--format",
            "json",
            "-q",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("rules.toml")));
        assert!(cli.quiet);
        assert_eq!(
            cli.command,
            Command::Organize {
                directory: "/tmp/inbox".to_string(),
                dry_run: true,
                by_type: false,
                format: OutputFormat::Json,
            }
        );
    }

    #[test]
    fn test_parse_call_without_arguments() {
        let cli = Cli::parse_from(["tidybox", "call"]);
        assert_eq!(cli.command, Command::Call { arguments: None });
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["tidybox", "-q", "-v", "schema"]);
        assert!(result.is_err());
    }
}
