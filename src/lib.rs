//! tidybox - sort the files of a directory into category folders
//!
//! This library classifies files by extension, moves them into one folder per
//! category (renaming on collision), and summarizes the run as text. The same
//! operation is exposed as a command-line tool and as a text-in, text-out
//! tool for agent runtimes.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod summary;
pub mod tool;

pub use config::{CompiledFilters, Config, ConfigError};
pub use file_category::{Category, CategoryTable, FALLBACK_CATEGORY};
pub use file_organizer::{
    FileOrganizer, MoveObserver, MoveRecord, OrganizationReport, OrganizeError, OrganizeResult,
};
pub use tool::{OrganizerTool, ToolCall};

pub use cli::{Cli, run_cli};
