/// File organization: moving the files of a directory into category folders.
///
/// An organization run validates the source directory, snapshots its regular
/// files, classifies each one with the [`CategoryTable`], creates category
/// folders on demand and moves every file into its folder, renaming on
/// collision. The run stops at the first filesystem error; files moved before
/// that point stay where they were moved.
use crate::config::CompiledFilters;
use crate::file_category::{CategoryTable, extension_of, split_file_name};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end an organization run.
///
/// The `Display` text of each variant is the message shown to the end user.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source path does not exist.
    #[error("Error: Directory '{path}' does not exist")]
    DirectoryNotFound { path: String },
    /// The source path exists but is not a directory.
    #[error("Error: '{path}' is not a directory")]
    NotADirectory { path: String },
    /// The source directory holds no regular file to organize.
    #[error("No files found in '{path}'")]
    NoFiles { path: String },
    /// A folder creation, listing or move was refused by the filesystem.
    #[error("❌ Error: Permission denied. Run as administrator or check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Any other filesystem failure.
    #[error("❌ Error organizing files: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Classifies an I/O failure on `path`.
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: path.to_path_buf(),
                source,
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Returns true for errors raised before anything was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::NotADirectory { .. } | Self::NoFiles { .. }
        )
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A regular file found directly inside the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file name as stored on disk.
    pub file_name: OsString,
    /// The file name for display, lossily converted to UTF-8.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// The case-folded extension with its leading dot.
    pub extension: Option<String>,
}

impl FileEntry {
    fn new(file_name: OsString, path: PathBuf) -> Self {
        let name = file_name.to_string_lossy().into_owned();
        let extension = extension_of(&name);
        Self {
            file_name,
            name,
            path,
            extension,
        }
    }

    /// Returns the file name without its extension.
    pub fn stem(&self) -> &str {
        split_file_name(&self.name).0
    }
}

/// One file moved (or planned to be moved) into a category folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// Original file name.
    pub file: String,
    /// Destination category (and folder name).
    pub category: String,
    /// Final file name inside the category folder.
    pub new_name: String,
}

impl MoveRecord {
    /// Returns true if the file had to be renamed to avoid a collision.
    pub fn was_renamed(&self) -> bool {
        self.file != self.new_name
    }
}

/// The outcome of one organization run (or of a dry-run plan).
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationReport {
    /// The source directory, exactly as it was given.
    pub source: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// True if nothing was moved because this is only a plan.
    pub dry_run: bool,
    /// Names of the files found, in enumeration order.
    pub before: Vec<String>,
    /// Every move, in processing order.
    pub moves: Vec<MoveRecord>,
    /// Category folders created by this run (or that a real run would create).
    pub created_folders: BTreeSet<String>,
}

impl OrganizationReport {
    fn new(source: &str, dry_run: bool, entries: &[FileEntry]) -> Self {
        Self {
            source: source.to_string(),
            started_at: Utc::now(),
            dry_run,
            before: entries.iter().map(|entry| entry.name.clone()).collect(),
            moves: Vec::with_capacity(entries.len()),
            created_folders: BTreeSet::new(),
        }
    }

    /// Number of files moved.
    pub fn files_processed(&self) -> usize {
        self.moves.len()
    }

    /// Number of category folders newly created.
    pub fn folders_created(&self) -> usize {
        self.created_folders.len()
    }

    /// Number of files this run put into the given category folder.
    pub fn files_in_folder(&self, category: &str) -> usize {
        self.moves
            .iter()
            .filter(|record| record.category == category)
            .count()
    }

    /// Created folders, sorted by name, with the number of files moved into each.
    pub fn created_folder_counts(&self) -> Vec<(&str, usize)> {
        self.created_folders
            .iter()
            .map(|folder| (folder.as_str(), self.files_in_folder(folder)))
            .collect()
    }
}

/// Receives progress notifications during an organization run.
pub trait MoveObserver {
    /// Called once the files to organize are known.
    fn on_scan(&mut self, _total: usize) {}

    /// Called after each completed move.
    fn on_move(&mut self, _record: &MoveRecord) {}
}

impl MoveObserver for () {}

/// Organizes files by moving them into category subdirectories.
///
/// The category table and filters are fixed at construction; the organizer
/// holds no other state, so one value can serve any number of runs.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    table: CategoryTable,
    filters: CompiledFilters,
}

impl FileOrganizer {
    /// Creates an organizer with the given category table and filters.
    pub fn new(table: CategoryTable, filters: CompiledFilters) -> Self {
        Self { table, filters }
    }

    /// Returns the category table used for classification.
    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Validates `source` and lists the regular files to organize.
    ///
    /// Subdirectories are skipped. Symbolic links are followed, so a link to
    /// a file is listed while a link to a directory or a dangling link is not.
    /// Files rejected by the configured filters are skipped too.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned: the path must
    /// exist, must be a directory, and must contain at least one file.
    pub fn scan(&self, source: &str) -> OrganizeResult<Vec<FileEntry>> {
        let source_path = Path::new(source);

        if !source_path.exists() {
            return Err(OrganizeError::DirectoryNotFound {
                path: source.to_string(),
            });
        }

        if !source_path.is_dir() {
            return Err(OrganizeError::NotADirectory {
                path: source.to_string(),
            });
        }

        let entries =
            fs::read_dir(source_path).map_err(|e| OrganizeError::from_io(source_path, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| OrganizeError::from_io(source_path, e))?;
            let path = entry.path();

            // fs::metadata follows symlinks
            let is_file = fs::metadata(&path)
                .map(|metadata| metadata.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let file = FileEntry::new(entry.file_name(), path);
            if !self.filters.should_include(&file.name) {
                debug!(file = %file.name, "excluded by filters");
                continue;
            }

            files.push(file);
        }

        if files.is_empty() {
            return Err(OrganizeError::NoFiles {
                path: source.to_string(),
            });
        }

        Ok(files)
    }

    /// Organizes `source` and returns the report of what was moved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidybox::file_organizer::FileOrganizer;
    ///
    /// let organizer = FileOrganizer::default();
    /// match organizer.organize("/path/to/Downloads") {
    ///     Ok(report) => println!("{}", report),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn organize(&self, source: &str) -> OrganizeResult<OrganizationReport> {
        self.organize_with(source, &mut ())
    }

    /// Organizes `source`, notifying `observer` of progress.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before anything is touched. A
    /// filesystem error while creating a folder or moving a file stops the
    /// run immediately; files already moved are not put back.
    pub fn organize_with<O: MoveObserver + ?Sized>(
        &self,
        source: &str,
        observer: &mut O,
    ) -> OrganizeResult<OrganizationReport> {
        let entries = self.scan(source)?;
        let source_path = Path::new(source);

        info!(source = %source, files = entries.len(), "organizing directory");
        observer.on_scan(entries.len());

        let mut report = OrganizationReport::new(source, false, &entries);
        let mut claimed = HashSet::new();

        for entry in &entries {
            let category = self.table.category_for_extension(entry.extension.as_deref());
            debug!(file = %entry.name, category = %category, "classified");
            let category_dir = source_path.join(category);

            if !category_dir.exists() {
                create_category_dir(&category_dir).map_err(|e| {
                    abort_warning(&report, &category_dir);
                    OrganizeError::from_io(&category_dir, e)
                })?;
                report.created_folders.insert(category.to_string());
                debug!(folder = %category_dir.display(), "created category folder");
            }

            let destination = resolve_destination(&category_dir, &entry.file_name, &claimed);

            move_file(&entry.path, &destination).map_err(|e| {
                abort_warning(&report, &entry.path);
                OrganizeError::from_io(&entry.path, e)
            })?;

            let record = MoveRecord {
                file: entry.name.clone(),
                category: category.to_string(),
                new_name: file_name_of(&destination, &entry.name),
            };
            debug!(
                file = %record.file,
                category = %record.category,
                new_name = %record.new_name,
                "moved file"
            );

            observer.on_move(&record);
            report.moves.push(record);
            claimed.insert(destination);
        }

        info!(
            moved = report.files_processed(),
            folders_created = report.folders_created(),
            "organization complete"
        );
        Ok(report)
    }

    /// Computes what [`organize`](Self::organize) would do, without touching
    /// the filesystem.
    ///
    /// Names already claimed earlier in the plan count as collisions, so the
    /// planned renames match those of a real run.
    pub fn plan(&self, source: &str) -> OrganizeResult<OrganizationReport> {
        let entries = self.scan(source)?;
        let source_path = Path::new(source);

        let mut report = OrganizationReport::new(source, true, &entries);
        let mut claimed = HashSet::new();

        for entry in &entries {
            let category = self.table.category_for_extension(entry.extension.as_deref());
            let category_dir = source_path.join(category);

            if !category_dir.exists() {
                report.created_folders.insert(category.to_string());
            }

            let destination = resolve_destination(&category_dir, &entry.file_name, &claimed);
            report.moves.push(MoveRecord {
                file: entry.name.clone(),
                category: category.to_string(),
                new_name: file_name_of(&destination, &entry.name),
            });
            claimed.insert(destination);
        }

        Ok(report)
    }
}

fn abort_warning(report: &OrganizationReport, path: &Path) {
    warn!(
        path = %path.display(),
        moved = report.files_processed(),
        remaining = report.before.len() - report.files_processed(),
        "aborting organization; files already moved are left in place"
    );
}

fn create_category_dir(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        result => result,
    }
}

fn file_name_of(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

/// Picks a free destination for `file_name` inside `dir`.
///
/// The name is handled as raw `OsStr`, so names that are not valid UTF-8
/// keep their exact bytes.
///
/// If `dir/file_name` is taken, `_1`, `_2`, … is appended to the stem (the
/// extension is kept) until a free name is found. A candidate is taken if
/// anything exists at that path, including a dangling symlink, or if it is
/// in `claimed`. Every candidate is checked against the filesystem again.
///
/// # Examples
///
/// ```no_run
/// use std::collections::HashSet;
/// use std::path::Path;
/// use tidybox::file_organizer::resolve_destination;
///
/// // With Images/x.png already present:
/// let destination = resolve_destination(Path::new("Images"), "x.png", &HashSet::new());
/// assert_eq!(destination, Path::new("Images/x_1.png"));
/// ```
pub fn resolve_destination(
    dir: &Path,
    file_name: impl AsRef<OsStr>,
    claimed: &HashSet<PathBuf>,
) -> PathBuf {
    let file_name = file_name.as_ref();
    let is_taken = |candidate: &Path| {
        fs::symlink_metadata(candidate).is_ok() || claimed.contains(candidate)
    };

    let candidate = dir.join(file_name);
    if !is_taken(&candidate) {
        return candidate;
    }

    let (stem, extension) = split_os_file_name(file_name);
    let mut counter: u64 = 1;
    loop {
        let mut numbered = stem.to_os_string();
        numbered.push(format!("_{}", counter));
        if let Some(extension) = extension {
            numbered.push(".");
            numbered.push(extension);
        }

        let candidate = dir.join(numbered);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits a raw file name like [`split_file_name`], returning the extension
/// without its dot.
fn split_os_file_name(file_name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        // "notes." has an empty extension, which counts as none
        (Some(stem), Some(extension)) if !extension.is_empty() => (stem, Some(extension)),
        _ => (file_name, None),
    }
}

/// Moves a file, falling back to copy-then-delete across filesystems.
///
/// `rename` is always tried first. Only when it fails because `from` and
/// `to` are on different filesystems is the file copied into a newly created
/// `to` (an existing file is never overwritten) and `from` removed. If the
/// copy fails the partial destination is removed; if removing `from` fails
/// the copy is removed again, so the file never ends up in both places.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                from = %from.display(),
                to = %to.display(),
                "rename crosses filesystems, copying instead"
            );
            copy_then_remove(from, to)
        }
        result => result,
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let mut reader = File::open(from)?;
    let permissions = reader.metadata()?.permissions();
    let mut writer = File::create_new(to)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
    drop(writer);
    if let Err(e) = copied {
        discard_copy(to);
        return Err(e);
    }

    if let Err(e) = fs::set_permissions(to, permissions) {
        warn!(path = %to.display(), error = %e, "could not copy file permissions");
    }

    drop(reader);
    if let Err(e) = fs::remove_file(from) {
        discard_copy(to);
        return Err(e);
    }

    Ok(())
}

fn discard_copy(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "could not remove partial copy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_destination_free_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let destination = resolve_destination(temp_dir.path(), "photo.png", &HashSet::new());
        assert_eq!(destination, temp_dir.path().join("photo.png"));
    }

    #[test]
    fn test_resolve_destination_counts_past_existing_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("x.png"), "a").unwrap();
        fs::write(dir.join("x_1.png"), "b").unwrap();

        let destination = resolve_destination(dir, "x.png", &HashSet::new());
        assert_eq!(destination, dir.join("x_2.png"));
    }

    #[test]
    fn test_resolve_destination_respects_claimed_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let claimed: HashSet<PathBuf> = [dir.join("notes.txt"), dir.join("notes_1.txt")]
            .into_iter()
            .collect();

        let destination = resolve_destination(dir, "notes.txt", &claimed);
        assert_eq!(destination, dir.join("notes_2.txt"));
    }

    #[test]
    fn test_resolve_destination_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("Makefile"), "").unwrap();
        fs::write(dir.join(".bashrc"), "").unwrap();

        assert_eq!(
            resolve_destination(dir, "Makefile", &HashSet::new()),
            dir.join("Makefile_1")
        );
        assert_eq!(
            resolve_destination(dir, ".bashrc", &HashSet::new()),
            dir.join(".bashrc_1")
        );
    }

    #[test]
    fn test_resolve_destination_keeps_only_last_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("backup.tar.gz"), "").unwrap();

        assert_eq!(
            resolve_destination(dir, "backup.tar.gz", &HashSet::new()),
            dir.join("backup.tar_1.gz")
        );
    }

    #[test]
    fn test_split_os_file_name_matches_display_split() {
        for name in ["photo.png", "backup.tar.gz", ".bashrc", "notes.", "Makefile", "..."] {
            let (stem, extension) = split_os_file_name(OsStr::new(name));
            let (display_stem, display_extension) = split_file_name(name);
            assert_eq!(stem, OsStr::new(display_stem), "stem of {}", name);
            assert_eq!(
                extension.map(|ext| format!(".{}", ext.to_string_lossy())),
                (!display_extension.is_empty()).then(|| display_extension.to_string()),
                "extension of {}",
                name
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_destination_keeps_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let name = OsStr::from_bytes(b"caf\xE9.txt");
        if fs::write(dir.join(name), "a").is_err() {
            // Some filesystems reject names that are not valid UTF-8
            return;
        }

        let destination = resolve_destination(dir, name, &HashSet::new());
        assert_eq!(destination, dir.join(OsStr::from_bytes(b"caf\xE9_1.txt")));

        let other = OsStr::from_bytes(b"caf\xE8.txt");
        assert_eq!(
            resolve_destination(dir, other, &HashSet::new()),
            dir.join(other)
        );
    }

    #[test]
    fn test_move_file_renames() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("a.txt");
        let to = temp_dir.path().join("b.txt");
        fs::write(&from, "content").unwrap();

        move_file(&from, &to).expect("Failed to move file");

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "content");
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("song.mp3");
        let to = temp_dir.path().join("moved.mp3");
        fs::write(&from, b"\xFF\xFB\x10\x00").unwrap();

        copy_then_remove(&from, &to).expect("Failed to copy file");

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"\xFF\xFB\x10\x00");
    }

    #[test]
    fn test_copy_then_remove_never_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("a.txt");
        let to = temp_dir.path().join("b.txt");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "existing").unwrap();

        let result = copy_then_remove(&from, &to);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&from).unwrap(), "new");
        assert_eq!(fs::read_to_string(&to).unwrap(), "existing");
    }

    #[test]
    fn test_create_category_dir_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("Images");

        create_category_dir(&dir).expect("first creation");
        create_category_dir(&dir).expect("second creation");
        assert!(dir.is_dir());
    }

    #[test]
    fn test_scan_skips_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        fs::write(base.join("a.JPG"), "").unwrap();

        let organizer = FileOrganizer::default();
        let entries = organizer.scan(base.to_str().unwrap()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.JPG");
        assert_eq!(entries[0].extension.as_deref(), Some(".jpg"));
        assert_eq!(entries[0].stem(), "a");
    }

    #[test]
    fn test_error_messages() {
        let not_found = OrganizeError::DirectoryNotFound {
            path: "/nope".to_string(),
        };
        assert_eq!(not_found.to_string(), "Error: Directory '/nope' does not exist");
        assert!(not_found.is_validation());

        let denied = OrganizeError::from_io(
            Path::new("/x"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(denied, OrganizeError::PermissionDenied { .. }));
        assert!(denied.to_string().contains("Permission denied"));
        assert!(!denied.is_validation());

        let other = OrganizeError::from_io(
            Path::new("/x"),
            io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert_eq!(other.to_string(), "❌ Error organizing files: disk on fire");
    }

    #[test]
    fn test_move_record_renamed() {
        let record = MoveRecord {
            file: "x.png".to_string(),
            category: "Images".to_string(),
            new_name: "x_1.png".to_string(),
        };
        assert!(record.was_renamed());
    }
}
