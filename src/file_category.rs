/// Extension-based file categorization.
///
/// A [`CategoryTable`] is an ordered list of named categories, each owning a
/// set of lowercase extensions (with the leading dot). Lookup walks the table
/// in declaration order and returns the first category that lists the
/// extension, so if two categories share an extension the one declared first
/// wins. Files whose extension is not listed anywhere fall back to
/// [`FALLBACK_CATEGORY`].
///
/// # Examples
///
/// ```
/// use tidybox::file_category::CategoryTable;
///
/// let table = CategoryTable::standard();
/// assert_eq!(table.category_for_name("photo.JPG"), "Images");
/// assert_eq!(table.category_for_name("report.pdf"), "PDF Documents");
/// assert_eq!(table.category_for_name("data.unknownext"), "Other Files");
/// ```
use std::collections::HashMap;
use tracing::warn;

/// Category assigned to files whose extension is not in the table.
pub const FALLBACK_CATEGORY: &str = "Other Files";

/// The standard category table, in lookup order.
const STANDARD_CATEGORIES: &[(&str, &[&str])] = &[
    ("Word Documents", &[".doc", ".docx", ".rtf", ".odt"]),
    ("Excel Documents", &[".xls", ".xlsx", ".csv", ".ods"]),
    ("PowerPoint Documents", &[".ppt", ".pptx", ".odp"]),
    ("PDF Documents", &[".pdf"]),
    (
        "Images",
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg", ".webp"],
    ),
    (
        "Videos",
        &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm"],
    ),
    ("Audio", &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma"]),
    ("Archives", &[".zip", ".rar", ".7z", ".tar", ".gz"]),
    ("Text Files", &[".txt", ".md", ".log"]),
    (
        "Code Files",
        &[".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".php"],
    ),
    (
        "Executables",
        &[
            ".exe", ".msi", ".bat", ".cmd", ".sh", ".run", ".deb", ".rpm", ".appimage",
        ],
    ),
];

/// A named bucket of file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    /// Creates a category, normalizing every extension to lowercase with a
    /// leading dot (`"JPG"` and `".jpg"` both become `".jpg"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use tidybox::file_category::Category;
    ///
    /// let category = Category::new("Images", ["PNG", ".jpg"]);
    /// assert_eq!(category.extensions(), [".png", ".jpg"]);
    /// ```
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();

        Self {
            name: name.into(),
            extensions,
        }
    }

    /// Returns the category name, which is also its folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized extensions of this category.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if this category lists the given normalized extension.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.iter().any(|ext| ext == extension)
    }
}

/// An extension shared by two categories, where only the first can ever match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedExtension {
    /// The normalized extension.
    pub extension: String,
    /// The category that wins lookups for this extension.
    pub winner: String,
    /// The later category that never receives files with this extension.
    pub shadowed: String,
}

/// Ordered category table with first-match-wins lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Creates a table from categories in lookup order.
    ///
    /// Extensions listed by more than one category are logged as warnings;
    /// the earlier category keeps them.
    pub fn new(categories: Vec<Category>) -> Self {
        let table = Self { categories };
        for overlap in table.shadowed_extensions() {
            warn!(
                extension = %overlap.extension,
                winner = %overlap.winner,
                shadowed = %overlap.shadowed,
                "extension listed by more than one category; first declared wins"
            );
        }
        table
    }

    /// Returns the standard category table.
    pub fn standard() -> Self {
        Self {
            categories: STANDARD_CATEGORIES
                .iter()
                .map(|(name, extensions)| Category::new(*name, extensions.iter()))
                .collect(),
        }
    }

    /// Returns the categories in lookup order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Maps an extension to a category name.
    ///
    /// The extension may be given with or without its leading dot and in
    /// any case. `None` or an empty extension maps to [`FALLBACK_CATEGORY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tidybox::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::standard();
    /// assert_eq!(table.category_for_extension(Some(".MP3")), "Audio");
    /// assert_eq!(table.category_for_extension(Some("csv")), "Excel Documents");
    /// assert_eq!(table.category_for_extension(None), "Other Files");
    /// ```
    pub fn category_for_extension(&self, extension: Option<&str>) -> &str {
        let Some(extension) = extension.and_then(normalize_extension) else {
            return FALLBACK_CATEGORY;
        };

        self.categories
            .iter()
            .find(|category| category.contains(&extension))
            .map(Category::name)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Maps a file name to a category name using its extension.
    pub fn category_for_name(&self, file_name: &str) -> &str {
        self.category_for_extension(extension_of(file_name).as_deref())
    }

    /// Lists every extension that a later category declares but can never
    /// receive because an earlier category already claims it.
    pub fn shadowed_extensions(&self) -> Vec<ShadowedExtension> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut shadowed = Vec::new();

        for category in &self.categories {
            for extension in category.extensions() {
                match owners.get(extension.as_str()) {
                    Some(winner) if *winner != category.name() => {
                        shadowed.push(ShadowedExtension {
                            extension: extension.clone(),
                            winner: winner.to_string(),
                            shadowed: category.name().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(extension, category.name());
                    }
                }
            }
        }

        shadowed
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits a file name into stem and extension (the extension keeps its dot).
///
/// The extension starts at the last dot, unless that dot is the first or
/// the last character of the name, in which case there is no extension.
///
/// # Examples
///
/// ```
/// use tidybox::file_category::split_file_name;
///
/// assert_eq!(split_file_name("photo.png"), ("photo", ".png"));
/// assert_eq!(split_file_name("backup.tar.gz"), ("backup.tar", ".gz"));
/// assert_eq!(split_file_name(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_file_name("notes."), ("notes.", ""));
/// ```
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 && index + 1 < file_name.len() => file_name.split_at(index),
        _ => (file_name, ""),
    }
}

/// Returns the case-folded extension of a file name, with its leading dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, extension) = split_file_name(file_name);
    normalize_extension(extension)
}

fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_order() {
        let table = CategoryTable::standard();
        let names: Vec<&str> = table.categories().iter().map(Category::name).collect();
        assert_eq!(
            names,
            vec![
                "Word Documents",
                "Excel Documents",
                "PowerPoint Documents",
                "PDF Documents",
                "Images",
                "Videos",
                "Audio",
                "Archives",
                "Text Files",
                "Code Files",
                "Executables",
            ]
        );
    }

    #[test]
    fn test_standard_table_is_disjoint() {
        let table = CategoryTable::standard();
        assert!(table.shadowed_extensions().is_empty());
    }

    #[test]
    fn test_every_standard_extension_maps_to_its_category() {
        let table = CategoryTable::standard();
        for (name, extensions) in STANDARD_CATEGORIES {
            for extension in *extensions {
                assert_eq!(
                    table.category_for_extension(Some(*extension)),
                    *name,
                    "extension {}",
                    extension
                );
            }
        }
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let table = CategoryTable::standard();
        assert_eq!(table.category_for_extension(Some(".JPEG")), "Images");
        assert_eq!(table.category_for_extension(Some("Docx")), "Word Documents");
        assert_eq!(table.category_for_name("SETUP.AppImage"), "Executables");
    }

    #[test]
    fn test_unknown_and_missing_extensions_fall_back() {
        let table = CategoryTable::standard();
        assert_eq!(table.category_for_extension(Some(".xyz")), FALLBACK_CATEGORY);
        assert_eq!(table.category_for_extension(Some("")), FALLBACK_CATEGORY);
        assert_eq!(table.category_for_extension(None), FALLBACK_CATEGORY);
        assert_eq!(table.category_for_name("Makefile"), FALLBACK_CATEGORY);
        assert_eq!(table.category_for_name(".bashrc"), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_compound_extension_uses_last_suffix() {
        let table = CategoryTable::standard();
        assert_eq!(table.category_for_name("backup.tar.gz"), "Archives");
        assert_eq!(table.category_for_name("notes.txt.bak"), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_first_declared_category_wins_on_overlap() {
        let table = CategoryTable::new(vec![
            Category::new("Data", [".csv", ".json"]),
            Category::new("Spreadsheets", [".csv", ".xlsx"]),
        ]);

        assert_eq!(table.category_for_extension(Some(".csv")), "Data");
        assert_eq!(table.category_for_extension(Some(".xlsx")), "Spreadsheets");
        assert_eq!(
            table.shadowed_extensions(),
            vec![ShadowedExtension {
                extension: ".csv".to_string(),
                winner: "Data".to_string(),
                shadowed: "Spreadsheets".to_string(),
            }]
        );
    }

    #[test]
    fn test_category_normalizes_extensions() {
        let category = Category::new("Fonts", ["TTF", ".Otf", "", "."]);
        assert_eq!(category.extensions(), [".ttf", ".otf"]);
        assert!(category.contains(".ttf"));
        assert!(!category.contains("ttf"));
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("a.jpg"), ("a", ".jpg"));
        assert_eq!(split_file_name("README"), ("README", ""));
        assert_eq!(split_file_name(".hidden"), (".hidden", ""));
        assert_eq!(split_file_name(".hidden.txt"), (".hidden", ".txt"));
        assert_eq!(split_file_name("trailing."), ("trailing.", ""));
        assert_eq!(split_file_name("..x"), (".", ".x"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Photo.PNG"), Some(".png".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("Makefile"), None);
    }
}
