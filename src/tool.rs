//! The organizer as a tool that an agent runtime can call.
//!
//! Agent runtimes hand tools their arguments as JSON and show whatever text
//! comes back to the user or the model. [`OrganizerTool`] therefore never
//! returns an error: every failure becomes a descriptive message.
//!
//! The tool is an ordinary value. Build it once at startup with the
//! configured [`FileOrganizer`] and pass it to whatever dispatches tool calls.

use crate::file_category::FALLBACK_CATEGORY;
use crate::file_organizer::FileOrganizer;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Name under which the tool is registered with an agent runtime.
pub const TOOL_NAME: &str = "file_organizer";

/// Arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolCall {
    /// Path to the directory containing the files to organize.
    pub source_directory: String,
    /// Organize by file type categories.
    #[serde(default = "default_organize_by_type")]
    pub organize_by_type: bool,
}

fn default_organize_by_type() -> bool {
    true
}

impl ToolCall {
    /// Creates a call organizing `source_directory` by type.
    pub fn new(source_directory: impl Into<String>) -> Self {
        Self {
            source_directory: source_directory.into(),
            organize_by_type: true,
        }
    }
}

/// The file organizer exposed as a text-in, text-out tool.
#[derive(Debug, Clone, Default)]
pub struct OrganizerTool {
    organizer: FileOrganizer,
}

impl OrganizerTool {
    /// Wraps a configured organizer.
    pub fn new(organizer: FileOrganizer) -> Self {
        Self { organizer }
    }

    /// Runs the organizer and returns the summary or the error message.
    pub fn call(&self, call: &ToolCall) -> String {
        if !call.organize_by_type {
            // Only the by-type strategy exists.
            debug!("organize_by_type=false requested, organizing by type anyway");
        }

        match self.organizer.organize(&call.source_directory) {
            Ok(report) => report.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Decodes JSON arguments and runs the organizer.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidybox::tool::OrganizerTool;
    ///
    /// let tool = OrganizerTool::default();
    /// let text = tool.call_json(r#"{"source_directory": "/tmp/inbox"}"#);
    /// println!("{}", text);
    /// ```
    pub fn call_json(&self, arguments: &str) -> String {
        match serde_json::from_str::<ToolCall>(arguments) {
            Ok(call) => self.call(&call),
            Err(e) => format!("❌ Error: invalid tool arguments: {}", e),
        }
    }

    /// Returns the tool description an agent runtime registers.
    pub fn schema(&self) -> Value {
        let categories: Vec<&str> = self
            .organizer
            .table()
            .categories()
            .iter()
            .map(|category| category.name())
            .chain(std::iter::once(FALLBACK_CATEGORY))
            .collect();

        json!({
            "name": TOOL_NAME,
            "description": format!(
                "Organize files in a directory by type, creating one folder per category \
                 and moving files accordingly. Only files directly inside the directory are \
                 moved; name collisions are resolved by appending _1, _2, ... Categories: {}. \
                 Returns a summary of the changes.",
                categories.join(", ")
            ),
            "parameters": {
                "type": "object",
                "properties": {
                    "source_directory": {
                        "type": "string",
                        "description": "Path to the directory containing files to organize"
                    },
                    "organize_by_type": {
                        "type": "boolean",
                        "description": "If true, organize by file type categories",
                        "default": true
                    }
                },
                "required": ["source_directory"]
            }
        })
    }
}

/// Organizes `source_directory` with the standard categories and no filters.
///
/// Returns the summary text on success and the error message otherwise.
pub fn file_organizer(source_directory: &str, organize_by_type: bool) -> String {
    OrganizerTool::default().call(&ToolCall {
        source_directory: source_directory.to_string(),
        organize_by_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_defaults_to_by_type() {
        let call: ToolCall = serde_json::from_str(r#"{"source_directory": "/tmp/x"}"#).unwrap();
        assert_eq!(call, ToolCall::new("/tmp/x"));
    }

    #[test]
    fn test_tool_call_explicit_flag() {
        let call: ToolCall =
            serde_json::from_str(r#"{"source_directory": "/tmp/x", "organize_by_type": false}"#)
                .unwrap();
        assert!(!call.organize_by_type);
    }

    #[test]
    fn test_call_json_rejects_bad_arguments() {
        let tool = OrganizerTool::default();

        let missing = tool.call_json(r#"{"organize_by_type": true}"#);
        assert!(missing.starts_with("❌ Error: invalid tool arguments:"));
        assert!(missing.contains("source_directory"));

        let garbage = tool.call_json("not json");
        assert!(garbage.starts_with("❌ Error: invalid tool arguments:"));
    }

    #[test]
    fn test_call_reports_missing_directory() {
        let text = file_organizer("/non/existent/tidybox/dir", true);
        assert_eq!(text, "Error: Directory '/non/existent/tidybox/dir' does not exist");
    }

    #[test]
    fn test_schema_shape() {
        let schema = OrganizerTool::default().schema();

        assert_eq!(schema["name"], TOOL_NAME);
        assert_eq!(schema["parameters"]["required"], json!(["source_directory"]));
        assert_eq!(
            schema["parameters"]["properties"]["organize_by_type"]["default"],
            json!(true)
        );

        let description = schema["description"].as_str().unwrap();
        assert!(description.contains("Images"));
        assert!(description.contains("Other Files"));
    }
}
