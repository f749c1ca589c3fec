//! Name directory tools: a process-local list of names the model can
//! list, search and extend.
//!
//! All three tools share one [`NameDirectory`]; additions made through
//! `add_new_name` are visible to later `fetch_all_names` calls for the
//! lifetime of the process.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatgate_core::error::ToolError;
use chatgate_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::debug;

/// Names present when the directory is created.
pub const SEED_NAMES: [&str; 4] = ["Mehrdad", "Elnaz", "Simon", "Marcus"];

/// Shared, insertion-ordered list of names.
#[derive(Debug, Clone)]
pub struct NameDirectory {
    names: Arc<Mutex<Vec<String>>>,
}

impl NameDirectory {
    /// A directory holding the seed names.
    pub fn seeded() -> Self {
        Self::with_names(SEED_NAMES.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            names: Arc::new(Mutex::new(names)),
        }
    }

    pub fn all(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Append a name. Duplicates are allowed.
    pub fn add(&self, name: impl Into<String>) {
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.into());
    }

    /// Names containing `needle`, case-insensitively, in insertion order.
    pub fn find(&self, needle: &str) -> Vec<String> {
        let needle = needle.to_lowercase();
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|n| n.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

impl Default for NameDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

fn parse_name(arguments: serde_json::Value) -> Result<String, ToolError> {
    let args: NameArgs = serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArguments(format!("Expected {{\"name\": string}}: {e}")))?;
    let name = args.name.trim();
    if name.is_empty() {
        return Err(ToolError::InvalidArguments("'name' cannot be empty".into()));
    }
    Ok(name.to_string())
}

fn name_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": description
            }
        },
        "required": ["name"]
    })
}

pub struct FetchAllNamesTool {
    directory: NameDirectory,
}

impl FetchAllNamesTool {
    pub fn new(directory: NameDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for FetchAllNamesTool {
    fn name(&self) -> &str {
        "fetch_all_names"
    }

    fn description(&self) -> &str {
        "Fetches all names from the application."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let names = self.directory.all();
        debug!(count = names.len(), "Fetched all names");
        let output = names.join(", ");
        Ok(ToolResult::ok(output).with_data(serde_json::json!(names)))
    }
}

pub struct AddNewNameTool {
    directory: NameDirectory,
}

impl AddNewNameTool {
    pub fn new(directory: NameDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for AddNewNameTool {
    fn name(&self) -> &str {
        "add_new_name"
    }

    fn description(&self) -> &str {
        "Adds a new name to the application."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        name_schema("The name to add")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = parse_name(arguments)?;
        self.directory.add(name.clone());
        debug!(%name, "Added name");
        Ok(ToolResult::ok(format!(
            "Operation successful. New name added: {name}"
        )))
    }
}

pub struct FindNameByNameTool {
    directory: NameDirectory,
}

impl FindNameByNameTool {
    pub fn new(directory: NameDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for FindNameByNameTool {
    fn name(&self) -> &str {
        "find_name_by_name"
    }

    fn description(&self) -> &str {
        "Finds names containing the specified substring."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        name_schema("Substring to search for, case-insensitive")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let needle = parse_name(arguments)?;
        let found = self.directory.find(&needle);
        debug!(%needle, matches = found.len(), "Searched names");

        let output = if found.is_empty() {
            format!("No names found containing: {needle}")
        } else {
            format!("Found names: {}", found.join(", "))
        };
        Ok(ToolResult::ok(output).with_data(serde_json::json!(found)))
    }
}
