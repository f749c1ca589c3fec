//! Built-in tool implementations for chatgate.
//!
//! The tool-enabled chat endpoint gives the model three functions over a
//! shared in-memory name list: list everything, search by substring, and
//! add a name.

pub mod names;

use chatgate_core::tool::ToolRegistry;

pub use names::{AddNewNameTool, FetchAllNamesTool, FindNameByNameTool, NameDirectory};

/// Create a registry with all name tools sharing `directory`.
pub fn registry_for(directory: NameDirectory) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FetchAllNamesTool::new(directory.clone())));
    registry.register(Box::new(AddNewNameTool::new(directory.clone())));
    registry.register(Box::new(FindNameByNameTool::new(directory)));
    registry
}

/// Create a default tool registry over a freshly seeded directory.
pub fn default_registry() -> ToolRegistry {
    registry_for(NameDirectory::seeded())
}
