//! Tool registry: name → implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::traits::WebflowTool;
use crate::types::ToolDefinition;

/// Every tool the MCP server exposes.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn WebflowTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn WebflowTool>) {
        debug!(tool_name = tool.name(), "tool registered");
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Register several tools.
    pub fn extend(&mut self, tools: impl IntoIterator<Item = Arc<dyn WebflowTool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn WebflowTool>> {
        self.tools.get(name).cloned()
    }

    /// Schemas of every tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
