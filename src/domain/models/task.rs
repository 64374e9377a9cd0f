//! Task domain model.
//!
//! Tasks are owned by the catalog and are read-only to the engine. The XP
//! value is snapshotted into the ledger at completion time, so later catalog
//! edits never change what a member already earned.

use serde::{Deserialize, Serialize};

/// A unit of work a member can complete for XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, unique within the catalog
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// Display grouping (e.g. "community", "special")
    #[serde(default = "default_category")]
    pub category: String,
    /// XP awarded per completion
    pub xp: u32,
    /// Whether a member may complete this task more than once
    #[serde(default)]
    pub repeatable: bool,
    /// Whether a completion must carry a comment
    #[serde(default)]
    pub requires_comment: bool,
    /// Whether only a moderator may grant this task
    #[serde(default)]
    pub restricted_assignment: bool,
}

fn default_category() -> String {
    "general".to_string()
}

impl Task {
    /// Create a one-off, self-service task with the given XP value.
    pub fn new(id: impl Into<String>, name: impl Into<String>, xp: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: default_category(),
            xp,
            repeatable: false,
            requires_comment: false,
            restricted_assignment: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn requiring_comment(mut self) -> Self {
        self.requires_comment = true;
        self
    }

    pub fn restricted(mut self) -> Self {
        self.restricted_assignment = true;
        self
    }

    /// Check the catalog-level invariants of a single task.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("task id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err(format!("task '{}' has an empty name", self.id));
        }
        if self.xp == 0 {
            return Err(format!("task '{}' must award a positive XP value", self.id));
        }
        Ok(())
    }
}
