//! Static task catalog backed by the seed list or a YAML file.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::errors::DomainResult;
use crate::domain::models::Task;
use crate::domain::ports::TaskCatalog;

use super::seed::seed_tasks;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("Failed to parse catalog file {path}: {source}")]
    Parse { path: String, #[source] source: serde_yaml::Error },

    #[error("Duplicate task id in catalog: {0}")]
    DuplicateId(String),

    #[error("Invalid task in catalog: {0}")]
    InvalidTask(String),
}

/// Catalog file layout: a top-level `tasks` list.
#[derive(Debug, serde::Deserialize)]
struct CatalogFile {
    tasks: Vec<Task>,
}

/// An immutable catalog held in memory.
#[derive(Debug, Clone)]
pub struct StaticTaskCatalog {
    tasks: Arc<Vec<Task>>,
}

impl StaticTaskCatalog {
    /// Build a catalog after checking ids are unique and every task is valid.
    pub fn new(tasks: Vec<Task>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for task in &tasks {
            task.validate().map_err(CatalogError::InvalidTask)?;
            if !seen.insert(task.id.as_str()) {
                return Err(CatalogError::DuplicateId(task.id.clone()));
            }
        }
        Ok(Self { tasks: Arc::new(tasks) })
    }

    /// The built-in seed list.
    pub fn seeded() -> Self {
        Self { tasks: Arc::new(seed_tasks()) }
    }

    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml).map_err(|source| CatalogError::Parse {
            path: origin.to_string(),
            source,
        })?;
        Self::new(file.tasks)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: origin.clone(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&content, &origin)?;
        tracing::info!(path = %origin, tasks = catalog.tasks.len(), "loaded task catalog");
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise fall back to the seed list.
    pub fn load(path: Option<&str>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => Ok(Self::seeded()),
        }
    }
}

#[async_trait]
impl TaskCatalog for StaticTaskCatalog {
    async fn list_tasks(&self) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.as_ref().clone())
    }

    async fn get_task(&self, id: &str) -> DomainResult<Option<Task>> {
        Ok(self.tasks.iter().find(|t| t.id == id).cloned())
    }
}
