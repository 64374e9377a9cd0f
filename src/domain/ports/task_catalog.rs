//! Task catalog port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Task;

/// Read-only source of task definitions.
///
/// Catalog content may change between calls. The engine snapshots the values
/// it needs into the ledger instead of trusting later reads.
#[async_trait]
pub trait TaskCatalog: Send + Sync {
    /// List every task currently offered.
    async fn list_tasks(&self) -> DomainResult<Vec<Task>>;

    /// Look up a single task by id.
    async fn get_task(&self, id: &str) -> DomainResult<Option<Task>> {
        Ok(self.list_tasks().await?.into_iter().find(|t| t.id == id))
    }
}
