//! Progression store port: the unit of work behind a completion.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CommittedCompletion, NewCompletion};

/// Applies a ledger write and the matching XP increment as one transaction.
#[async_trait]
pub trait ProgressionStore: Send + Sync {
    /// Record the completion, lazily create the member and add the XP.
    ///
    /// Either everything commits or nothing does. A duplicate for a
    /// non-repeatable task yields `DomainError::AlreadyCompleted` and leaves
    /// the stored XP untouched. `old_xp` and `new_xp` are read inside the
    /// same transaction as the increment.
    async fn apply_completion(&self, completion: &NewCompletion) -> DomainResult<CommittedCompletion>;
}
