//! Completion ledger port.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{completion_counts, CompletionEvent, NewCompletion};

/// Append-only store of completion events.
#[async_trait]
pub trait CompletionLedger: Send + Sync {
    /// Record a completion.
    ///
    /// The uniqueness check for non-repeatable tasks and the insert must be a
    /// single conditional write. A prior event for the same member and
    /// non-repeatable task yields `DomainError::AlreadyCompleted`.
    async fn record_completion(&self, completion: &NewCompletion) -> DomainResult<CompletionEvent>;

    /// All completions of a member in the order they were recorded.
    async fn list_completions(&self, member_id: &str) -> DomainResult<Vec<CompletionEvent>>;

    /// Sum of `xp_earned` over the member's ledger.
    async fn sum_xp(&self, member_id: &str) -> DomainResult<u64>;

    /// Number of completions per task id.
    async fn completion_counts(&self, member_id: &str) -> DomainResult<BTreeMap<String, u64>> {
        let events = self.list_completions(member_id).await?;
        Ok(completion_counts(&events))
    }
}
