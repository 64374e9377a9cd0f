//! Completion ledger domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::task::Task;

/// An immutable ledger row recording one completion of a task by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub id: Uuid,
    pub member_id: String,
    pub task_id: String,
    /// XP snapshot taken from the catalog when the completion was recorded
    pub xp_earned: u32,
    pub comment: Option<String>,
    /// Repeatable flag snapshot; non-repeatable rows are unique per member
    pub repeatable: bool,
    /// Moderator who granted the task, if it was not self-service
    pub granted_by: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A completion that has passed validation and is ready for the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompletion {
    pub member_id: String,
    /// Name to store for the member; `None` keeps the current one
    pub display_name: Option<String>,
    pub task_id: String,
    pub xp_earned: u32,
    pub comment: Option<String>,
    pub repeatable: bool,
    pub granted_by: Option<String>,
}

impl NewCompletion {
    /// Snapshot the task values that the ledger must keep.
    ///
    /// A blank display name is dropped so it never replaces a stored one.
    pub fn for_task(
        task: &Task,
        member_id: impl Into<String>,
        display_name: impl Into<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            display_name: non_blank(display_name.into()),
            task_id: task.id.clone(),
            xp_earned: task.xp,
            comment,
            repeatable: task.repeatable,
            granted_by: None,
        }
    }

    pub fn granted_by(mut self, moderator: impl Into<String>) -> Self {
        self.granted_by = Some(moderator.into());
        self
    }

    /// Materialize the ledger row with a fresh id and timestamp.
    pub fn into_event(self) -> CompletionEvent {
        CompletionEvent {
            id: Uuid::new_v4(),
            member_id: self.member_id,
            task_id: self.task_id,
            xp_earned: self.xp_earned,
            comment: self.comment,
            repeatable: self.repeatable,
            granted_by: self.granted_by,
            completed_at: Utc::now(),
        }
    }
}

fn non_blank(name: String) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Result of the atomic ledger write and XP increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedCompletion {
    pub event: CompletionEvent,
    pub old_xp: u64,
    pub new_xp: u64,
}

/// Self-service completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub member_id: String,
    pub display_name: String,
    pub task_id: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Moderator grant request. Restricted tasks are only reachable this way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub member_id: String,
    pub display_name: String,
    pub task_id: String,
    pub granted_by: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Everything the caller learns from a successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub event: CompletionEvent,
    pub task_name: String,
    pub xp_earned: u32,
    pub old_xp: u64,
    pub new_xp: u64,
    /// Tier names crossed by this completion, ascending
    pub crossed_tiers: Vec<String>,
}

impl CompletionOutcome {
    /// The payload handed to presentation layers.
    pub fn response(&self) -> CompletionResponse {
        CompletionResponse {
            success: true,
            xp_earned: self.xp_earned,
            total_xp: self.new_xp,
            old_xp: self.old_xp,
            task_name: self.task_name.clone(),
        }
    }

    /// The highest tier reached, if any threshold was crossed.
    pub fn highest_tier_crossed(&self) -> Option<&str> {
        self.crossed_tiers.last().map(String::as_str)
    }
}

/// Completion API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub success: bool,
    pub xp_earned: u32,
    pub total_xp: u64,
    pub old_xp: u64,
    pub task_name: String,
}

/// Count completions per task id. Repeats are legitimate rows and are counted.
pub fn completion_counts(events: &[CompletionEvent]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.task_id.clone()).or_insert(0) += 1;
    }
    counts
}
