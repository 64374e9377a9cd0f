//! Progression service: the single entry point for completing a task.
//!
//! Validation (catalog lookup, restricted check, comment length) runs before
//! any write. The ledger insert and XP increment are delegated to the
//! [`ProgressionStore`] as one transaction, and the returned `(old_xp,
//! new_xp)` pair is the only input to threshold evaluation.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CompletionOutcome, CompletionRequest, GrantRequest, MemberProgress, MemberRecord,
    NewCompletion, Task, TierLadder,
};
use crate::domain::ports::{CompletionLedger, MemberStore, ProgressionStore, TaskCatalog};

use super::notification_relay::{NotificationRelay, ProgressionEvent};

/// Default minimum comment length for comment-gated tasks.
pub const DEFAULT_COMMENT_MIN_CHARS: usize = 100;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub member: MemberRecord,
    pub tier: String,
}

pub struct ProgressionService<C, P, L, M>
where
    C: TaskCatalog,
    P: ProgressionStore,
    L: CompletionLedger,
    M: MemberStore,
{
    catalog: Arc<C>,
    store: Arc<P>,
    ledger: Arc<L>,
    members: Arc<M>,
    ladder: TierLadder,
    comment_min_chars: usize,
    relay: Option<NotificationRelay>,
}

impl<C, P, L, M> ProgressionService<C, P, L, M>
where
    C: TaskCatalog,
    P: ProgressionStore,
    L: CompletionLedger,
    M: MemberStore,
{
    pub fn new(catalog: Arc<C>, store: Arc<P>, ledger: Arc<L>, members: Arc<M>) -> Self {
        Self {
            catalog,
            store,
            ledger,
            members,
            ladder: TierLadder::reference(),
            comment_min_chars: DEFAULT_COMMENT_MIN_CHARS,
            relay: None,
        }
    }

    /// Use a custom tier ladder.
    pub fn with_ladder(mut self, ladder: TierLadder) -> Self {
        self.ladder = ladder;
        self
    }

    /// Use a custom minimum comment length.
    pub fn with_comment_min_chars(mut self, min_chars: usize) -> Self {
        self.comment_min_chars = min_chars;
        self
    }

    /// Publish committed completions to a notification relay.
    pub fn with_relay(mut self, relay: NotificationRelay) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn ladder(&self) -> &TierLadder {
        &self.ladder
    }

    /// Self-service completion. Restricted tasks are always rejected here.
    #[instrument(skip(self, request), fields(member_id = %request.member_id, task_id = %request.task_id))]
    pub async fn complete_task(&self, request: CompletionRequest) -> DomainResult<CompletionOutcome> {
        let task = self.resolve_task(&request.task_id).await?;
        if task.restricted_assignment {
            return Err(DomainError::ForbiddenTask(task.id));
        }
        let comment = self.check_comment(&task, request.comment.as_deref())?;
        require_member_id(&request.member_id)?;

        let completion =
            NewCompletion::for_task(&task, request.member_id, request.display_name, comment);
        self.commit(&task, completion).await
    }

    /// Moderator grant. Skips the restricted check; uniqueness and comment
    /// rules still apply.
    #[instrument(skip(self, request), fields(member_id = %request.member_id, task_id = %request.task_id, granted_by = %request.granted_by))]
    pub async fn grant_task(&self, request: GrantRequest) -> DomainResult<CompletionOutcome> {
        if request.granted_by.trim().is_empty() {
            return Err(DomainError::ValidationFailed("granting moderator id cannot be empty".into()));
        }
        let task = self.resolve_task(&request.task_id).await?;
        let comment = self.check_comment(&task, request.comment.as_deref())?;
        require_member_id(&request.member_id)?;

        let completion =
            NewCompletion::for_task(&task, request.member_id, request.display_name, comment)
                .granted_by(request.granted_by);
        self.commit(&task, completion).await
    }

    /// Create the member lazily or refresh the display name. XP is untouched.
    pub async fn sync_profile(&self, member_id: &str, display_name: &str) -> DomainResult<MemberRecord> {
        let display_name = display_name_or_id(member_id, display_name)?;
        self.members.sync_profile(member_id, &display_name).await
    }

    /// Member query: stored record, derived tier and completion summary.
    pub async fn get_member(&self, member_id: &str) -> DomainResult<Option<MemberProgress>> {
        let Some(member) = self.members.get(member_id).await? else {
            return Ok(None);
        };

        let events = self.ledger.list_completions(member_id).await?;
        let completion_counts = crate::domain::models::completion_counts(&events);
        let mut seen = HashSet::new();
        let mut completed_task_ids = Vec::new();
        for event in &events {
            if seen.insert(event.task_id.as_str()) {
                completed_task_ids.push(event.task_id.clone());
            }
        }

        Ok(Some(MemberProgress {
            tier: self.ladder.tier_for(member.total_xp).to_string(),
            member,
            completed_task_ids,
            completion_counts,
        }))
    }

    /// Members sorted by XP, highest first.
    pub async fn leaderboard(&self, limit: Option<usize>) -> DomainResult<Vec<LeaderboardEntry>> {
        let members = self.members.list_by_xp(limit).await?;
        Ok(members
            .into_iter()
            .enumerate()
            .map(|(i, member)| LeaderboardEntry {
                rank: i + 1,
                tier: self.ladder.tier_for(member.total_xp).to_string(),
                member,
            })
            .collect())
    }

    pub async fn list_tasks(&self) -> DomainResult<Vec<Task>> {
        self.catalog.list_tasks().await
    }

    async fn resolve_task(&self, task_id: &str) -> DomainResult<Task> {
        self.catalog
            .get_task(task_id)
            .await?
            .ok_or_else(|| DomainError::TaskNotFound(task_id.to_string()))
    }

    /// Enforce the comment floor for comment-gated tasks.
    ///
    /// Length is counted in characters after trimming surrounding whitespace.
    /// A blank comment is stored as no comment.
    fn check_comment(&self, task: &Task, comment: Option<&str>) -> DomainResult<Option<String>> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        if task.requires_comment {
            let len = comment.map_or(0, |c| c.chars().count());
            if len < self.comment_min_chars {
                return Err(DomainError::CommentRequired {
                    task_id: task.id.clone(),
                    remaining: self.comment_min_chars - len,
                });
            }
        }

        Ok(comment.map(str::to_string))
    }

    async fn commit(&self, task: &Task, completion: NewCompletion) -> DomainResult<CompletionOutcome> {
        let committed = match self.store.apply_completion(&completion).await {
            Ok(committed) => committed,
            Err(e @ DomainError::AlreadyCompleted { .. }) => {
                tracing::info!("task already completed, nothing recorded");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to record completion");
                return Err(e);
            }
        };

        let crossed_tiers = self.ladder.crossed(committed.old_xp, committed.new_xp);
        tracing::info!(
            xp_earned = task.xp,
            old_xp = committed.old_xp,
            new_xp = committed.new_xp,
            crossed = ?crossed_tiers,
            "task completed"
        );

        let outcome = CompletionOutcome {
            task_name: task.name.clone(),
            xp_earned: committed.event.xp_earned,
            old_xp: committed.old_xp,
            new_xp: committed.new_xp,
            crossed_tiers,
            event: committed.event,
        };

        if let Some(relay) = &self.relay {
            relay.publish(ProgressionEvent {
                member_id: outcome.event.member_id.clone(),
                task_id: outcome.event.task_id.clone(),
                task_name: outcome.task_name.clone(),
                xp_earned: outcome.xp_earned,
                old_xp: outcome.old_xp,
                new_xp: outcome.new_xp,
                comment: outcome.event.comment.clone(),
                crossed_tiers: outcome.crossed_tiers.clone(),
            });
        }

        Ok(outcome)
    }
}

fn require_member_id(member_id: &str) -> DomainResult<()> {
    if member_id.trim().is_empty() {
        return Err(DomainError::ValidationFailed("member id cannot be empty".into()));
    }
    Ok(())
}

fn display_name_or_id(member_id: &str, display_name: &str) -> DomainResult<String> {
    require_member_id(member_id)?;
    let name = display_name.trim();
    Ok(if name.is_empty() { member_id.to_string() } else { name.to_string() })
}
