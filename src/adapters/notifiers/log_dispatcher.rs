//! Dispatcher that only writes structured log lines.

use async_trait::async_trait;

use crate::domain::ports::{NotificationDispatcher, NotifyError, TaskCompletedNotice, TierCrossedNotice};

#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn task_completed(&self, notice: &TaskCompletedNotice) -> Result<(), NotifyError> {
        tracing::info!(
            member_id = %notice.member_id,
            task = %notice.task_name,
            xp_earned = notice.xp_earned,
            total_xp = notice.total_xp,
            "task completed"
        );
        Ok(())
    }

    async fn tier_crossed(&self, notice: &TierCrossedNotice) -> Result<(), NotifyError> {
        tracing::info!(
            member_id = %notice.member_id,
            tier = %notice.tier_crossed,
            old_xp = notice.old_xp,
            new_xp = notice.new_xp,
            "tier reached"
        );
        Ok(())
    }

    async fn grant_tier_role(&self, member_id: &str, tier: &str) -> Result<(), NotifyError> {
        tracing::info!(member_id, tier, "tier role granted");
        Ok(())
    }
}
