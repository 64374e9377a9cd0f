//! Null notification dispatcher.
//!
//! Used when announcements are disabled but the relay still needs a target.

use async_trait::async_trait;

use super::notifier::{NotificationDispatcher, NotifyError, TaskCompletedNotice, TierCrossedNotice};

/// A dispatcher that drops everything.
#[derive(Debug, Clone, Default)]
pub struct NullDispatcher;

impl NullDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for NullDispatcher {
    async fn task_completed(&self, _notice: &TaskCompletedNotice) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn tier_crossed(&self, _notice: &TierCrossedNotice) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn grant_tier_role(&self, _member_id: &str, _tier: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
