//! Notification dispatcher port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a dispatcher. These never reach completion callers.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification dispatcher is not configured: {0}")]
    NotConfigured(String),
}

/// "Task completed" announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedNotice {
    pub member_id: String,
    pub task_name: String,
    pub xp_earned: u32,
    pub total_xp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Tier change announcement for the highest tier crossed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCrossedNotice {
    pub member_id: String,
    pub old_xp: u64,
    pub new_xp: u64,
    pub tier_crossed: String,
}

/// Best-effort side channel for announcements and external role grants.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn task_completed(&self, notice: &TaskCompletedNotice) -> Result<(), NotifyError>;

    async fn tier_crossed(&self, notice: &TierCrossedNotice) -> Result<(), NotifyError>;

    /// Grant the external role that mirrors a tier.
    async fn grant_tier_role(&self, member_id: &str, tier: &str) -> Result<(), NotifyError>;
}
