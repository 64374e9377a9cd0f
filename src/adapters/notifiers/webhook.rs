//! Webhook dispatcher.
//!
//! Posts every notification as a JSON envelope to a single URL, the way
//! chat platforms accept incoming bot messages. Any non-2xx response is an
//! error; the relay logs it and moves on.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::ports::{NotificationDispatcher, NotifyError, TaskCompletedNotice, TierCrossedNotice};

/// Wire envelope for every webhook call.
#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    channel: &'a str,
    event: &'a str,
    data: &'a T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleGrant<'a> {
    member_id: &'a str,
    role: &'a str,
}

#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    http: Client,
    url: String,
    channel: String,
}

impl WebhookDispatcher {
    pub fn new(url: String, channel: String, timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("civic-quest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::NotConfigured(e.to_string()))?;
        Ok(Self { http, url, channel })
    }

    async fn post<T: Serialize + Sync>(&self, event: &str, data: &T) -> Result<(), NotifyError> {
        let envelope = Envelope { channel: &self.channel, event, data };

        let response = self
            .http
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        tracing::debug!(event, status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    async fn task_completed(&self, notice: &TaskCompletedNotice) -> Result<(), NotifyError> {
        self.post("task_completed", notice).await
    }

    async fn tier_crossed(&self, notice: &TierCrossedNotice) -> Result<(), NotifyError> {
        self.post("tier_crossed", notice).await
    }

    async fn grant_tier_role(&self, member_id: &str, tier: &str) -> Result<(), NotifyError> {
        self.post("role_granted", &RoleGrant { member_id, role: tier }).await
    }
}
