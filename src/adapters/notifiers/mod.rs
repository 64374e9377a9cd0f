//! Notification dispatcher adapters.

pub mod log_dispatcher;
pub mod webhook;

pub use log_dispatcher::LogDispatcher;
pub use webhook::WebhookDispatcher;

use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::NotificationConfig;
use crate::domain::ports::{NotificationDispatcher, NotifyError, NullDispatcher};

/// Pick the dispatcher for the configuration: nothing when disabled, webhook
/// when a URL is set, tracing-only otherwise.
pub fn dispatcher_from_config(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationDispatcher>, NotifyError> {
    if !config.enabled {
        return Ok(Arc::new(NullDispatcher::new()));
    }

    match &config.webhook_url {
        Some(url) if !url.trim().is_empty() => {
            let dispatcher = WebhookDispatcher::new(
                url.clone(),
                config.channel.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(dispatcher))
        }
        _ => Ok(Arc::new(LogDispatcher::new())),
    }
}
