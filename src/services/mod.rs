//! Service layer: orchestration on top of the domain ports.

pub mod notification_relay;
pub mod progression_service;
pub mod reconciliation_service;

pub use notification_relay::{drain, NotificationRelay, ProgressionEvent, RelayStats};
pub use progression_service::{LeaderboardEntry, ProgressionService, DEFAULT_COMMENT_MIN_CHARS};
pub use reconciliation_service::{ReconciliationReport, ReconciliationService};
