//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - TaskCatalog: read-only task definitions
//! - CompletionLedger: append-only completion events
//! - MemberStore: member records and cumulative XP
//! - ProgressionStore: atomic ledger write plus XP increment
//! - NotificationDispatcher: best-effort announcements and role grants

pub mod completion_ledger;
pub mod member_store;
pub mod notifier;
pub mod null_notifier;
pub mod progression_store;
pub mod task_catalog;

pub use completion_ledger::CompletionLedger;
pub use member_store::MemberStore;
pub use notifier::{NotificationDispatcher, NotifyError, TaskCompletedNotice, TierCrossedNotice};
pub use null_notifier::NullDispatcher;
pub use progression_store::ProgressionStore;
pub use task_catalog::TaskCatalog;
