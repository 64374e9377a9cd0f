//! Civic Quest - task completion ledger and XP progression engine
//!
//! Members complete catalog tasks, every completion is appended to a ledger,
//! and cumulative XP moves members up a tier ladder. Non-repeatable tasks can
//! be completed at most once per member, even under concurrent submissions.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Adapter Layer** (`adapters`): SQLite storage, task catalog, notifiers
//! - **Service Layer** (`services`): Completion workflow, relay, reconciliation
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use civic_quest::domain::models::CompletionRequest;
//!
//! let outcome = service
//!     .complete_task(CompletionRequest {
//!         member_id: "m-1".into(),
//!         display_name: "Mia".into(),
//!         task_id: "complete-profile".into(),
//!         comment: None,
//!     })
//!     .await?;
//! println!("{} -> {}", outcome.old_xp, outcome.new_xp);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CompletionEvent, CompletionOutcome, CompletionRequest, CompletionResponse, Config, GrantRequest,
    MemberProgress, MemberRecord, Task, TierLadder, TierThreshold,
};
pub use domain::ports::{
    CompletionLedger, MemberStore, NotificationDispatcher, ProgressionStore, TaskCatalog,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{NotificationRelay, ProgressionService, ReconciliationService};
