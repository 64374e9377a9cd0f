pub mod completion;
pub mod config;
pub mod member;
pub mod task;
pub mod tier;

pub use completion::{
    completion_counts, CommittedCompletion, CompletionEvent, CompletionOutcome, CompletionRequest,
    CompletionResponse, GrantRequest, NewCompletion,
};
pub use config::{
    CatalogConfig, Config, DatabaseConfig, LoggingConfig, NotificationConfig, ProgressionConfig,
};
pub use member::{MemberProgress, MemberRecord};
pub use task::Task;
pub use tier::{evaluate_thresholds, TierLadder, TierThreshold};
