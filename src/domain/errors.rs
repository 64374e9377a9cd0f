//! Domain errors for the progression engine.

use thiserror::Error;

/// Domain-level errors that can occur while recording progression.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task {0} can only be granted by a moderator")]
    ForbiddenTask(String),

    #[error("Task {task_id} requires a comment; {remaining} more character(s) needed")]
    CommentRequired { task_id: String, remaining: usize },

    #[error("Task {task_id} was already completed by member {member_id}")]
    AlreadyCompleted { member_id: String, task_id: String },

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// Whether the caller may retry the whole operation.
    ///
    /// Only storage failures qualify. A retried completion either lands once
    /// or comes back as [`DomainError::AlreadyCompleted`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "task_not_found",
            Self::ForbiddenTask(_) => "forbidden_task",
            Self::CommentRequired { .. } => "comment_required",
            Self::AlreadyCompleted { .. } => "already_completed",
            Self::MemberNotFound(_) => "member_not_found",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Persistence(_) => "persistence_error",
            Self::SerializationError(_) => "serialization_error",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
