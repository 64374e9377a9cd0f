//! SQLite implementation of the CompletionLedger.
//!
//! Uniqueness for non-repeatable tasks is enforced by the partial unique
//! index `idx_completions_once`, so the check and the insert are one
//! statement. A constraint violation is reported as
//! [`DomainError::AlreadyCompleted`].

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompletionEvent, NewCompletion};
use crate::domain::ports::CompletionLedger;

use super::{parse_datetime, parse_uuid, parse_xp};

#[derive(Clone)]
pub struct SqliteCompletionLedger {
    pool: SqlitePool,
}

impl SqliteCompletionLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a ledger row on an existing connection or transaction.
pub(crate) async fn insert_completion(
    conn: &mut SqliteConnection,
    completion: &NewCompletion,
) -> DomainResult<CompletionEvent> {
    let event = completion.clone().into_event();

    let result = sqlx::query(
        r#"INSERT INTO completions (id, member_id, task_id, xp_earned, comment, repeatable,
           granted_by, completed_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(event.id.to_string())
    .bind(&event.member_id)
    .bind(&event.task_id)
    .bind(i64::from(event.xp_earned))
    .bind(&event.comment)
    .bind(event.repeatable)
    .bind(&event.granted_by)
    .bind(event.completed_at.to_rfc3339())
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(event),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(DomainError::AlreadyCompleted {
                member_id: completion.member_id.clone(),
                task_id: completion.task_id.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CompletionLedger for SqliteCompletionLedger {
    async fn record_completion(&self, completion: &NewCompletion) -> DomainResult<CompletionEvent> {
        let mut conn = self.pool.acquire().await?;
        insert_completion(&mut *conn, completion).await
    }

    async fn list_completions(&self, member_id: &str) -> DomainResult<Vec<CompletionEvent>> {
        let rows: Vec<CompletionRow> = sqlx::query_as(
            r#"SELECT id, member_id, task_id, xp_earned, comment, repeatable, granted_by, completed_at
               FROM completions WHERE member_id = ? ORDER BY seq"#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn sum_xp(&self, member_id: &str) -> DomainResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(xp_earned), 0) FROM completions WHERE member_id = ?",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        parse_xp(total)
    }
}

#[derive(sqlx::FromRow)]
struct CompletionRow {
    id: String,
    member_id: String,
    task_id: String,
    xp_earned: i64,
    comment: Option<String>,
    repeatable: bool,
    granted_by: Option<String>,
    completed_at: String,
}

impl TryFrom<CompletionRow> for CompletionEvent {
    type Error = DomainError;

    fn try_from(row: CompletionRow) -> Result<Self, Self::Error> {
        let xp_earned = u32::try_from(row.xp_earned).map_err(|_| {
            DomainError::SerializationError(format!("Invalid xp_earned: {}", row.xp_earned))
        })?;

        Ok(CompletionEvent {
            id: parse_uuid(&row.id)?,
            member_id: row.member_id,
            task_id: row.task_id,
            xp_earned,
            comment: row.comment,
            repeatable: row.repeatable,
            granted_by: row.granted_by,
            completed_at: parse_datetime(&row.completed_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::Task;

    async fn setup_test_ledger() -> SqliteCompletionLedger {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteCompletionLedger::new(pool)
    }

    #[tokio::test]
    async fn test_record_and_list_completion() {
        let ledger = setup_test_ledger().await;
        let task = Task::new("intro", "Introduce yourself", 10);

        let event = ledger
            .record_completion(&NewCompletion::for_task(&task, "m-1", "Mia", Some("Hallo!".into())))
            .await
            .unwrap();

        let listed = ledger.list_completions("m-1").await.unwrap();
        assert_eq!(listed, vec![event]);
        assert_eq!(listed[0].comment.as_deref(), Some("Hallo!"));
    }

    #[tokio::test]
    async fn test_duplicate_non_repeatable_is_rejected() {
        let ledger = setup_test_ledger().await;
        let task = Task::new("intro", "Introduce yourself", 10);
        let completion = NewCompletion::for_task(&task, "m-1", "Mia", None);

        ledger.record_completion(&completion).await.unwrap();
        let second = ledger.record_completion(&completion).await;

        assert!(matches!(second, Err(DomainError::AlreadyCompleted { .. })));
        assert_eq!(ledger.list_completions("m-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_task_for_different_members() {
        let ledger = setup_test_ledger().await;
        let task = Task::new("intro", "Introduce yourself", 10);

        ledger.record_completion(&NewCompletion::for_task(&task, "m-1", "Mia", None)).await.unwrap();
        ledger.record_completion(&NewCompletion::for_task(&task, "m-2", "Jon", None)).await.unwrap();

        assert_eq!(ledger.list_completions("m-1").await.unwrap().len(), 1);
        assert_eq!(ledger.list_completions("m-2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeatable_rows_are_counted() {
        let ledger = setup_test_ledger().await;
        let walk = Task::new("walk", "Neighbourhood walk", 5).repeatable();
        let intro = Task::new("intro", "Introduce yourself", 10);

        for _ in 0..3 {
            ledger.record_completion(&NewCompletion::for_task(&walk, "m-1", "Mia", None)).await.unwrap();
        }
        ledger.record_completion(&NewCompletion::for_task(&intro, "m-1", "Mia", None)).await.unwrap();

        let counts = ledger.completion_counts("m-1").await.unwrap();
        assert_eq!(counts.get("walk"), Some(&3));
        assert_eq!(counts.get("intro"), Some(&1));
        assert_eq!(ledger.sum_xp("m-1").await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_sum_xp_for_unknown_member_is_zero() {
        let ledger = setup_test_ledger().await;
        assert_eq!(ledger.sum_xp("nobody").await.unwrap(), 0);
    }
}
