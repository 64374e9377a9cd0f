//! SQLite implementation of the ProgressionStore.
//!
//! Every statement inside the transaction is a write, starting with the
//! ledger insert. SQLite takes the write lock on the first statement, so a
//! transaction never reads a snapshot it later has to upgrade, and
//! concurrent completions queue on `busy_timeout` instead of racing.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CommittedCompletion, NewCompletion};
use crate::domain::ports::ProgressionStore;

use super::completion_ledger::insert_completion;
use super::member_store::{increment_xp, upsert_member};

#[derive(Clone)]
pub struct SqliteProgressionStore {
    pool: SqlitePool,
}

impl SqliteProgressionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressionStore for SqliteProgressionStore {
    async fn apply_completion(&self, completion: &NewCompletion) -> DomainResult<CommittedCompletion> {
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` on any early return rolls the transaction back.
        let event = insert_completion(&mut *tx, completion).await?;
        upsert_member(&mut *tx, &completion.member_id, completion.display_name.as_deref()).await?;
        let new_xp = increment_xp(&mut *tx, &completion.member_id, completion.xp_earned).await?;

        tx.commit().await?;

        let old_xp = new_xp.checked_sub(u64::from(completion.xp_earned)).ok_or_else(|| {
            DomainError::Persistence(format!(
                "member {} total {} is below the XP just awarded",
                completion.member_id, new_xp
            ))
        })?;

        tracing::debug!(
            member_id = %completion.member_id,
            task_id = %completion.task_id,
            old_xp,
            new_xp,
            "completion committed"
        );

        Ok(CommittedCompletion { event, old_xp, new_xp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCompletionLedger, SqliteMemberStore};
    use crate::domain::models::Task;
    use crate::domain::ports::{CompletionLedger, MemberStore};

    #[tokio::test]
    async fn test_apply_creates_member_and_awards_xp() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = SqliteProgressionStore::new(pool.clone());
        let task = Task::new("intro", "Introduce yourself", 20);

        let committed = store
            .apply_completion(&NewCompletion::for_task(&task, "m-1", "Mia", None))
            .await
            .unwrap();

        assert_eq!(committed.old_xp, 0);
        assert_eq!(committed.new_xp, 20);
        let member = SqliteMemberStore::new(pool).get("m-1").await.unwrap().unwrap();
        assert_eq!(member.total_xp, 20);
    }

    #[tokio::test]
    async fn test_duplicate_leaves_xp_unchanged() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = SqliteProgressionStore::new(pool.clone());
        let task = Task::new("intro", "Introduce yourself", 20);
        let completion = NewCompletion::for_task(&task, "m-1", "Mia", None);

        store.apply_completion(&completion).await.unwrap();
        let second = store.apply_completion(&completion).await;

        assert!(matches!(second, Err(DomainError::AlreadyCompleted { .. })));
        let member = SqliteMemberStore::new(pool.clone()).get("m-1").await.unwrap().unwrap();
        assert_eq!(member.total_xp, 20);
        assert_eq!(SqliteCompletionLedger::new(pool).list_completions("m-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_old_xp_is_pre_increment_total() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = SqliteProgressionStore::new(pool);
        let walk = Task::new("walk", "Neighbourhood walk", 15).repeatable();

        let first = store.apply_completion(&NewCompletion::for_task(&walk, "m-1", "Mia", None)).await.unwrap();
        let second = store.apply_completion(&NewCompletion::for_task(&walk, "m-1", "Mia", None)).await.unwrap();

        assert_eq!((first.old_xp, first.new_xp), (0, 15));
        assert_eq!((second.old_xp, second.new_xp), (15, 30));
    }
}
