//! Reconciliation between stored member totals and the completion ledger.
//!
//! The ledger is authoritative. A report compares the incrementally
//! maintained `total_xp` with the ledger sum; a repair resets the stored
//! total to the ledger sum in a single statement. Reads are not taken in one
//! snapshot, so a completion committing between them can show a transient
//! drift that disappears on the next run.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{CompletionLedger, MemberStore};

/// Comparison of one member's stored total against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub member_id: String,
    pub stored_xp: u64,
    pub ledger_xp: u64,
    /// `stored_xp - ledger_xp`
    pub drift: i128,
    pub repaired: bool,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.drift == 0
    }
}

pub struct ReconciliationService<L: CompletionLedger, M: MemberStore> {
    ledger: Arc<L>,
    members: Arc<M>,
}

impl<L: CompletionLedger, M: MemberStore> ReconciliationService<L, M> {
    pub fn new(ledger: Arc<L>, members: Arc<M>) -> Self {
        Self { ledger, members }
    }

    /// Compare one member; `repair` resets a drifting total to the ledger sum.
    pub async fn reconcile_member(&self, member_id: &str, repair: bool) -> DomainResult<ReconciliationReport> {
        let member = self
            .members
            .get(member_id)
            .await?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;
        let ledger_xp = self.ledger.sum_xp(member_id).await?;

        let mut report = ReconciliationReport {
            member_id: member_id.to_string(),
            stored_xp: member.total_xp,
            ledger_xp,
            drift: i128::from(member.total_xp) - i128::from(ledger_xp),
            repaired: false,
        };

        if !report.is_consistent() {
            tracing::warn!(
                member_id,
                stored_xp = report.stored_xp,
                ledger_xp = report.ledger_xp,
                drift = %report.drift,
                "member XP drifted from ledger"
            );
            if repair {
                let repaired_xp = self.members.repair_total_xp(member_id).await?;
                tracing::info!(member_id, repaired_xp, "member XP reset to ledger sum");
                report.repaired = true;
            }
        }

        Ok(report)
    }

    /// Reconcile every member. Returns one report per member.
    pub async fn reconcile_all(&self, repair: bool) -> DomainResult<Vec<ReconciliationReport>> {
        let members = self.members.list_by_xp(None).await?;
        let mut reports = Vec::with_capacity(members.len());
        for member in members {
            reports.push(self.reconcile_member(&member.member_id, repair).await?);
        }

        let drifting = reports.iter().filter(|r| !r.is_consistent()).count();
        tracing::info!(members = reports.len(), drifting, repair, "reconciliation finished");
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteCompletionLedger, SqliteMemberStore, SqliteProgressionStore,
    };
    use crate::domain::models::{NewCompletion, Task};
    use crate::domain::ports::ProgressionStore;

    #[tokio::test]
    async fn test_consistent_after_completions() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = SqliteProgressionStore::new(pool.clone());
        let walk = Task::new("walk", "Walk", 10).repeatable();
        for _ in 0..3 {
            store.apply_completion(&NewCompletion::for_task(&walk, "m-1", "Mia", None)).await.unwrap();
        }

        let service = ReconciliationService::new(
            Arc::new(SqliteCompletionLedger::new(pool.clone())),
            Arc::new(SqliteMemberStore::new(pool)),
        );
        let report = service.reconcile_member("m-1", false).await.unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.ledger_xp, 30);
    }

    #[tokio::test]
    async fn test_drift_is_reported_and_repaired() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = SqliteProgressionStore::new(pool.clone());
        let intro = Task::new("intro", "Intro", 20);
        store.apply_completion(&NewCompletion::for_task(&intro, "m-1", "Mia", None)).await.unwrap();

        sqlx::query("UPDATE members SET total_xp = 75 WHERE member_id = 'm-1'")
            .execute(&pool)
            .await
            .unwrap();

        let members = Arc::new(SqliteMemberStore::new(pool.clone()));
        let service = ReconciliationService::new(
            Arc::new(SqliteCompletionLedger::new(pool)),
            members.clone(),
        );

        let dry = service.reconcile_member("m-1", false).await.unwrap();
        assert_eq!(dry.drift, 55);
        assert!(!dry.repaired);

        let fixed = service.reconcile_all(true).await.unwrap();
        assert_eq!(fixed.len(), 1);
        assert!(fixed[0].repaired);
        assert_eq!(members.get("m-1").await.unwrap().unwrap().total_xp, 20);
        assert!(service.reconcile_member("m-1", false).await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn test_unknown_member() {
        let pool = create_migrated_test_pool().await.unwrap();
        let service = ReconciliationService::new(
            Arc::new(SqliteCompletionLedger::new(pool.clone())),
            Arc::new(SqliteMemberStore::new(pool)),
        );
        assert!(matches!(
            service.reconcile_member("ghost", false).await,
            Err(DomainError::MemberNotFound(_))
        ));
    }
}
