//! Member record store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::MemberRecord;

/// One record per member holding the cumulative XP.
///
/// XP is only ever changed through [`super::ProgressionStore`]; this port
/// exposes reads, profile sync and the reconciliation repair.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn get(&self, member_id: &str) -> DomainResult<Option<MemberRecord>>;

    /// Create the member with zero XP, or refresh the display name.
    async fn sync_profile(&self, member_id: &str, display_name: &str) -> DomainResult<MemberRecord>;

    /// Members ordered by XP, highest first.
    async fn list_by_xp(&self, limit: Option<usize>) -> DomainResult<Vec<MemberRecord>>;

    /// Reset the stored total to the sum of the member's ledger in one
    /// statement and return it. Reserved for reconciliation repairs.
    async fn repair_total_xp(&self, member_id: &str) -> DomainResult<u64>;
}
