//! Member record and progress views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record per member holding cumulative XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: String,
    pub display_name: String,
    pub total_xp: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberRecord {
    /// A freshly created member starts with zero XP.
    pub fn new(member_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            member_id: member_id.into(),
            display_name: display_name.into(),
            total_xp: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Member query view combining the stored record with ledger-derived data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProgress {
    pub member: MemberRecord,
    /// Tier derived from the current XP; never stored
    pub tier: String,
    /// Distinct task ids in first-completion order
    pub completed_task_ids: Vec<String>,
    pub completion_counts: BTreeMap<String, u64>,
}

impl MemberProgress {
    pub fn total_xp(&self) -> u64 {
        self.member.total_xp
    }

    pub fn has_completed(&self, task_id: &str) -> bool {
        self.completion_counts.contains_key(task_id)
    }
}
