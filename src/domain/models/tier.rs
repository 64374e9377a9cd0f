//! Tier ladder and threshold evaluation.
//!
//! Tiers are never persisted. A member's tier is always recomputed from the
//! current XP, and a tier change is only ever detected from the
//! `(old_xp, new_xp)` pair returned by the atomic XP increment.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// A single `(xp, name)` boundary of the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub xp: u64,
    pub name: String,
}

impl TierThreshold {
    pub fn new(xp: u64, name: impl Into<String>) -> Self {
        Self { xp, name: name.into() }
    }
}

/// Return the names of all thresholds crossed when XP moves from `old_xp` to
/// `new_xp`.
///
/// A threshold `t` is crossed iff `old_xp < t <= new_xp`. The result keeps
/// the ascending order of `thresholds`, which callers must supply sorted.
pub fn evaluate_thresholds(old_xp: u64, new_xp: u64, thresholds: &[TierThreshold]) -> Vec<String> {
    thresholds
        .iter()
        .filter(|t| old_xp < t.xp && t.xp <= new_xp)
        .map(|t| t.name.clone())
        .collect()
}

/// Ordered tier configuration: a base tier plus ascending thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierLadder {
    base_tier: String,
    thresholds: Vec<TierThreshold>,
}

impl TierLadder {
    /// Build a ladder, rejecting unordered, duplicate or zero thresholds.
    pub fn new(base_tier: impl Into<String>, thresholds: Vec<TierThreshold>) -> DomainResult<Self> {
        let base_tier = base_tier.into();
        if base_tier.trim().is_empty() {
            return Err(DomainError::ValidationFailed("base tier name cannot be empty".into()));
        }

        let mut previous = 0u64;
        for threshold in &thresholds {
            if threshold.name.trim().is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "tier at {} XP has an empty name",
                    threshold.xp
                )));
            }
            if threshold.xp <= previous {
                return Err(DomainError::ValidationFailed(format!(
                    "tier thresholds must be strictly ascending and positive (got {} after {})",
                    threshold.xp, previous
                )));
            }
            previous = threshold.xp;
        }

        Ok(Self { base_tier, thresholds })
    }

    /// The reference deployment: three tiers split at 150 and 400 XP.
    pub fn reference() -> Self {
        Self {
            base_tier: "Bürger".to_string(),
            thresholds: vec![
                TierThreshold::new(150, "Engagierter Bürger"),
                TierThreshold::new(400, "Vorbildlicher Bürger"),
            ],
        }
    }

    pub fn base_tier(&self) -> &str {
        &self.base_tier
    }

    pub fn thresholds(&self) -> &[TierThreshold] {
        &self.thresholds
    }

    /// Tier for the given XP total.
    pub fn tier_for(&self, xp: u64) -> &str {
        self.thresholds
            .iter()
            .rev()
            .find(|t| t.xp <= xp)
            .map_or(self.base_tier.as_str(), |t| t.name.as_str())
    }

    /// Tier names crossed by an XP change, ascending.
    pub fn crossed(&self, old_xp: u64, new_xp: u64) -> Vec<String> {
        evaluate_thresholds(old_xp, new_xp, &self.thresholds)
    }

    /// The next threshold above `xp`, if any.
    pub fn next_threshold(&self, xp: u64) -> Option<&TierThreshold> {
        self.thresholds.iter().find(|t| t.xp > xp)
    }
}

impl Default for TierLadder {
    fn default() -> Self {
        Self::reference()
    }
}
