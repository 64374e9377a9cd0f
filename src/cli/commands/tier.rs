//! Tier ladder command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;

use crate::cli::output::{output, CommandOutput};
use crate::cli::table::{list_table, number_cell};
use crate::domain::models::{Config, TierLadder};

#[derive(Args, Debug)]
pub struct TiersArgs {
    /// Show which tier this XP total falls into
    #[arg(long)]
    pub xp: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
pub struct TierRow {
    pub name: String,
    pub min_xp: u64,
}

#[derive(Debug, serde::Serialize)]
pub struct TiersOutput {
    pub tiers: Vec<TierRow>,
    pub xp: Option<u64>,
    pub current_tier: Option<String>,
}

impl TiersOutput {
    fn from_ladder(ladder: &TierLadder, xp: Option<u64>) -> Self {
        let mut tiers = vec![TierRow { name: ladder.base_tier().to_string(), min_xp: 0 }];
        tiers.extend(ladder.thresholds().iter().map(|t| TierRow { name: t.name.clone(), min_xp: t.xp }));
        Self {
            tiers,
            xp,
            current_tier: xp.map(|xp| ladder.tier_for(xp).to_string()),
        }
    }
}

impl CommandOutput for TiersOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["min xp", "tier"]);
        for tier in &self.tiers {
            table.add_row(vec![number_cell(tier.min_xp), Cell::new(&tier.name)]);
        }
        match (self.xp, &self.current_tier) {
            (Some(xp), Some(current)) => format!("{table}\n\n{xp} XP is tier \"{current}\""),
            _ => table.to_string(),
        }
    }
}

pub fn execute(args: &TiersArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ladder = config.progression.ladder().context("Invalid tier ladder")?;
    output(&TiersOutput::from_ladder(&ladder, args.xp), json_mode);
    Ok(())
}
