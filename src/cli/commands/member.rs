//! Member and leaderboard commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use std::collections::BTreeMap;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::{list_table, number_cell, render_list};
use crate::domain::errors::DomainError;
use crate::domain::models::{Config, MemberProgress, MemberRecord};
use crate::services::LeaderboardEntry;

#[derive(Args, Debug)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommands,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Show a member's XP, tier and completed tasks
    Show {
        /// Member identifier
        id: String,
    },
    /// Create a member or update the stored display name
    Sync {
        /// Member identifier
        id: String,
        /// Display name
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Maximum number of members to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct MemberDetailOutput {
    pub member_id: String,
    pub display_name: String,
    pub total_xp: u64,
    pub tier: String,
    pub next_tier: Option<String>,
    pub xp_to_next_tier: Option<u64>,
    /// Distinct task ids in first-completion order
    pub completed_task_ids: Vec<String>,
    pub completion_counts: BTreeMap<String, u64>,
}

impl MemberDetailOutput {
    fn new(progress: MemberProgress, next: Option<(String, u64)>) -> Self {
        let (next_tier, xp_to_next_tier) = next.map_or((None, None), |(name, xp)| (Some(name), Some(xp)));
        Self {
            member_id: progress.member.member_id,
            display_name: progress.member.display_name,
            total_xp: progress.member.total_xp,
            tier: progress.tier,
            next_tier,
            xp_to_next_tier,
            completed_task_ids: progress.completed_task_ids,
            completion_counts: progress.completion_counts,
        }
    }
}

impl CommandOutput for MemberDetailOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Member: {} ({})", self.display_name, self.member_id),
            format!("XP: {}", self.total_xp),
            format!("Tier: {}", self.tier),
        ];
        if let (Some(next), Some(missing)) = (&self.next_tier, self.xp_to_next_tier) {
            lines.push(format!("Next tier: {next} in {missing} XP"));
        }

        if self.completion_counts.is_empty() {
            lines.push("\nNo completed tasks yet.".to_string());
        } else {
            lines.push("\nCompleted tasks:".to_string());
            for (task_id, count) in &self.completion_counts {
                if *count > 1 {
                    lines.push(format!("  - {task_id} (x{count})"));
                } else {
                    lines.push(format!("  - {task_id}"));
                }
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct MemberSyncOutput {
    pub success: bool,
    pub member: MemberRecord,
}

impl CommandOutput for MemberSyncOutput {
    fn to_human(&self) -> String {
        format!(
            "Member {} synced as \"{}\" ({} XP)",
            self.member.member_id, self.member.display_name, self.member.total_xp
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct LeaderboardOutput {
    pub entries: Vec<LeaderboardEntry>,
    pub total: usize,
}

impl CommandOutput for LeaderboardOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["#", "member", "name", "xp", "tier"]);
        for entry in &self.entries {
            table.add_row(vec![
                number_cell(entry.rank),
                Cell::new(&entry.member.member_id),
                Cell::new(truncate(&entry.member.display_name, 30)),
                number_cell(entry.member.total_xp),
                Cell::new(&entry.tier),
            ]);
        }
        render_list("member", &table, self.total)
    }
}

pub async fn execute(args: MemberArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config, false).await?;
    let result = run_member_command(&ctx, args.command, json_mode).await;
    ctx.shutdown().await;
    result
}

async fn run_member_command(ctx: &AppContext, command: MemberCommands, json_mode: bool) -> Result<()> {
    match command {
        MemberCommands::Show { id } => {
            let progress = ctx
                .service
                .get_member(&id)
                .await?
                .ok_or(DomainError::MemberNotFound(id))?;
            let next = ctx
                .service
                .ladder()
                .next_threshold(progress.total_xp())
                .map(|t| (t.name.clone(), t.xp - progress.total_xp()));
            output(&MemberDetailOutput::new(progress, next), json_mode);
        }
        MemberCommands::Sync { id, name } => {
            let member = ctx.service.sync_profile(&id, &name).await?;
            output(&MemberSyncOutput { success: true, member }, json_mode);
        }
    }
    Ok(())
}

pub async fn leaderboard(args: LeaderboardArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config, false).await?;
    let result = ctx.service.leaderboard(Some(args.limit)).await;
    ctx.shutdown().await;

    let entries = result?;
    let total = entries.len();
    output(&LeaderboardOutput { entries, total }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(xp: u64, counts: &[(&str, u64)]) -> MemberProgress {
        let mut member = MemberRecord::new("m-1", "Mia");
        member.total_xp = xp;
        MemberProgress {
            member,
            tier: "Bürger".into(),
            completed_task_ids: counts.iter().map(|(id, _)| (*id).to_string()).collect(),
            completion_counts: counts.iter().map(|(id, n)| ((*id).to_string(), *n)).collect(),
        }
    }

    #[test]
    fn test_member_detail_lists_repeat_counts() {
        let out = MemberDetailOutput::new(
            progress(90, &[("attend-meetup", 3), ("complete-profile", 1)]),
            Some(("Engagierter Bürger".into(), 60)),
        );
        let human = out.to_human();
        assert!(human.contains("attend-meetup (x3)"));
        assert!(human.contains("  - complete-profile\n") || human.ends_with("  - complete-profile"));
        assert!(human.contains("Next tier: Engagierter Bürger in 60 XP"));

        let json = out.to_json();
        assert_eq!(json["completed_task_ids"], serde_json::json!(["attend-meetup", "complete-profile"]));
        assert_eq!(json["completion_counts"]["attend-meetup"], 3);
    }

    #[test]
    fn test_member_detail_without_completions() {
        let out = MemberDetailOutput::new(progress(0, &[]), None);
        assert!(out.to_human().contains("No completed tasks yet."));
        assert_eq!(out.to_json()["xp_to_next_tier"], serde_json::Value::Null);
    }
}
