//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;
pub mod table;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::errors::DomainError;

#[derive(Parser, Debug)]
#[command(name = "civic-quest", version, about = "Task completion ledger and XP progression engine")]
pub struct Cli {
    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to civic-quest.yaml in the working directory)
    #[arg(long, short, global = true, env = "CIVIC_QUEST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and a starter configuration file
    Init(commands::init::InitArgs),
    /// List the task catalog
    Tasks(commands::task::TasksArgs),
    /// Complete a task on behalf of a member
    Complete(commands::task::CompleteArgs),
    /// Grant a task to a member as a moderator
    Grant(commands::task::GrantArgs),
    /// Inspect or update members
    Member(commands::member::MemberArgs),
    /// Show members ranked by XP
    Leaderboard(commands::member::LeaderboardArgs),
    /// Show the tier ladder
    Tiers(commands::tier::TiersArgs),
    /// Compare stored XP totals with the completion ledger
    Reconcile(commands::reconcile::ReconcileArgs),
}

/// Print an error and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = err
        .downcast_ref::<DomainError>()
        .map_or("error", DomainError::code);

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "code": code,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
