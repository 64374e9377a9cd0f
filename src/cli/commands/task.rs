//! Task catalog and completion commands.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;

use crate::adapters::catalog::StaticTaskCatalog;
use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::{list_table, number_cell, render_list};
use crate::domain::models::{CompletionOutcome, CompletionRequest, CompletionResponse, Config, GrantRequest, Task};
use crate::domain::ports::TaskCatalog;

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Only show tasks in this category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Member identifier
    pub member: String,
    /// Task identifier
    pub task: String,
    /// Display name to store for the member (defaults to the member id)
    #[arg(short, long, default_value = "")]
    pub name: String,
    /// Completion comment, required by some tasks
    #[arg(short, long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct GrantArgs {
    /// Member identifier
    pub member: String,
    /// Task identifier
    pub task: String,
    /// Identifier of the granting moderator
    #[arg(long = "by")]
    pub granted_by: String,
    /// Display name to store for the member (defaults to the member id)
    #[arg(short, long, default_value = "")]
    pub name: String,
    /// Completion comment, required by some tasks
    #[arg(short, long)]
    pub comment: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct TaskListOutput {
    pub tasks: Vec<Task>,
    pub total: usize,
}

impl CommandOutput for TaskListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "category", "xp", "rules"]);
        for task in &self.tasks {
            table.add_row(vec![
                Cell::new(&task.id),
                Cell::new(truncate(&task.name, 40)),
                Cell::new(&task.category),
                number_cell(task.xp),
                Cell::new(task_rules(task)),
            ]);
        }
        render_list("task", &table, self.total)
    }
}

fn task_rules(task: &Task) -> String {
    let mut rules = Vec::new();
    if task.repeatable {
        rules.push("repeatable");
    }
    if task.requires_comment {
        rules.push("comment");
    }
    if task.restricted_assignment {
        rules.push("moderator");
    }
    rules.join(", ")
}

/// Completion response plus routing fields, camelCase like the API payload.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutput {
    #[serde(flatten)]
    pub response: CompletionResponse,
    pub member_id: String,
    pub task_id: String,
    pub tiers_crossed: Vec<String>,
}

impl From<&CompletionOutcome> for CompletionOutput {
    fn from(outcome: &CompletionOutcome) -> Self {
        Self {
            response: outcome.response(),
            member_id: outcome.event.member_id.clone(),
            task_id: outcome.event.task_id.clone(),
            tiers_crossed: outcome.crossed_tiers.clone(),
        }
    }
}

impl CommandOutput for CompletionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} completed \"{}\": +{} XP ({} -> {})",
            self.member_id,
            self.response.task_name,
            self.response.xp_earned,
            self.response.old_xp,
            self.response.total_xp
        )];
        if let Some(highest) = self.tiers_crossed.last() {
            lines.push(format!("New tier reached: {highest}"));
        }
        lines.join("\n")
    }
}

pub async fn list(args: TasksArgs, config: &Config, json_mode: bool) -> Result<()> {
    let catalog = StaticTaskCatalog::load(config.catalog.path.as_deref()).context("Failed to load task catalog")?;
    let mut tasks = catalog.list_tasks().await?;
    if let Some(category) = &args.category {
        tasks.retain(|t| t.category.eq_ignore_ascii_case(category));
    }

    let total = tasks.len();
    output(&TaskListOutput { tasks, total }, json_mode);
    Ok(())
}

pub async fn complete(args: CompleteArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config, true).await?;
    let request = CompletionRequest {
        member_id: args.member,
        display_name: args.name,
        task_id: args.task,
        comment: args.comment,
    };

    let result = ctx.service.complete_task(request).await;
    ctx.shutdown().await;

    let outcome = result?;
    output(&CompletionOutput::from(&outcome), json_mode);
    Ok(())
}

pub async fn grant(args: GrantArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config, true).await?;
    let request = GrantRequest {
        member_id: args.member,
        display_name: args.name,
        task_id: args.task,
        granted_by: args.granted_by,
        comment: args.comment,
    };

    let result = ctx.service.grant_task(request).await;
    ctx.shutdown().await;

    let outcome = result?;
    output(&CompletionOutput::from(&outcome), json_mode);
    Ok(())
}
