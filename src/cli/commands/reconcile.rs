//! Ledger reconciliation command.

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::cli::table::{list_table, number_cell};
use crate::domain::models::Config;
use crate::services::ReconciliationReport;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Only check this member
    #[arg(short, long)]
    pub member: Option<String>,

    /// Reset drifting totals to the ledger sum
    #[arg(long)]
    pub repair: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ReconcileOutput {
    pub checked: usize,
    pub drifting: usize,
    pub repaired: usize,
    pub reports: Vec<ReconciliationReport>,
}

impl From<Vec<ReconciliationReport>> for ReconcileOutput {
    fn from(reports: Vec<ReconciliationReport>) -> Self {
        Self {
            checked: reports.len(),
            drifting: reports.iter().filter(|r| !r.is_consistent()).count(),
            repaired: reports.iter().filter(|r| r.repaired).count(),
            reports,
        }
    }
}

impl CommandOutput for ReconcileOutput {
    fn to_human(&self) -> String {
        let summary = format!(
            "Checked {} member(s): {} drifting, {} repaired",
            self.checked, self.drifting, self.repaired
        );
        if self.drifting == 0 {
            return summary;
        }

        let mut table = list_table(&["member", "stored", "ledger", "drift", "repaired"]);
        for report in self.reports.iter().filter(|r| !r.is_consistent()) {
            table.add_row(vec![
                Cell::new(&report.member_id),
                number_cell(report.stored_xp),
                number_cell(report.ledger_xp),
                number_cell(format!("{:+}", report.drift)),
                Cell::new(if report.repaired { "yes" } else { "no" }),
            ]);
        }
        format!("{summary}\n{table}")
    }
}

pub async fn execute(args: ReconcileArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config, false).await?;
    let service = ctx.reconciliation();

    let result = match &args.member {
        Some(member_id) => service.reconcile_member(member_id, args.repair).await.map(|r| vec![r]),
        None => service.reconcile_all(args.repair).await,
    };
    ctx.shutdown().await;

    output(&ReconcileOutput::from(result?), json_mode);
    Ok(())
}
