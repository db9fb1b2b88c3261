//! `tasklink run` and `tasklink daemon`.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use tasklink_core::Config;
use tasklink_daemon::{init_tracing, run_once_blocking, start_blocking};
use tasklink_sync::{PairingStatus, RunSummary};

use super::home;

/// Arguments for `tasklink run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when any pairing failed.
    #[arg(long)]
    pub strict: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let config = Config::load_at(&home).context("failed to load ~/.tasklink/config.yaml")?;
        init_tracing(config.log_format);

        let summary = run_once_blocking(&config, &home).context("sync run failed")?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        if self.strict && summary.failed_pairings() > 0 {
            bail!("{} pairing(s) failed", summary.failed_pairings());
        }
        Ok(())
    }
}

pub fn daemon() -> Result<()> {
    let home = home()?;
    let config = Config::load_at(&home).context("failed to load ~/.tasklink/config.yaml")?;
    init_tracing(config.log_format);
    start_blocking(&config, &home).context("daemon exited with error")
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "pairing")]
    pairing: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "created")]
    created: usize,
    #[tabled(rename = "updated")]
    updated: usize,
    #[tabled(rename = "unchanged")]
    unchanged: usize,
    #[tabled(rename = "skipped")]
    skipped: usize,
    #[tabled(rename = "failures")]
    failures: usize,
}

fn print_summary(summary: &RunSummary) {
    let rows: Vec<SummaryRow> = summary
        .pairings
        .iter()
        .map(|p| match &p.status {
            PairingStatus::Ok { report } => SummaryRow {
                pairing: format!("#{} {}", p.pairing_id, p.name),
                status: if report.failures.is_empty() {
                    "ok".green().to_string()
                } else {
                    "partial".yellow().to_string()
                },
                created: report.created,
                updated: report.updated,
                unchanged: report.unchanged,
                skipped: report.skipped,
                failures: report.failures.len(),
            },
            PairingStatus::Failed { .. } => SummaryRow {
                pairing: format!("#{} {}", p.pairing_id, p.name),
                status: "failed".red().to_string(),
                created: 0,
                updated: 0,
                unchanged: 0,
                skipped: 0,
                failures: 0,
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for p in &summary.pairings {
        match &p.status {
            PairingStatus::Failed { error } => {
                println!("{} #{} {}: {}", "✗".red(), p.pairing_id, p.name, error);
            }
            PairingStatus::Ok { report } => {
                for failure in &report.failures {
                    println!(
                        "{} #{} {} ({}): {}",
                        "!".yellow(),
                        p.pairing_id,
                        failure.task_id,
                        failure.operation,
                        failure.error
                    );
                }
                if report.assignee_gaps > 0 {
                    println!(
                        "{} #{} {} assignee(s) had no crosswalk entry",
                        "!".yellow(),
                        p.pairing_id,
                        report.assignee_gaps
                    );
                }
            }
        }
    }

    println!(
        "✓ {} created, {} updated in {} ms",
        summary.created(),
        summary.updated(),
        summary.duration_ms
    );
}
