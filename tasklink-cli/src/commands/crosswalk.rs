//! `tasklink crosswalk ...` — ClickUp user id -> Motion user id mapping.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use tasklink_core::CrosswalkEntry;

use super::open_store;

#[derive(Subcommand, Debug)]
pub enum CrosswalkCommand {
    /// Map a ClickUp user to a Motion user (replaces an existing mapping).
    Add(AddArgs),
    /// List all mappings.
    List,
    /// Remove the mapping for a ClickUp user.
    Remove { clickup_user: String },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub clickup_user: String,
    pub motion_user: String,
    #[arg(long)]
    pub label: Option<String>,
}

pub fn run(cmd: CrosswalkCommand) -> Result<()> {
    match cmd {
        CrosswalkCommand::Add(args) => {
            let entry = CrosswalkEntry {
                clickup_user_id: args.clickup_user,
                motion_user_id: args.motion_user,
                label: args.label,
            };
            open_store()?
                .upsert_crosswalk_entry(&entry)
                .context("failed to save crosswalk entry")?;
            println!(
                "✓ ClickUp user {} -> Motion user {}",
                entry.clickup_user_id, entry.motion_user_id
            );
            Ok(())
        }
        CrosswalkCommand::List => list(),
        CrosswalkCommand::Remove { clickup_user } => {
            if open_store()?.delete_crosswalk_entry(&clickup_user)? {
                println!("✓ Removed mapping for ClickUp user {clickup_user}");
            } else {
                println!("No mapping for ClickUp user {clickup_user}");
            }
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct CrosswalkRow {
    #[tabled(rename = "clickup user")]
    clickup_user: String,
    #[tabled(rename = "motion user")]
    motion_user: String,
    #[tabled(rename = "label")]
    label: String,
}

fn list() -> Result<()> {
    let entries = open_store()?.list_crosswalk()?;
    if entries.is_empty() {
        println!("No crosswalk entries. Unmapped assignees are dropped on creation.");
        return Ok(());
    }
    let rows: Vec<CrosswalkRow> = entries
        .into_iter()
        .map(|e| CrosswalkRow {
            clickup_user: e.clickup_user_id,
            motion_user: e.motion_user_id,
            label: e.label.unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
