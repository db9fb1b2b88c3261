//! `tasklink pairing ...` — administrative pairing management.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tasklink_core::{Pairing, PairingId};

use super::{format_time, open_store};

#[derive(Subcommand, Debug)]
pub enum PairingCommand {
    /// Pair a ClickUp list with a Motion workspace.
    Add(AddArgs),
    /// List all pairings with their cursors.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Include a pairing in sync runs.
    Activate { id: i64 },
    /// Exclude a pairing from sync runs without deleting it.
    Deactivate { id: i64 },
    /// Forget the cursor so the next pass rescans everything.
    ResetCursor { id: i64 },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// ClickUp list id.
    pub clickup_list: String,

    /// Motion workspace id.
    pub motion_workspace: String,

    /// Human-readable name shown in logs and summaries.
    #[arg(long)]
    pub label: Option<String>,
}

pub fn run(cmd: PairingCommand) -> Result<()> {
    match cmd {
        PairingCommand::Add(args) => add(args),
        PairingCommand::List { json } => list(json),
        PairingCommand::Activate { id } => set_active(id, true),
        PairingCommand::Deactivate { id } => set_active(id, false),
        PairingCommand::ResetCursor { id } => {
            open_store()?
                .reset_cursor(PairingId(id))
                .with_context(|| format!("failed to reset cursor of pairing {id}"))?;
            println!("✓ Pairing {id} will rescan from the beginning on the next run");
            Ok(())
        }
    }
}

fn add(args: AddArgs) -> Result<()> {
    let store = open_store()?;

    // Two pairings feeding one workspace create duplicate Motion tasks for
    // anything both lists contain; allowed, but worth a warning.
    let sharing: Vec<Pairing> = store
        .list_pairings()?
        .into_iter()
        .filter(|p| p.motion_workspace_id == args.motion_workspace)
        .collect();
    for other in &sharing {
        eprintln!(
            "{} workspace {} is already paired with list {} (pairing {})",
            "warning:".yellow().bold(),
            other.motion_workspace_id,
            other.clickup_list_id,
            other.id
        );
    }

    let pairing = store
        .add_pairing(&args.clickup_list, &args.motion_workspace, args.label.as_deref())
        .context("failed to add pairing")?;
    println!(
        "✓ Added pairing {} ({})",
        pairing.id,
        pairing.display_name()
    );
    Ok(())
}

#[derive(Tabled)]
struct PairingRow {
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "clickup list")]
    clickup_list: String,
    #[tabled(rename = "motion workspace")]
    motion_workspace: String,
    #[tabled(rename = "active")]
    active: String,
    #[tabled(rename = "last sync")]
    last_sync: String,
}

#[derive(Serialize)]
struct PairingListJson<'a> {
    pairings: &'a [Pairing],
}

fn list(json: bool) -> Result<()> {
    let pairings = open_store()?.list_pairings()?;
    if json {
        let out = PairingListJson {
            pairings: &pairings,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if pairings.is_empty() {
        println!("No pairings configured.");
        println!("Run: tasklink pairing add <clickup-list> <motion-workspace>");
        return Ok(());
    }

    let rows: Vec<PairingRow> = pairings
        .into_iter()
        .map(|p| PairingRow {
            id: p.id.0,
            name: p.display_name(),
            active: if p.active {
                "yes".green().to_string()
            } else {
                "no".bright_black().to_string()
            },
            last_sync: format_time(p.last_sync_cursor),
            clickup_list: p.clickup_list_id,
            motion_workspace: p.motion_workspace_id,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn set_active(id: i64, active: bool) -> Result<()> {
    open_store()?
        .set_pairing_active(PairingId(id), active)
        .with_context(|| format!("failed to update pairing {id}"))?;
    let state = if active { "activated" } else { "deactivated" };
    println!("✓ Pairing {id} {state}");
    Ok(())
}
