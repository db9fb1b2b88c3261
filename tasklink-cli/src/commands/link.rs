//! `tasklink link ...` — inspect and remove ClickUp <-> Motion task links.
//!
//! Deleting a link makes the ClickUp task eligible for creation again on its
//! next change; the old Motion task is left alone.

use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tasklink_core::{Link, LinkStore};

use super::{format_time, open_store};

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// List all links.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete one link by either side's task id.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("side").required(true).args(["clickup", "motion"])))]
pub struct DeleteArgs {
    /// ClickUp task id.
    #[arg(long)]
    pub clickup: Option<String>,

    /// Motion task id.
    #[arg(long)]
    pub motion: Option<String>,
}

pub fn run(cmd: LinkCommand) -> Result<()> {
    match cmd {
        LinkCommand::List { json } => list(json),
        LinkCommand::Delete(args) => delete(args),
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "clickup task")]
    clickup_task: String,
    #[tabled(rename = "motion task")]
    motion_task: String,
    #[tabled(rename = "linked at")]
    linked_at: String,
}

#[derive(Serialize)]
struct LinkListJson<'a> {
    links: &'a [Link],
}

fn list(json: bool) -> Result<()> {
    let links = open_store()?.list_links()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&LinkListJson { links: &links })?);
        return Ok(());
    }
    if links.is_empty() {
        println!("No links recorded.");
        return Ok(());
    }
    let rows: Vec<LinkRow> = links
        .into_iter()
        .map(|l| LinkRow {
            linked_at: format_time(Some(l.created_at)),
            clickup_task: l.clickup_task_id,
            motion_task: l.motion_task_id,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn delete(args: DeleteArgs) -> Result<()> {
    let store = open_store()?;
    let (side, id, removed) = match (&args.clickup, &args.motion) {
        (Some(id), _) => ("ClickUp", id, store.delete_by_clickup(id)?),
        (None, Some(id)) => ("Motion", id, store.delete_by_motion(id)?),
        (None, None) => anyhow::bail!("provide --clickup <id> or --motion <id>"),
    };
    if removed {
        println!("✓ Removed link for {side} task {id}");
    } else {
        println!("No link for {side} task {id}");
    }
    Ok(())
}
