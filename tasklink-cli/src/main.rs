//! tasklink — one-way ClickUp -> Motion task mirroring with completion
//! written back.
//!
//! # Usage
//!
//! ```text
//! tasklink run [--json] [--strict]
//! tasklink daemon
//! tasklink pairing add <clickup-list> <motion-workspace> [--label <label>]
//! tasklink pairing list [--json]
//! tasklink pairing activate|deactivate|reset-cursor <id>
//! tasklink crosswalk add <clickup-user> <motion-user> [--label <label>]
//! tasklink crosswalk list
//! tasklink crosswalk remove <clickup-user>
//! tasklink link list [--json]
//! tasklink link delete (--clickup <id> | --motion <id>)
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    crosswalk::CrosswalkCommand, link::LinkCommand, pairing::PairingCommand, run::RunArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tasklink",
    version,
    about = "Mirror ClickUp tasks into Motion and write completion back",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one sync pass over every active pairing.
    Run(RunArgs),

    /// Run sync passes on the configured interval until ctrl-c.
    Daemon,

    /// Manage ClickUp list <-> Motion workspace pairings.
    Pairing {
        #[command(subcommand)]
        command: PairingCommand,
    },

    /// Manage the ClickUp -> Motion user crosswalk.
    Crosswalk {
        #[command(subcommand)]
        command: CrosswalkCommand,
    },

    /// Inspect or remove task links.
    Link {
        #[command(subcommand)]
        command: LinkCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Daemon => commands::run::daemon(),
        Commands::Pairing { command } => commands::pairing::run(command),
        Commands::Crosswalk { command } => commands::crosswalk::run(command),
        Commands::Link { command } => commands::link::run(command),
    }
}
