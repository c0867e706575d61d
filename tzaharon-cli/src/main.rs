//! Tzaharon: daycare attendance board.
//!
//! # Usage
//!
//! ```text
//! tzaharon serve [--bind <addr>] [--store memory|file|redis|rest-kv] [--data-file <path>]
//! tzaharon board [--filter <status>] [--json]
//! tzaharon watch [--filter <status>]
//! tzaharon child add <first> <last>
//! tzaharon child status <child> <status>
//! tzaharon child note <child> [<note>]
//! tzaharon child remove <child> [--yes]
//! tzaharon status list|add|move|edit|absent|remove
//! tzaharon reset [--yes]
//! ```
//!
//! Everything except `serve` talks to a running server (`--server`,
//! `TZAHARON_SERVER`). Children and statuses are addressed by id, a unique id
//! prefix, or their exact name.

mod client;
mod commands;
mod lookup;
mod render;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    board::{BoardArgs, WatchArgs},
    child::ChildCommand,
    reset::ResetArgs,
    serve::ServeArgs,
    status::StatusCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tzaharon",
    version,
    about = "Track who is where at the daycare",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API over the configured store.
    Serve(ServeArgs),

    /// Print the board once.
    Board(BoardArgs),

    /// Keep the board on screen, refreshed on every poll.
    Watch(WatchArgs),

    /// Add, move, annotate, or remove children.
    Child {
        #[command(subcommand)]
        command: ChildCommand,
    },

    /// Edit the status list.
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },

    /// Move every child back to the first status.
    Reset(ResetArgs),
}

// ---------------------------------------------------------------------------
// Store backend argument, parsed from CLI strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendArg {
    Memory,
    #[default]
    File,
    Redis,
    RestKv,
}

impl FromStr for BackendArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "rest-kv" | "kv" => Ok(Self::RestKv),
            other => Err(format!(
                "unknown store '{other}'; expected: memory, file, redis, rest-kv"
            )),
        }
    }
}

impl fmt::Display for BackendArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Redis => "redis",
            Self::RestKv => "rest-kv",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Board(args) => args.run(),
        Commands::Watch(args) => args.run(),
        Commands::Child { command } => commands::child::run(command),
        Commands::Status { command } => commands::status::run(command),
        Commands::Reset(args) => args.run(),
    }
}
