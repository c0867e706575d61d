//! `tzaharon status list|add|move|edit|absent|remove`
//!
//! Every edit is made on a copy of the registry and saved as a whole, so
//! children in a removed status move to the first remaining one in the same
//! write.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;

use tzaharon_core::{Direction, StatusField, StatusRegistry, STATUS_COLORS};
use tzaharon_sync::Intent;

use crate::client::{Client, RemoteArgs};
use crate::{lookup, render};

#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// List statuses in board order.
    List(ListArgs),

    /// Append a new status.
    Add(AddArgs),

    /// Move a status one place up or down.
    Move(MoveArgs),

    /// Change a status label or color.
    Edit(EditArgs),

    /// Mark the status whose children are listed last.
    Absent(AbsentArgs),

    /// Delete a status. Its children move to the first status.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    pub label: String,

    /// Color class, e.g. bg-yellow-500. Defaults to gray.
    #[arg(long, short = 'c')]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MoveArg {
    Up,
    Down,
}

impl From<MoveArg> for Direction {
    fn from(arg: MoveArg) -> Self {
        match arg {
            MoveArg::Up => Direction::Up,
            MoveArg::Down => Direction::Down,
        }
    }
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Status id, id prefix, or label.
    pub status: String,

    #[arg(value_enum)]
    pub direction: MoveArg,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Status id, id prefix, or label.
    pub status: String,

    #[arg(long, short = 'l')]
    pub label: Option<String>,

    #[arg(long, short = 'c')]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct AbsentArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Status id, id prefix, or label.
    #[arg(required_unless_present = "clear")]
    pub status: Option<String>,

    /// Mark no status as absent.
    #[arg(long, conflicts_with = "status")]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Status id, id prefix, or label.
    pub status: String,
}

pub fn run(cmd: StatusCommand) -> Result<()> {
    match cmd {
        StatusCommand::List(args) => list(args),
        StatusCommand::Add(args) => add(args),
        StatusCommand::Move(args) => move_status(args),
        StatusCommand::Edit(args) => edit(args),
        StatusCommand::Absent(args) => absent(args),
        StatusCommand::Remove(args) => remove(args),
    }
}

fn list(args: ListArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let session = client.session();
    let statuses = session.state().statuses.as_slice();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(statuses).context("failed to serialize statuses")?
        );
    } else {
        render::print_statuses(statuses);
    }
    client.close()
}

fn add(args: AddArgs) -> Result<()> {
    if let Some(color) = args.color.as_deref() {
        warn_unknown_color(color);
    }
    let client = Client::connect(&args.remote)?;
    let mut registry = client.session().state().statuses.clone();
    let id = registry.create(&args.label, args.color.as_deref())?;
    save(&client, registry)?;
    println!("added status {} ({id})", args.label.trim().bold());
    client.close()
}

fn move_status(args: MoveArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let mut registry = client.session().state().statuses.clone();
    let status = lookup::status(&registry, &args.status)?.clone();
    if !registry.reorder(&status.id, args.direction.into())? {
        println!("{} is already at the edge; nothing moved", status.label.bold());
        return client.close();
    }
    save(&client, registry.clone())?;
    render::print_statuses(registry.as_slice());
    client.close()
}

fn edit(args: EditArgs) -> Result<()> {
    if args.label.is_none() && args.color.is_none() {
        bail!("nothing to change; pass --label and/or --color");
    }
    if let Some(color) = args.color.as_deref() {
        warn_unknown_color(color);
    }
    let client = Client::connect(&args.remote)?;
    let mut registry = client.session().state().statuses.clone();
    let id = lookup::status(&registry, &args.status)?.id.clone();
    if let Some(label) = args.label {
        registry.edit(&id, StatusField::Label, label)?;
    }
    if let Some(color) = args.color {
        registry.edit(&id, StatusField::Color, color)?;
    }
    save(&client, registry.clone())?;
    render::print_statuses(registry.as_slice());
    client.close()
}

fn absent(args: AbsentArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let mut registry = client.session().state().statuses.clone();
    match args.status {
        Some(query) if !args.clear => {
            let status = lookup::status(&registry, &query)?.clone();
            registry.mark_absent(&status.id)?;
            save(&client, registry)?;
            println!("children in {} are now listed last", status.label.bold());
        }
        _ => {
            registry.clear_absent();
            save(&client, registry)?;
            println!("no status is marked absent");
        }
    }
    client.close()
}

fn remove(args: RemoveArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let session = client.session();
    let mut registry = session.state().statuses.clone();
    let id = lookup::status(&registry, &args.status)?.id.clone();
    let removed = registry.remove(&id)?;
    let moved = session
        .state()
        .children
        .iter()
        .filter(|c| c.status_id == removed.id)
        .count();

    let target = registry.iter().next().map(|s| s.label.clone());
    save(&client, registry)?;
    println!("removed status {}", removed.label.bold());
    match target {
        Some(label) if moved > 0 => println!("{moved} children moved to {label}"),
        Some(_) => {}
        None => println!(
            "{}",
            "no statuses left; children cannot be added or reset until one is added".yellow()
        ),
    }
    client.close()
}

fn save(client: &Client, registry: StatusRegistry) -> Result<()> {
    client.apply(Intent::SaveSettings(registry))?;
    Ok(())
}

fn warn_unknown_color(color: &str) {
    if !STATUS_COLORS.contains(&color) && color != tzaharon_core::NEW_STATUS_COLOR {
        eprintln!(
            "{} '{color}' is not one of the palette colors: {}",
            "warning:".yellow().bold(),
            STATUS_COLORS.join(", ")
        );
    }
}
