//! `tzaharon child add|status|note|remove`

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use tzaharon_sync::Intent;

use crate::client::{Client, RemoteArgs};
use crate::lookup;

#[derive(Subcommand, Debug)]
pub enum ChildCommand {
    /// Add a child in the first status.
    Add(AddArgs),

    /// Move a child to another status.
    Status(StatusArgs),

    /// Set or clear a child's note.
    Note(NoteArgs),

    /// Remove a child from the roster.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    pub first_name: String,

    pub last_name: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Child id, id prefix, or full name.
    pub child: String,

    /// Status id, id prefix, or label.
    pub status: String,
}

#[derive(Args, Debug)]
pub struct NoteArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Child id, id prefix, or full name.
    pub child: String,

    /// New note. Omit, or pass an empty string, to clear it.
    pub note: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Child id, id prefix, or full name.
    pub child: String,

    /// Confirm the removal. Without it nothing is removed.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ChildCommand) -> Result<()> {
    match cmd {
        ChildCommand::Add(args) => add(args),
        ChildCommand::Status(args) => status(args),
        ChildCommand::Note(args) => note(args),
        ChildCommand::Remove(args) => remove(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let before = client.session();
    let Some(first_status) = before.state().statuses.iter().next().cloned() else {
        bail!("no statuses defined; add one with `tzaharon status add <label>` first");
    };

    let after = client.apply(Intent::AddChild {
        first_name: args.first_name,
        last_name: args.last_name,
    })?;
    if let Some(added) = after
        .state()
        .children
        .iter()
        .find(|c| before.state().child(&c.id).is_none())
    {
        println!(
            "added {} ({}) as {}",
            added.full_name().bold(),
            added.id,
            first_status.label
        );
    }
    client.close()
}

fn status(args: StatusArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let session = client.session();
    let child = lookup::child(session.state(), &args.child)?;
    let status = lookup::status(&session.state().statuses, &args.status)?;

    client.apply(Intent::ChangeStatus {
        child: child.id.clone(),
        status: status.id.clone(),
    })?;
    println!("{} -> {}", child.full_name().bold(), status.label);
    client.close()
}

fn note(args: NoteArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let session = client.session();
    let child = lookup::child(session.state(), &args.child)?;
    let note = args.note.unwrap_or_default();

    client.apply(Intent::EditNote {
        child: child.id.clone(),
        note: note.clone(),
    })?;
    if note.trim().is_empty() {
        println!("cleared note for {}", child.full_name().bold());
    } else {
        println!("note for {}: {note}", child.full_name().bold());
    }
    client.close()
}

fn remove(args: RemoveArgs) -> Result<()> {
    let client = Client::connect(&args.remote)?;
    let session = client.session();
    let child = lookup::child(session.state(), &args.child)?;

    client.apply(Intent::RequestDelete(child.id.clone()))?;
    if !args.yes {
        client.apply(Intent::Cancel)?;
        println!(
            "would remove {}; pass --yes to confirm. Nothing was changed.",
            child.full_name().bold()
        );
        return client.close();
    }

    client.apply(Intent::Confirm)?;
    println!("removed {}", child.full_name().bold());
    client.close()
}
