//! `tzaharon board` and `tzaharon watch`.

use anyhow::{Context, Result};
use clap::Args;

use tzaharon_core::Filter;
use tzaharon_sync::Intent;

use crate::client::{Client, RemoteArgs};
use crate::{lookup, render};

#[derive(Args, Debug)]
pub struct BoardArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Only show children in this status.
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl BoardArgs {
    pub fn run(self) -> Result<()> {
        let client = Client::connect(&self.remote)?;
        apply_filter(&client, self.filter.as_deref())?;
        let session = client.session();
        if self.json {
            render::print_board_json(&session).context("failed to serialize board JSON")?;
        } else {
            render::print_board(&session);
        }
        client.close()
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Only show children in this status.
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        tzaharon_server::init_tracing();
        let client = Client::connect(&self.remote)?;
        apply_filter(&client, self.filter.as_deref())?;

        let mut updates = client.handle().subscribe();
        client.runtime().block_on(async {
            loop {
                let session = updates.borrow_and_update().clone();
                // Clear screen, cursor home.
                print!("\x1b[2J\x1b[H");
                render::print_board(&session);
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        });
        client.close()
    }
}

fn apply_filter(client: &Client, filter: Option<&str>) -> Result<()> {
    let Some(query) = filter else {
        return Ok(());
    };
    let session = client.session();
    let status = lookup::status(&session.state().statuses, query)?;
    client.apply(Intent::SetFilter(Filter::Status(status.id.clone())))?;
    Ok(())
}
