//! `tzaharon reset`: every child back to the first status.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use tzaharon_sync::Intent;

use crate::client::{Client, RemoteArgs};

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Confirm the reset. Without it nothing changes.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl ResetArgs {
    pub fn run(self) -> Result<()> {
        let client = Client::connect(&self.remote)?;
        let session = client.session();
        let Some(first) = session.state().statuses.iter().next().cloned() else {
            bail!("no statuses defined; nothing to reset to");
        };
        let count = session.state().children.len();

        client.apply(Intent::RequestReset)?;
        if !self.yes {
            client.apply(Intent::Cancel)?;
            println!(
                "would move {count} children to {}; pass --yes to confirm. Nothing was changed.",
                first.label.bold()
            );
            return client.close();
        }

        client.apply(Intent::Confirm)?;
        println!("moved {count} children to {}", first.label.bold());
        client.close()
    }
}
