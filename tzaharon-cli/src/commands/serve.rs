//! `tzaharon serve`: run the HTTP API in the foreground.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use tzaharon_server::{start_blocking, ServerConfig, DEFAULT_BIND};
use tzaharon_store::{Backend, StoreConfig, DEFAULT_DATA_KEY};

use crate::BackendArg;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "TZAHARON_BIND", default_value_t = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Backing store: memory | file | redis | rest-kv.
    #[arg(long, env = "TZAHARON_STORE", default_value_t = BackendArg::File)]
    pub store: BackendArg,

    /// JSON file for the file store. Defaults to the platform data directory.
    #[arg(long, env = "TZAHARON_DATA_FILE", value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Redis connection URL for the redis store.
    #[arg(long, env = "TZAHARON_REDIS_URL", value_name = "URL")]
    pub redis_url: Option<String>,

    /// REST endpoint of the hosted KV store.
    #[arg(long, env = "KV_REST_API_URL", value_name = "URL")]
    pub kv_url: Option<String>,

    /// Bearer token for the hosted KV store.
    #[arg(long, env = "KV_REST_API_TOKEN", hide_env_values = true)]
    pub kv_token: Option<String>,

    /// Key the board is stored under.
    #[arg(long, env = "TZAHARON_DATA_KEY", default_value = DEFAULT_DATA_KEY)]
    pub key: String,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let config = self.server_config()?;
        start_blocking(config).context("server exited with error")
    }

    fn server_config(self) -> Result<ServerConfig> {
        let backend = match self.store {
            BackendArg::Memory => Backend::Memory,
            BackendArg::File => Backend::File {
                path: self.data_file,
            },
            BackendArg::Redis => {
                let Some(url) = self.redis_url else {
                    bail!("--redis-url (or TZAHARON_REDIS_URL) is required for the redis store");
                };
                Backend::Redis { url }
            }
            BackendArg::RestKv => Backend::RestKv {
                url: self.kv_url,
                token: self.kv_token,
            },
        };
        Ok(ServerConfig {
            bind: self.bind,
            store: StoreConfig::new(backend).with_key(self.key),
        })
    }
}
