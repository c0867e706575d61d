use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tzaharon_store::StoreConfig;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND,
            store: StoreConfig::default(),
        }
    }
}
