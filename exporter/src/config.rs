//! Exporter configuration.
//!
//! This only configures the HTTP listen address; everything about the
//! chain, feeds, and tracked validators comes from
//! `watcher::WatcherConfig::from_env()`.

use std::net::SocketAddr;

/// Configuration for the exporter HTTP server.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
}

impl ExporterConfig {
    /// Reads `LISTEN_ADDR` from the environment, falling back to the
    /// default when unset or unparseable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var("LISTEN_ADDR") {
            match raw.parse() {
                Ok(addr) => cfg.listen_addr = addr,
                Err(e) => {
                    tracing::warn!(raw = %raw, error = %e, "ignoring unparseable LISTEN_ADDR");
                }
            }
        }
        cfg
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        // Bind to all interfaces so a container port mapping is reachable
        // from the host.
        let addr: SocketAddr = "0.0.0.0:8080"
            .parse()
            .expect("hard-coded listen address should parse");
        Self { listen_addr: addr }
    }
}
