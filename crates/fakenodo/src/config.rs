//! Command-line and environment configuration

use clap::Parser;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port, the one PixelHub's `FAKENODO_URL` points at.
pub const DEFAULT_PORT: u16 = 5001;

/// In-memory Zenodo deposition emulator
#[derive(Parser, Debug, Clone)]
#[command(name = "fakenodo", version, about, long_about = None)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "FAKENODO_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "FAKENODO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Start with a sample draft and a sample published deposition
    #[arg(long, env = "FAKENODO_SEED")]
    pub seed: bool,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "FAKENODO_SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Debug-level console logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
