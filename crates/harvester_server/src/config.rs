use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use harvester_engine::{EngineSettings, EvictionPolicy, FetchSettings};
use log::LevelFilter;

use crate::logging::LogDestination;

/// Command line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "harvester_server")]
#[command(about = "Fetch batches of URLs and collect the email addresses they contain")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "HARVESTER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Pause between consecutive URLs of one job, in milliseconds.
    #[arg(long, env = "HARVESTER_PACING_MS", default_value_t = 1000)]
    pub pacing_ms: u64,

    /// How long a completed job stays queryable, in seconds.
    #[arg(long, env = "HARVESTER_EVICTION_GRACE_SECS", default_value_t = 300)]
    pub eviction_grace_secs: u64,

    /// Restart the eviction countdown on every status read of a completed job.
    #[arg(long, env = "HARVESTER_EVICT_ON_READ")]
    pub evict_on_read: bool,

    /// Connect timeout in seconds. Unset means no timeout.
    #[arg(long, env = "HARVESTER_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[arg(long, env = "HARVESTER_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Redirects followed per URL. Unset keeps the client default.
    #[arg(long, env = "HARVESTER_REDIRECT_LIMIT")]
    pub redirect_limit: Option<usize>,

    /// Largest response body to read, in bytes. Unset means unlimited.
    #[arg(long, env = "HARVESTER_MAX_BYTES")]
    pub max_bytes: Option<u64>,

    #[arg(long, value_enum, env = "HARVESTER_LOG", default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    #[arg(long, env = "HARVESTER_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fetch: FetchSettings {
                connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
                redirect_limit: self.redirect_limit,
                max_bytes: self.max_bytes,
                user_agent: Some(concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string()),
            },
            pacing: Duration::from_millis(self.pacing_ms),
            eviction_grace: Duration::from_secs(self.eviction_grace_secs),
            eviction: if self.evict_on_read {
                EvictionPolicy::ExtendOnRead
            } else {
                EvictionPolicy::FromCompletion
            },
        }
    }
}
