//! webping
//!
//! Measures network latency to a catalog of hosts using either raw TCP
//! connect timing or HTTP request timing, repeats each measurement in
//! synchronized waves, and ranks the hosts by average latency.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod target;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, HostRecord};
pub use types::{CheckMode, Verbosity};
pub use catalog::{HostCatalog, HostEntry};
pub use client::{Prober, ProberFactory, ClientIdentity};
pub use executor::{MeasurementEngine, RunReport};
pub use stats::{average_ms, rank, RunSummary};
pub use target::{Target, TargetResolver, TargetTemplate, TokenGenerator};
pub use logging::{Logger, ProbeLogger};
pub use output::LatencyOutput;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Build metadata stamped by `build.rs`
pub const BUILD_TIME: &str = env!("WEBPING_BUILD_TIME");
pub const GIT_COMMIT: &str = env!("WEBPING_GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("WEBPING_TARGET");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_REPEATS: u32 = 1;
    pub const MAX_REPEATS: u32 = 100;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_TCP_PORT: u16 = 80;
    pub const DEFAULT_URL_PATH: &str = "/ping";
    pub const DEFAULT_TOKEN_PARAM: &str = "x";
    pub const DEFAULT_TOKEN_LENGTH: usize = 13;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Client identifier sent as the `User-Agent` header on HTTP probes
    pub fn user_agent() -> String {
        format!("webping/{} (+{})", super::VERSION, super::PKG_REPOSITORY)
    }
}
