//! Data models and structures for webping

pub mod config;
pub mod host;

// Re-export main model types
pub use config::Config;
pub use host::HostRecord;
