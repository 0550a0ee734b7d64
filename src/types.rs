//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Network technique used for a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckMode {
    /// Time a raw TCP connect to port 80 (or the configured port)
    #[default]
    Tcp,
    /// Time an HTTP GET
    Http,
    /// Time an HTTPS GET
    Https,
}

impl CheckMode {
    /// Select the mode from the two independent transport flags.
    ///
    /// HTTPS wins when both flags are set; TCP is the fallback.
    pub fn from_flags(use_http: bool, use_https: bool) -> Self {
        match (use_http, use_https) {
            (_, true) => Self::Https,
            (true, false) => Self::Http,
            (false, false) => Self::Tcp,
        }
    }

    /// Downgrade HTTPS to HTTP when the network layer has no TLS support
    pub fn negotiate(self, tls_available: bool) -> Self {
        match self {
            Self::Https if !tls_available => Self::Http,
            mode => mode,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http | Self::Https)
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http | Self::Tcp => "http",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result rendering levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Verbosity {
    /// Host and region name only, no measurement
    Regions,
    /// Name and latency
    #[default]
    Summary,
    /// Index, host, name and latency
    Detailed,
    /// One column per attempt plus the average
    Breakdown,
}

impl Verbosity {
    /// Map the numeric `--verbose` level onto a rendering
    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Self::Summary),
            1 => Ok(Self::Detailed),
            2 => Ok(Self::Breakdown),
            other => Err(AppError::validation(format!(
                "Verbosity level must be 0, 1 or 2, got: {}",
                other
            ))),
        }
    }
}
