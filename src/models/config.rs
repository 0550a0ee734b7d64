//! Configuration data model and validation

use crate::types::{AppError, CheckMode, Result, Verbosity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Waves to run; every host is probed once per wave
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// Probe over HTTP instead of raw TCP
    #[serde(default)]
    pub use_http: bool,

    /// Probe over HTTPS; wins over `use_http`
    #[serde(default)]
    pub use_https: bool,

    /// Per-probe deadline in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Port dialed in TCP mode
    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,

    /// Path requested in HTTP mode
    #[serde(default = "default_url_path")]
    pub url_path: String,

    /// Length of the cache-busting token
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Optional domain appended to every host id
    #[serde(default)]
    pub domain_suffix: Option<String>,

    /// `User-Agent` sent with HTTP probes
    #[serde(default = "crate::defaults::user_agent")]
    pub user_agent: String,

    /// JSON catalog replacing the built-in host list
    #[serde(default)]
    pub hosts_file: Option<PathBuf>,

    /// `NAME=HOST` entries replacing the catalog
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Result rendering
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeats: default_repeats(),
            use_http: false,
            use_https: false,
            timeout_seconds: default_timeout_secs(),
            tcp_port: default_tcp_port(),
            url_path: default_url_path(),
            token_length: default_token_length(),
            domain_suffix: None,
            user_agent: crate::defaults::user_agent(),
            hosts_file: None,
            hosts: Vec::new(),
            verbosity: Verbosity::default(),
            enable_color: default_enable_color(),
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested probe mode, before TLS negotiation
    pub fn check_mode(&self) -> CheckMode {
        CheckMode::from_flags(self.use_http, self.use_https)
    }

    /// Per-probe deadline, `None` when disabled
    pub fn probe_timeout(&self) -> Option<Duration> {
        if self.timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_seconds))
        }
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.repeats == 0 {
            return Err(AppError::config("Repeats must be greater than 0"));
        }

        if self.repeats > crate::defaults::MAX_REPEATS {
            return Err(AppError::config(format!(
                "Repeats cannot exceed {}",
                crate::defaults::MAX_REPEATS
            )));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.tcp_port == 0 {
            return Err(AppError::config("TCP port must be greater than 0"));
        }

        if !self.url_path.starts_with('/') {
            return Err(AppError::config(format!(
                "URL path must start with '/': {}",
                self.url_path
            )));
        }

        if self.token_length == 0 || self.token_length > 64 {
            return Err(AppError::config(format!(
                "Token length must be between 1 and 64, got: {}",
                self.token_length
            )));
        }

        if let Some(suffix) = &self.domain_suffix {
            if suffix.trim().is_empty() {
                return Err(AppError::config("Domain suffix cannot be empty"));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("User agent cannot be empty"));
        }

        Ok(())
    }

    /// Merge `WEBPING_*` environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge values from any key lookup using the environment variable names
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(repeats) = lookup("WEBPING_REPEATS") {
            self.repeats = repeats.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WEBPING_REPEATS value '{}': {}", repeats, e)))?;
        }

        if let Some(timeout) = lookup("WEBPING_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WEBPING_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Some(port) = lookup("WEBPING_TCP_PORT") {
            self.tcp_port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WEBPING_TCP_PORT value '{}': {}", port, e)))?;
        }

        if let Some(path) = lookup("WEBPING_URL_PATH") {
            self.url_path = path.trim().to_string();
        }

        if let Some(length) = lookup("WEBPING_TOKEN_LENGTH") {
            self.token_length = length.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WEBPING_TOKEN_LENGTH value '{}': {}", length, e)))?;
        }

        if let Some(suffix) = lookup("WEBPING_DOMAIN_SUFFIX") {
            let suffix = suffix.trim().trim_start_matches('.').to_string();
            self.domain_suffix = if suffix.is_empty() { None } else { Some(suffix) };
        }

        if let Some(user_agent) = lookup("WEBPING_USER_AGENT") {
            self.user_agent = user_agent;
        }

        if let Some(path) = lookup("WEBPING_HOSTS_FILE") {
            self.hosts_file = Some(PathBuf::from(path.trim()));
        }

        if let Some(enable_color) = lookup("WEBPING_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WEBPING_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_repeats() -> u32 {
    crate::defaults::DEFAULT_REPEATS
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_tcp_port() -> u16 {
    crate::defaults::DEFAULT_TCP_PORT
}

fn default_url_path() -> String {
    crate::defaults::DEFAULT_URL_PATH.to_string()
}

fn default_token_length() -> usize {
    crate::defaults::DEFAULT_TOKEN_LENGTH
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
