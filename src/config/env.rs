//! Environment variable handling and .env file loading

use crate::error::{AppError, Result};
use crate::models::Config;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists.
    ///
    /// Returns whether a file was loaded. Variables already set in the
    /// process environment are not overridden.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Check one variable the way the configuration loader would read it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let mut config = Config::default();
        config.merge_from_lookup(|k| (k == key).then(|| value.to_string()))?;
        config.validate()
    }

    /// Supported variables with a description and an example value
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("WEBPING_REPEATS", "Number of measurement waves (1-100)", "3"),
            ("WEBPING_TIMEOUT_SECONDS", "Per-probe timeout in seconds (0-300, 0 disables)", "10"),
            ("WEBPING_TCP_PORT", "Port dialed in TCP mode", "80"),
            ("WEBPING_URL_PATH", "Path requested in HTTP mode", "/ping"),
            ("WEBPING_TOKEN_LENGTH", "Length of the cache-busting token (1-64)", "13"),
            ("WEBPING_DOMAIN_SUFFIX", "Domain appended to every host", "example.net"),
            ("WEBPING_USER_AGENT", "User-Agent sent with HTTP probes", "webping/2.0.0"),
            ("WEBPING_HOSTS_FILE", "JSON host catalog", "hosts.json"),
            ("WEBPING_ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Validate every supported variable currently set, collecting warnings
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value)
                    .err()
                    .map(|e| format!("{}: {}", name, e))
            })
            .collect()
    }
}
