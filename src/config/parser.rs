//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Builds the configuration in layers: defaults, `.env`, `WEBPING_*`
/// variables, then command-line flags
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file()?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Same layering with an explicit variable source instead of the process environment
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(repeats) = self.cli.repeats {
            config.repeats = repeats;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if !self.cli.hosts.is_empty() {
            config.hosts = self.cli.hosts.clone();
        }

        if let Some(path) = &self.cli.hosts_file {
            config.hosts_file = Some(path.clone());
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only settings
        config.use_http = self.cli.http;
        config.use_https = self.cli.https;
        config.verbosity = self.cli.verbosity()?;
        config.debug = self.cli.debug;

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// One-line-per-setting summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Mode: {}", config.check_mode()));
    summary.push(format!("Repeats: {}", config.repeats));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("TCP port: {}", config.tcp_port));
    summary.push(format!("URL path: {}", config.url_path));
    if let Some(suffix) = &config.domain_suffix {
        summary.push(format!("Domain suffix: {}", suffix));
    }
    summary.push(format!("User agent: {}", config.user_agent));
    summary.push(format!("Verbosity: {:?}", config.verbosity));
    summary.push(format!("Color output: {}", config.enable_color));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::types::{CheckMode, Verbosity};
    use clap::Parser;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut argv = vec!["webping"];
        argv.extend_from_slice(args);
        ConfigParser::new(Cli::parse_from(argv)).parse_with_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[], &[]).unwrap();
        assert_eq!(config.repeats, crate::defaults::DEFAULT_REPEATS);
        assert_eq!(config.check_mode(), CheckMode::Tcp);
        assert_eq!(config.verbosity, Verbosity::Summary);
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = parse(
            &["--repeats", "12", "--timeout", "5"],
            &[("WEBPING_REPEATS", "8"), ("WEBPING_TIMEOUT_SECONDS", "30")],
        )
        .unwrap();
        assert_eq!(config.repeats, 12);
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_env_used_without_cli_value() {
        let config = parse(&[], &[("WEBPING_REPEATS", "8"), ("WEBPING_TCP_PORT", "8080")]).unwrap();
        assert_eq!(config.repeats, 8);
        assert_eq!(config.tcp_port, 8080);
    }

    #[test]
    fn test_transport_flags() {
        let config = parse(&["--http", "--https"], &[]).unwrap();
        assert_eq!(config.check_mode(), CheckMode::Https);

        let config = parse(&["--http"], &[]).unwrap();
        assert_eq!(config.check_mode(), CheckMode::Http);
    }

    #[test]
    fn test_hosts_and_verbosity() {
        let config = parse(&["--host", "A=a", "--verbose", "1", "--no-color"], &[]).unwrap();
        assert_eq!(config.hosts, vec!["A=a".to_string()]);
        assert_eq!(config.verbosity, Verbosity::Detailed);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_invalid_final_config_rejected() {
        let result = parse(&["--repeats", "0"], &[]);
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = parse(&[], &[("WEBPING_REPEATS", "lots")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());
        assert!(summary.contains("Mode: tcp"));
        assert!(summary.contains("Repeats: 1"));
        assert!(summary.contains("Timeout: 10s"));
    }
}
