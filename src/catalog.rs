//! Host catalog: which hosts a run measures, in display order

use crate::{
    error::{AppError, ErrorContext, Result},
    models::{Config, HostRecord},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Display name, usually a region
    pub name: String,
    /// Hostname fragment probed for this entry
    pub host: String,
}

impl HostEntry {
    pub fn new<N: Into<String>, H: Into<String>>(name: N, host: H) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
        }
    }

    /// Parse a `NAME=HOST` pair
    pub fn parse_pair(pair: &str) -> Result<Self> {
        let (name, host) = pair
            .split_once('=')
            .ok_or_else(|| AppError::validation(format!("Host must be NAME=HOST, got: {}", pair)))?;

        let (name, host) = (name.trim(), host.trim());
        if name.is_empty() || host.is_empty() {
            return Err(AppError::validation(format!(
                "Host name and address cannot be empty: {}",
                pair
            )));
        }
        Ok(Self::new(name, host))
    }
}

/// Ordered, duplicate-free list of hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCatalog {
    entries: Vec<HostEntry>,
}

impl Default for HostCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HostCatalog {
    /// Build a catalog, rejecting empty lists and repeated hosts
    pub fn new(entries: Vec<HostEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(AppError::config("Host catalog is empty"));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.host.trim().is_empty() {
                return Err(AppError::config(format!("Host for '{}' is empty", entry.name)));
            }
            if !seen.insert(entry.host.as_str()) {
                return Err(AppError::config(format!("Duplicate host in catalog: {}", entry.host)));
            }
        }

        Ok(Self { entries })
    }

    /// Hosts shipped with the binary
    pub fn builtin() -> Self {
        Self {
            entries: vec![HostEntry::new(
                "gcp Qatar",
                "gcp-qatar.latency.dev.streaming.synamedia.com",
            )],
        }
    }

    /// Load a JSON array of `{"name": .., "host": ..}` objects
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read hosts file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid hosts file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: Vec<HostEntry> = serde_json::from_str(content)?;
        Self::new(entries)
    }

    /// Build from `NAME=HOST` pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let entries = pairs
            .iter()
            .map(|pair| HostEntry::parse_pair(pair.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Pick the catalog a configuration asks for.
    ///
    /// `--host` entries win over a hosts file, which wins over the built-in list.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.hosts.is_empty() {
            Self::from_pairs(&config.hosts)
        } else if let Some(path) = &config.hosts_file {
            Self::from_json_file(path)
        } else {
            Ok(Self::builtin())
        }
    }

    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh, unmeasured records in catalog order
    pub fn to_records(&self) -> Vec<HostRecord> {
        self.entries
            .iter()
            .map(|entry| HostRecord::new(entry.name.clone(), entry.host.clone()))
            .collect()
    }
}
