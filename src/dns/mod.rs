//! Hostname resolution for TCP targets

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
};
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf,
    TokioAsyncResolver,
};

/// Resolves a hostname to its IP addresses
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Look up every address for `host`
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>>;

    /// Resolve `host` and `port` to one socket address, preferring IPv4
    async fn resolve_socket(&self, host: &str, port: u16) -> Result<SocketAddr> {
        // IP literals never touch DNS
        let trimmed = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, port));
        }

        let ips = self.lookup(host).await?;
        let ip = ips
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| ips.first())
            .copied()
            .ok_or_else(|| AppError::resolution(format!("no addresses for {}:{}", host, port)))?;

        Ok(SocketAddr::new(ip, port))
    }
}

/// Resolver backed by the operating system's DNS configuration
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    /// Build from the system configuration, falling back to the library default
    pub fn new() -> Self {
        let (config, opts) = system_conf::read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let response = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| AppError::resolution(format!("DNS lookup failed for {}: {}", host, e)))?;

        Ok(response.iter().collect())
    }
}

/// Fixed hostname table, used for pinned addresses and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `host` to `ip`, appending to any existing addresses
    pub fn with_entry<H: Into<String>>(mut self, host: H, ip: IpAddr) -> Self {
        self.entries.entry(host.into()).or_default().push(ip);
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.entries
            .get(host)
            .cloned()
            .ok_or_else(|| AppError::resolution(format!("DNS lookup failed for {}: no record", host)))
    }
}
