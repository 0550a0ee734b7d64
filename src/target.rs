//! Target construction: cache-busted URLs for HTTP probes and resolved
//! socket addresses for TCP probes.

use crate::{
    dns::HostResolver,
    error::{AppError, Result},
    models::Config,
    types::CheckMode,
};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, RngCore, SeedableRng};
use std::{fmt, net::SocketAddr, sync::Arc};
use url::Url;

/// Resolved, mode-specific addressing for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Address dialed by TCP probes, with the `host:port` it came from
    Tcp { authority: String, addr: SocketAddr },
    /// URL fetched by HTTP probes
    Http { url: Url },
}

impl Target {
    /// `host:port` for TCP targets, the URL authority for HTTP targets
    pub fn authority(&self) -> String {
        match self {
            Target::Tcp { authority, .. } => authority.clone(),
            Target::Http { url } => match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{}:{}", host, port),
                (Some(host), None) => host.to_string(),
                _ => String::new(),
            },
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Target::Http { url } => Some(url),
            Target::Tcp { .. } => None,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Target::Tcp { addr, .. } => Some(*addr),
            Target::Http { .. } => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Tcp { authority, .. } => f.write_str(authority),
            Target::Http { url } => f.write_str(url.as_str()),
        }
    }
}

/// How host ids become hostnames, URLs and `host:port` strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTemplate {
    pub domain_suffix: Option<String>,
    pub path: String,
    pub token_param: String,
    pub port: u16,
}

impl Default for TargetTemplate {
    fn default() -> Self {
        Self {
            domain_suffix: None,
            path: crate::defaults::DEFAULT_URL_PATH.to_string(),
            token_param: crate::defaults::DEFAULT_TOKEN_PARAM.to_string(),
            port: crate::defaults::DEFAULT_TCP_PORT,
        }
    }
}

impl TargetTemplate {
    pub fn from_config(config: &Config) -> Self {
        Self {
            domain_suffix: config.domain_suffix.clone(),
            path: config.url_path.clone(),
            token_param: crate::defaults::DEFAULT_TOKEN_PARAM.to_string(),
            port: config.tcp_port,
        }
    }

    /// Full hostname for a host id
    pub fn hostname(&self, host_id: &str) -> String {
        match &self.domain_suffix {
            Some(suffix) => format!("{}.{}", host_id, suffix),
            None => host_id.to_string(),
        }
    }

    /// `host:port` dialed in TCP mode
    pub fn authority(&self, host_id: &str) -> String {
        format!("{}:{}", self.hostname(host_id), self.port)
    }

    /// Probe URL carrying `token` as the cache-busting query parameter
    pub fn url(&self, host_id: &str, mode: CheckMode, token: &str) -> Result<Url> {
        let base = format!("{}://{}{}", mode.scheme(), self.hostname(host_id), self.path);
        let mut url = Url::parse(&base)
            .map_err(|e| AppError::resolution(format!("invalid URL '{}': {}", base, e)))?;
        url.query_pairs_mut().append_pair(&self.token_param, token);
        Ok(url)
    }
}

/// Random alphanumeric tokens from an injected random source
pub struct TokenGenerator {
    rng: Box<dyn RngCore + Send>,
    length: usize,
}

impl TokenGenerator {
    /// Use the given random source
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R, length: usize) -> Self {
        Self {
            rng: Box::new(rng),
            length,
        }
    }

    /// Seed from operating system entropy
    pub fn from_entropy(length: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), length)
    }

    /// Deterministic tokens for a given seed
    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), length)
    }

    pub fn next_token(&mut self) -> String {
        (0..self.length)
            .map(|_| char::from(self.rng.sample(Alphanumeric)))
            .collect()
    }
}

impl fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Builds the target for each host before measurement starts
pub struct TargetResolver {
    template: TargetTemplate,
    dns: Arc<dyn HostResolver>,
    tokens: TokenGenerator,
}

impl TargetResolver {
    pub fn new(template: TargetTemplate, dns: Arc<dyn HostResolver>, tokens: TokenGenerator) -> Self {
        Self { template, dns, tokens }
    }

    pub fn template(&self) -> &TargetTemplate {
        &self.template
    }

    /// Shared DNS resolver, used to retry TCP hosts whose lookup failed
    pub fn dns(&self) -> Arc<dyn HostResolver> {
        Arc::clone(&self.dns)
    }

    /// Build the target for `host_id` in `mode`.
    ///
    /// HTTP targets get a fresh token; TCP targets are looked up in DNS.
    pub async fn resolve(&mut self, host_id: &str, mode: CheckMode) -> Result<Target> {
        match mode {
            CheckMode::Tcp => resolve_tcp(self.dns.as_ref(), &self.template, host_id).await,
            CheckMode::Http | CheckMode::Https => {
                let token = self.tokens.next_token();
                let url = self.template.url(host_id, mode, &token)?;
                Ok(Target::Http { url })
            }
        }
    }
}

/// Look up the TCP target for `host_id`
pub async fn resolve_tcp(
    dns: &dyn HostResolver,
    template: &TargetTemplate,
    host_id: &str,
) -> Result<Target> {
    let hostname = template.hostname(host_id);
    let addr = dns.resolve_socket(&hostname, template.port).await?;
    Ok(Target::Tcp {
        authority: template.authority(host_id),
        addr,
    })
}
