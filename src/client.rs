//! Probers: one timed network operation against a resolved target

pub mod http;
pub mod tcp;

pub use http::HttpProber;
pub use tcp::TcpProber;

use crate::{
    error::Result,
    target::Target,
    types::CheckMode,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Performs a single timed operation against a target
#[async_trait]
pub trait Prober: Send + Sync {
    /// Run one probe and return how long it took.
    ///
    /// Only the network operation is timed, never the setup around it.
    async fn probe(&self, target: &Target) -> Result<Duration>;

    /// Mode this prober measures
    fn mode(&self) -> CheckMode;
}

/// How the client identifies itself to probed hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub user_agent: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            user_agent: crate::defaults::user_agent(),
        }
    }
}

impl ClientIdentity {
    pub fn new<S: Into<String>>(user_agent: S) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

/// Whether this build can open HTTPS connections
pub fn tls_supported() -> bool {
    cfg!(feature = "rustls-tls")
}

/// Builds the prober for a check mode
pub struct ProberFactory;

impl ProberFactory {
    /// Create the prober for `mode`.
    ///
    /// `timeout` is also handed to the HTTP client so a stalled body read is
    /// bounded; `None` leaves it unbounded.
    pub fn for_mode(
        mode: CheckMode,
        identity: &ClientIdentity,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn Prober>> {
        match mode {
            CheckMode::Tcp => Ok(Arc::new(TcpProber::new())),
            CheckMode::Http | CheckMode::Https => {
                Ok(Arc::new(HttpProber::new(mode, identity, timeout)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_prober() {
        let identity = ClientIdentity::default();
        let tcp = ProberFactory::for_mode(CheckMode::Tcp, &identity, None).unwrap();
        assert_eq!(tcp.mode(), CheckMode::Tcp);

        let http = ProberFactory::for_mode(CheckMode::Http, &identity, None).unwrap();
        assert_eq!(http.mode(), CheckMode::Http);

        let https = ProberFactory::for_mode(
            CheckMode::Https,
            &identity,
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(https.mode(), CheckMode::Https);
    }

    #[test]
    fn test_default_identity() {
        let identity = ClientIdentity::default();
        assert!(identity.user_agent.starts_with("webping/"));
        assert_eq!(ClientIdentity::new("probe/2").user_agent, "probe/2");
    }
}
