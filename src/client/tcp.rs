//! TCP connect timing

use super::Prober;
use crate::{
    error::{AppError, Result},
    target::Target,
    types::CheckMode,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Times the TCP handshake to the target address
#[derive(Debug, Clone, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: &Target) -> Result<Duration> {
        let (authority, addr) = match target {
            Target::Tcp { authority, addr } => (authority, *addr),
            Target::Http { url } => {
                return Err(AppError::internal(format!(
                    "TCP prober given an HTTP target: {}",
                    url
                )))
            }
        };

        let start = Instant::now();
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| AppError::connect(format!("{} ({}): {}", authority, addr, e)))?;
        let elapsed = start.elapsed();

        // Closed immediately, nothing is sent
        drop(stream);
        Ok(elapsed)
    }

    fn mode(&self) -> CheckMode {
        CheckMode::Tcp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let target = Target::Tcp {
            authority: format!("localhost:{}", addr.port()),
            addr,
        };
        let elapsed = TcpProber::new().probe(&target).await.unwrap();
        assert!(elapsed < Duration::from_secs(5));
        accept.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        // Bind then drop to get a port with nothing listening
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let target = Target::Tcp {
            authority: "closed:0".to_string(),
            addr,
        };

        let result = TcpProber::new().probe(&target).await;
        assert!(matches!(result, Err(AppError::Connect(_))));
    }

    #[tokio::test]
    async fn test_http_target_is_rejected() {
        let target = Target::Http {
            url: "http://example.com/ping".parse().unwrap(),
        };
        let result = TcpProber::new().probe(&target).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
