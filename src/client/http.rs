//! HTTP request timing

use super::{ClientIdentity, Prober};
use crate::{
    error::{AppError, Result},
    target::Target,
    types::CheckMode,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Times a full GET, including reading the response body.
///
/// Any completed response counts as a sample; the status code is not checked.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    mode: CheckMode,
}

impl HttpProber {
    pub fn new(mode: CheckMode, identity: &ClientIdentity, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(identity.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, mode })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> Result<Duration> {
        let url = match target {
            Target::Http { url } => url.clone(),
            Target::Tcp { authority, .. } => {
                return Err(AppError::internal(format!(
                    "HTTP prober given a TCP target: {}",
                    authority
                )))
            }
        };

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        response.bytes().await?;
        Ok(start.elapsed())
    }

    fn mode(&self) -> CheckMode {
        self.mode
    }
}
