use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::UpstreamError;
use crate::models::UpstreamTarget;

/// Largest upstream body accepted before decoding.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Performs one upstream call and returns the decoded JSON body.
///
/// Implementations are shared across all inbound requests and must be
/// stateless per call.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        target: &UpstreamTarget,
    ) -> impl Future<Output = Result<serde_json::Value, UpstreamError>> + Send;
}

/// Production fetcher backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl HttpUpstream {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            connect_timeout,
        })
    }

    fn transport_error(&self, target: &UpstreamTarget, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout {
                target: target.name.clone(),
                after_ms: self.connect_timeout.as_millis(),
            }
        } else {
            UpstreamError::Unavailable {
                target: target.name.clone(),
                source: e,
            }
        }
    }
}

impl Fetch for HttpUpstream {
    async fn fetch(&self, target: &UpstreamTarget) -> Result<serde_json::Value, UpstreamError> {
        let url = target.url();
        let start = Instant::now();

        let mut resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(target, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                target: target.name.clone(),
                status: status.as_u16(),
            });
        }

        let too_large = || UpstreamError::BodyTooLarge {
            target: target.name.clone(),
            limit: MAX_BODY_BYTES,
        };
        if resp.content_length().is_some_and(|len| len > MAX_BODY_BYTES as u64) {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| self.transport_error(target, e))?
        {
            if bytes.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(
            target = %target.name,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "Upstream responded"
        );

        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode {
            target: target.name.clone(),
            reason: e.to_string(),
        })
    }
}
