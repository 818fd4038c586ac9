//! Rate-limit aware GET client for the remote API.
//!
//! Every request goes through [`RateLimitedClient::get`], which retries
//! throttled (429) and server-side (5xx) responses with exponential backoff
//! and reports the result as a [`FetchOutcome`]:
//!
//! - `200` decodes the JSON body into [`FetchOutcome::Found`]
//! - `404` is [`FetchOutcome::NotFound`], a legitimate absence
//! - anything else ends in [`FetchOutcome::Failed`]

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;

use crate::config::{TOKEN_HEADER, USER_AGENT};
use crate::error::{HarvestError, Result};
use crate::pacing::Sleeper;

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Result of one logical GET, after retries.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(Value),
    NotFound,
    Failed(HarvestError),
}

impl FetchOutcome {
    /// Collapse into a `Result`, mapping `NotFound` to `Ok(None)`.
    pub fn into_result(self) -> Result<Option<Value>> {
        match self {
            FetchOutcome::Found(value) => Ok(Some(value)),
            FetchOutcome::NotFound => Ok(None),
            FetchOutcome::Failed(err) => Err(err),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchOutcome::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status, `Retry-After` header and body of a single HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Issues one GET without any retry logic.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse>;
}

/// [`Transport`] over a blocking reqwest client.
///
/// Each request carries the API token header and the crate user agent, and
/// is bounded by the configured timeout.
pub struct HttpTransport {
    client: Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HarvestError::Credentials("API key is empty".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, api_key })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .header(TOKEN_HEADER, &self.api_key)
            .send()?;
        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.text()?;
        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Exponential backoff for throttled and server-error responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles each retry.
    pub base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base: Duration::from_millis(1200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base,
        }
    }

    pub fn is_retryable(status: u16) -> bool {
        status == 429 || (500..=599).contains(&status)
    }

    /// `base * 2^attempt` for a zero-based attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Backoff raised to the server's `Retry-After` seconds, if it is larger.
    pub fn wait_for(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        let backoff = self.backoff(attempt);
        match retry_after.and_then(parse_retry_after) {
            Some(hint) => backoff.max(hint),
            None => backoff,
        }
    }
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

// ---------------------------------------------------------------------------
// RateLimitedClient
// ---------------------------------------------------------------------------

/// GET client applying [`RetryPolicy`] on top of a [`Transport`].
pub struct RateLimitedClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimitedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `url` with query `params`, retrying 429/5xx responses.
    ///
    /// No wait follows the last attempt: once the attempts are spent the call
    /// fails with [`HarvestError::RetriesExhausted`]. Transport errors and
    /// statuses other than 200/404/429/5xx fail without a retry.
    pub fn get(&self, url: &str, params: &[(&str, String)]) -> FetchOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_status = 0;

        for attempt in 0..max_attempts {
            let resp = match self.transport.get(url, params) {
                Ok(resp) => resp,
                Err(err) => return FetchOutcome::Failed(err),
            };

            match resp.status {
                200 => {
                    return match serde_json::from_str(&resp.body) {
                        Ok(value) => FetchOutcome::Found(value),
                        Err(err) => FetchOutcome::Failed(err.into()),
                    };
                }
                404 => return FetchOutcome::NotFound,
                status if RetryPolicy::is_retryable(status) => {
                    last_status = status;
                    if attempt + 1 >= max_attempts {
                        break;
                    }
                    let wait = self.policy.wait_for(attempt, resp.retry_after.as_deref());
                    tracing::warn!(
                        "{} from {} -> retrying in {:.1}s (attempt {}/{})",
                        status,
                        url,
                        wait.as_secs_f64(),
                        attempt + 1,
                        max_attempts
                    );
                    self.sleeper.sleep(wait);
                }
                status => {
                    return FetchOutcome::Failed(HarvestError::UnexpectedStatus {
                        url: url.to_string(),
                        status,
                    });
                }
            }
        }

        tracing::error!(
            "Giving up on {} after {} attempts (last status {})",
            url,
            max_attempts,
            last_status
        );
        FetchOutcome::Failed(HarvestError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
            status: last_status,
        })
    }
}
