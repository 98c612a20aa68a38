//! HTTP transport used for downloads and storage API queries

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::HttpConfig;
use crate::error::{ResolverError, Result};

/// Fetches the body of a URL.
///
/// Implementations return `HttpStatus` for non-success responses so callers
/// can tell "not found" from transport failures.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Longest wait between two attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Blocking HTTP client with bounded retry
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    policy: RetryPolicy,
}

/// How often and how patiently a failed request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): `backoff * 2^attempt`,
    /// capped at one minute
    pub fn delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff.checked_mul(factor))
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }

    /// Run `send` until it succeeds, fails for good, or retries run out
    fn run<T>(
        &self,
        url: &str,
        mut send: impl FnMut() -> std::result::Result<T, Attempt>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            log::debug!("GET {} (attempt {})", url, attempt + 1);
            match send() {
                Ok(value) => return Ok(value),
                Err(failed) if failed.retry && attempt < self.retries => {
                    let delay = self.delay(attempt);
                    log::warn!("{}; retrying in {:?}", failed.error, delay);
                    sleep(delay);
                    attempt += 1;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hpi-resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResolverError::io("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            policy: RetryPolicy {
                retries: config.retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    fn get_once(&self, url: &str) -> std::result::Result<Vec<u8>, Attempt> {
        let response = self.client.get(url).send().map_err(|e| {
            let retry = e.is_connect() || e.is_timeout();
            Attempt {
                error: ResolverError::io(format!("GET {} failed", url), e),
                retry,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Attempt::status(url, status));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Attempt {
                error: ResolverError::io(format!("Failed to read body of {}", url), e),
                retry: true,
            })
    }
}

/// A failed request and whether it is worth repeating
struct Attempt {
    error: ResolverError,
    retry: bool,
}

impl Attempt {
    /// 5xx and 429 are retried; any other status is final
    fn status(url: &str, status: StatusCode) -> Self {
        Self {
            error: ResolverError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            },
            retry: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.policy.run(url, || self.get_once(url), thread::sleep)
    }
}

/// Join a base URL and a relative path with exactly one `/` between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
