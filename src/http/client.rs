//! GET with retry and exponential backoff.

use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use super::payload::Payload;
use super::retry::{Outcome, RetryPolicy, classify_status};
use super::transport::{
    ClientConfig, FetchRequest, ReqwestTransport, Sleeper, ThreadSleeper, Transport,
};
use crate::config::{self, Proxies};
use crate::error::{FetchError, TransportError};

/// Per-call request options.
///
/// When `proxies` is `None` the process-wide setting from
/// [`config::get_proxies`] is read at the start of every attempt.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub proxies: Option<Proxies>,
    pub policy: RetryPolicy,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn proxies(mut self, proxies: Proxies) -> Self {
        self.proxies = Some(proxies);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Why one attempt failed. Only the last attempt's failure reaches the caller.
#[derive(Debug)]
enum AttemptFailure {
    Transport(TransportError),
    Response(FetchError),
}

impl AttemptFailure {
    /// Transport failures are wrapped; response failures pass through as-is.
    fn into_fetch_error(self, attempts: usize) -> FetchError {
        match self {
            AttemptFailure::Transport(e) => FetchError::network(attempts, e.message),
            AttemptFailure::Response(e) => e,
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) => write!(f, "network error: {}", e),
            AttemptFailure::Response(e) => write!(f, "{}", e),
        }
    }
}

/// HTTP client that retries failed GETs with exponential backoff.
pub struct HttpClient<T: Transport, S: Sleeper> {
    transport: T,
    sleeper: S,
}

pub type DefaultHttpClient = HttpClient<ReqwestTransport, ThreadSleeper>;

impl DefaultHttpClient {
    /// A reqwest-backed client that really sleeps between attempts.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::new(ReqwestTransport::new(config)?, ThreadSleeper))
    }
}

impl<T: Transport, S: Sleeper> HttpClient<T, S> {
    pub fn new(transport: T, sleeper: S) -> Self {
        Self { transport, sleeper }
    }

    /// GETs `url` and decodes the body as JSON.
    pub fn fetch_json(&self, url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
        self.fetch(url, options)
    }

    /// GETs `url` and returns the body as text.
    pub fn fetch_text(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        self.fetch(url, options)
    }

    /// Returns the payload of the first HTTP 200 response whose body yields a
    /// non-empty payload.
    ///
    /// An HTTP 200 with an empty payload (`{}`, `[]`, `""`, ...) is retried
    /// like any other failure; callers cannot tell a legitimately empty
    /// result apart from a transient one.
    #[tracing::instrument(skip(self, options))]
    pub fn fetch<P: Payload>(&self, url: &str, options: &FetchOptions) -> Result<P, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::invalid_parameter("url must not be empty"));
        }

        let policy = options.policy;
        let max_retries = policy.max_retries();
        debug!("GET {} (up to {} attempts)...", url, max_retries);

        for attempt in 0..max_retries {
            match self.attempt::<P>(url, options) {
                Ok(payload) => {
                    debug!("GET {}: succeeded on attempt {}", url, attempt + 1);
                    return Ok(payload);
                }
                Err(failure) if attempt + 1 == max_retries => {
                    debug!(
                        "GET {}: attempt {}/{} failed ({}), giving up",
                        url,
                        attempt + 1,
                        max_retries,
                        failure
                    );
                    return Err(failure.into_fetch_error(max_retries));
                }
                Err(failure) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        "GET {}: attempt {}/{} failed ({}), retrying in {:?}...",
                        url,
                        attempt + 1,
                        max_retries,
                        failure,
                        delay
                    );
                    self.sleeper.sleep(delay);
                }
            }
        }

        Err(FetchError::network(max_retries, "no attempt completed"))
    }

    fn attempt<P: Payload>(&self, url: &str, options: &FetchOptions) -> Result<P, AttemptFailure> {
        let request = FetchRequest {
            url: url.to_string(),
            params: options.params.clone(),
            headers: options.headers.clone(),
            proxies: options.proxies.clone().or_else(config::get_proxies),
        };

        let response = self
            .transport
            .get(&request)
            .map_err(AttemptFailure::Transport)?;

        match classify_status(response.status) {
            Outcome::Success => {
                let payload = P::extract(response.body)
                    .map_err(|e| AttemptFailure::Response(FetchError::data_parsing(e)))?;
                if payload.is_empty() {
                    return Err(AttemptFailure::Response(FetchError::data_parsing(
                        "response payload is empty",
                    )));
                }
                Ok(payload)
            }
            Outcome::RateLimited => Err(AttemptFailure::Response(FetchError::rate_limit())),
            Outcome::Failed(status) => Err(AttemptFailure::Response(FetchError::api(status))),
        }
    }
}

static DEFAULT_CLIENT: OnceLock<Result<DefaultHttpClient, TransportError>> = OnceLock::new();

fn default_client() -> Result<&'static DefaultHttpClient, FetchError> {
    DEFAULT_CLIENT
        .get_or_init(|| DefaultHttpClient::from_config(ClientConfig::default()))
        .as_ref()
        .map_err(client_build_error)
}

fn client_build_error(error: &TransportError) -> FetchError {
    FetchError::network(0, format!("failed to build HTTP client: {}", error))
}

/// [`HttpClient::fetch_json`] on a shared default client.
pub fn fetch_json(url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
    default_client()?.fetch_json(url, options)
}

/// [`HttpClient::fetch_text`] on a shared default client.
pub fn fetch_text(url: &str, options: &FetchOptions) -> Result<String, FetchError> {
    default_client()?.fetch_text(url, options)
}

/// Default options with a custom attempt count and first backoff delay.
pub fn retry_options(max_retries: usize, retry_delay: Duration) -> Result<FetchOptions, FetchError> {
    Ok(FetchOptions::new().policy(RetryPolicy::new(max_retries, retry_delay)?))
}
