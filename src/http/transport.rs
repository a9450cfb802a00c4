//! The blocking transport behind the retry loop, and the sleep it uses
//! between attempts.

use log::debug;
use reqwest::Proxy;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Proxies;
use crate::error::TransportError;

/// One outgoing GET, with proxies already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub proxies: Option<Proxies>,
}

/// Status and body of a response, whatever the status was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a single GET request. Implementations do not retry.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn get(&self, request: &FetchRequest) -> Result<RawResponse, TransportError>;
}

/// Blocks the calling thread between attempts.
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Settings for the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Sent with every request, before per-call headers.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("akfetch/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            default_headers: Vec::new(),
        }
    }
}

/// [`Transport`] over a blocking reqwest client.
///
/// reqwest fixes proxies when a client is built, so a separate client is
/// built for each distinct proxy set. The most recent one is cached. An
/// empty proxy set uses the base client.
pub struct ReqwestTransport {
    config: ClientConfig,
    base: Client,
    proxied: Mutex<Option<(Proxies, Client)>>,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let base = build_client(&config, None)?;
        Ok(Self {
            config,
            base,
            proxied: Mutex::new(None),
        })
    }

    fn client_for(&self, proxies: Option<&Proxies>) -> Result<Client, TransportError> {
        let Some(proxies) = proxies.filter(|p| !p.is_empty()) else {
            return Ok(self.base.clone());
        };

        let mut proxied = self.proxied.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached, client)) = proxied.as_ref() {
            if cached == proxies {
                return Ok(client.clone());
            }
        }

        debug!("Building client for proxies {:?}", proxies);
        let client = build_client(&self.config, Some(proxies))?;
        *proxied = Some((proxies.clone(), client.clone()));
        Ok(client)
    }
}

impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(url = %request.url))]
    fn get(&self, request: &FetchRequest) -> Result<RawResponse, TransportError> {
        let client = self.client_for(request.proxies.as_ref())?;

        let mut builder = client.get(&request.url);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("GET {} -> {} ({} bytes)", request.url, status, body.len());

        Ok(RawResponse { status, body })
    }
}

fn build_client(config: &ClientConfig, proxies: Option<&Proxies>) -> Result<Client, TransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.default_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::new(format!("Invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::new(format!("Invalid header value for {}: {}", name, e)))?;
        headers.insert(name, value);
    }

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout);

    if let Some(proxies) = proxies {
        for (scheme, url) in proxies.iter() {
            let proxy = match scheme {
                "http" => Proxy::http(url)?,
                "https" => Proxy::https(url)?,
                "all" => Proxy::all(url)?,
                other => {
                    return Err(TransportError::new(format!(
                        "Unsupported proxy scheme: {}",
                        other
                    )));
                }
            };
            builder = builder.proxy(proxy);
        }
    }

    Ok(builder.build()?)
}
