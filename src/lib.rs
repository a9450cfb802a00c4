pub mod config;
pub mod error;
pub mod http;
pub mod runtime;
pub mod session;

pub use config::{Proxies, get_proxies, scoped_proxies, set_proxies, with_proxies};
pub use error::{FetchError, TransportError};
pub use http::{FetchOptions, HttpClient, RetryPolicy, fetch_json, fetch_text};
