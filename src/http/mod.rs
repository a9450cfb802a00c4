//! HTTP fetch layer with retry logic and error classification.

mod client;
mod payload;
mod retry;
mod transport;

pub use client::{
    DefaultHttpClient, FetchOptions, HttpClient, fetch_json, fetch_text, retry_options,
};
pub use payload::Payload;
pub use retry::{MAX_RETRIES, Outcome, RETRY_DELAY_MS, RetryPolicy, classify_status};
pub use transport::{
    ClientConfig, FetchRequest, RawResponse, ReqwestTransport, Sleeper, ThreadSleeper, Transport,
};

#[cfg(test)]
pub use transport::{MockSleeper, MockTransport};
