use akfetch::http::{ClientConfig, DefaultHttpClient, FetchOptions, MAX_RETRIES, RetryPolicy};
use akfetch::Proxies;
use anyhow::{Result, anyhow};
use clap::Parser;
use std::time::Duration;

/// akfetch - fetch a data endpoint with retry and backoff
///
/// Sends a GET request, retrying failed, rate-limited and empty responses
/// with exponential backoff, and prints the payload.
///
/// Examples:
///   akfetch https://example.com/api/quote -p symbol=sh600000
///   akfetch https://example.com/list.csv --text --retries 5 --delay 0.5
#[derive(Parser, Debug)]
#[command(author, version = env!("AKFETCH_VERSION"), about)]
struct Cli {
    /// The URL to fetch
    #[arg(value_name = "URL")]
    url: String,

    /// Query parameter (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Request header (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Proxy for both http and https (also via PROXY)
    #[arg(long, env = "PROXY", value_name = "URL")]
    proxy: Option<String>,

    /// Total number of attempts
    #[arg(long = "retries", value_name = "N", default_value_t = MAX_RETRIES)]
    max_retries: usize,

    /// Seconds to wait after the first failed attempt; doubles after each failure
    #[arg(long = "delay", value_name = "SECS", default_value_t = 1.0)]
    retry_delay: f64,

    /// Print the raw body instead of decoding it as JSON
    #[arg(long)]
    text: bool,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    timeout: Option<Duration>,
}

fn parse_param(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {:?}", s))?;
    if key.is_empty() {
        return Err(anyhow!("parameter name must not be empty"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String)> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected NAME:VALUE, got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header name must not be empty"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_secs(s: &str) -> Result<Duration> {
    let secs: f64 = s.parse()?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(anyhow!("expected a positive number of seconds, got {}", s));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow!("{} seconds is out of range: {}", s, e))
}

fn run(cli: Cli) -> Result<String> {
    let policy = RetryPolicy::from_secs_f64(cli.max_retries, cli.retry_delay)?;

    let mut options = FetchOptions::new().policy(policy);
    options.params = cli.params;
    options.headers = cli.headers;
    if let Some(proxy) = cli.proxy {
        options = options.proxies(Proxies::single(proxy));
    }

    let client = DefaultHttpClient::from_config(ClientConfig {
        timeout: cli.timeout,
        ..Default::default()
    })?;

    if cli.text {
        Ok(client.fetch_text(&cli.url, &options)?)
    } else {
        let value = client.fetch_json(&cli.url, &options)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let output = run(cli)?;
    println!("{}", output);
    Ok(())
}
