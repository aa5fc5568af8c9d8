use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Protocol {
    Http(u16), // port
    Tcp(u16),  // port
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http: Protocol,
    pub tcp: Protocol,
    pub cache_impl: String,
    pub cache_size: i64,
    pub cache_timeout: Duration,
    pub sleep_impl: String,
    pub log_level: String,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_TCP_PORT: u16 = 5500;
    const DEFAULT_CACHE_IMPL: &str = "map";
    const DEFAULT_CACHE_SIZE: i64 = 50_000;
    const DEFAULT_CACHE_TIMEOUT_MS: u64 = 1_000;
    const DEFAULT_SLEEP_IMPL: &str = "tokio";
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Reads the process environment. See [`init`] for the `.env` + tracing bootstrap.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_port = parse_or(get("BENCH_HTTP_PORT"), "BENCH_HTTP_PORT", Self::DEFAULT_HTTP_PORT)?;
        let tcp_port = parse_or(get("BENCH_TCP_PORT"), "BENCH_TCP_PORT", Self::DEFAULT_TCP_PORT)?;
        let cache_size = parse_or(get("CACHE_SIZE"), "CACHE_SIZE", Self::DEFAULT_CACHE_SIZE)?;
        let timeout_ms = parse_or(
            get("CACHE_TIMEOUT_MS"),
            "CACHE_TIMEOUT_MS",
            Self::DEFAULT_CACHE_TIMEOUT_MS,
        )?;
        if timeout_ms == 0 {
            return Err(Error::Config("CACHE_TIMEOUT_MS must be > 0".into()));
        }

        let cache_impl = get("CACHE_IMPL")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| Self::DEFAULT_CACHE_IMPL.to_string());
        let sleep_impl = get("SLEEP_IMPL")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| Self::DEFAULT_SLEEP_IMPL.to_string());

        Ok(Self {
            host: get("BENCH_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http: Protocol::Http(http_port),
            tcp: Protocol::Tcp(tcp_port),
            cache_impl,
            cache_size,
            cache_timeout: Duration::from_millis(timeout_ms),
            sleep_impl,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    pub fn bind_addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

/// Process bootstrap shared by every binary: loads `.env`, reads the
/// config, and installs tracing at the configured level.
pub fn init() -> Result<Config> {
    let env_file: Option<PathBuf> = dotenvy::dotenv().ok();
    let config = Config::from_env();

    let level = config
        .as_ref()
        .map(|c| c.log_level.as_str())
        .unwrap_or(Config::DEFAULT_LOG_LEVEL);
    crate::telemetry::init_tracing(level);

    match env_file {
        Some(path) => tracing::info!("Loaded environment variables from {}", path.display()),
        None => tracing::info!("No .env file found, using system environment variables"),
    }
    config
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| Error::Config(format!("invalid {}={:?}: {}", key, v, e))),
    }
}

impl Protocol {
    pub fn port(&self) -> u16 {
        match self {
            Protocol::Http(port) | Protocol::Tcp(port) => *port,
        }
    }

    pub fn scheme(&self) -> &str {
        match self {
            Protocol::Http(..) => "http",
            Protocol::Tcp(..) => "tcp",
        }
    }
}
