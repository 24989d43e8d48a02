//! Client configuration.
//!
//! Built explicitly with `ClientConfig::new` or read from the environment
//! through `Envconfig::init_from_env`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use envconfig::Envconfig;

pub const DEFAULT_BASE_URL: &str = "https://api-ssl.bitly.com/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Envconfig, Clone)]
pub struct ClientConfig {
    #[envconfig(from = "BITLY_API_BASE", default = "https://api-ssl.bitly.com/v3")]
    pub base_url: String,

    #[envconfig(from = "BITLY_ACCESS_TOKEN")]
    pub access_token: String,

    #[envconfig(from = "BITLY_TIMEOUT_MS", default = "10000")]
    pub timeout: EnvMsDuration,
}

impl ClientConfig {
    pub fn new(access_token: &str) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.to_string(),
            timeout: EnvMsDuration(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = EnvMsDuration(timeout);
        self
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// The token stays out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout.0)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvMsDuration(pub Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl fmt::Display for ParseEnvMsDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a duration in milliseconds")
    }
}

impl std::error::Error for ParseEnvMsDurationError {}

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(Duration::from_millis(ms)))
    }
}
