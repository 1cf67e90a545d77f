use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, net::SocketAddr};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openweathermap.org/data/2.5";

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8888))
}

/// Proxy settings read from the environment.
///
/// `OPENWEATHER_KEY` may be missing; requests then fail with a 500 instead of
/// the service refusing to start.
#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub openweather_key: Option<String>,

    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        envy::from_env::<Settings>()
            .map(Settings::normalized)
            .context("Failed to read proxy settings from the environment")
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Settings>(pairs)
            .map(Settings::normalized)
            .context("Failed to read proxy settings")
    }

    fn normalized(mut self) -> Self {
        self.openweather_key = self
            .openweather_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.upstream_url = self.upstream_url.trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "openweather_key",
                &self.openweather_key.as_ref().map(|_| "<redacted>"),
            )
            .field("upstream_url", &self.upstream_url)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}
