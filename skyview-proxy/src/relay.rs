//! Request shaping and error relay towards OpenWeatherMap.
//!
//! The relay attaches the secret key, forwards a request and turns every
//! outcome into a status code plus JSON body. It never interprets weather data.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::settings::Settings;

pub const MISSING_KEY: &str = "API key not defined!";
const WEATHER_NETWORK_FAILURE: &str =
    "Failed to fetch current weather due to internal server or network error.";
const FORECAST_NETWORK_FAILURE: &str = "Failed to fetch data from OpenWeatherMap.";

const DEFAULT_CITY: &str = "London";
const DEFAULT_UNITS: &str = "metric";

/// Upstream resources the proxy is willing to forward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Weather,
    Forecast,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Weather => "weather",
            Resource::Forecast => "forecast",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "weather" => Some(Resource::Weather),
            "forecast" => Some(Resource::Forecast),
            _ => None,
        }
    }
}

/// Query accepted by `/weather`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    pub q: Option<String>,
    pub units: Option<String>,
}

/// Query accepted by `/forecast`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub endpoint: Option<String>,
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub units: Option<String>,
}

/// Status and JSON body to send back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: Value,
}

impl ProxyReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// How a non-success upstream answer is worded for the caller.
#[derive(Debug, Clone, Copy)]
enum ErrorStyle {
    /// `/weather`: reason phrase, falling back to the upstream body.
    CityLookup,
    /// `/forecast`: reason phrase only.
    Provider,
}

#[derive(Debug, Clone)]
pub struct Relay {
    http: Client,
    upstream_url: String,
    api_key: Option<String>,
}

impl Relay {
    pub fn new(settings: &Settings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: &Settings, http: Client) -> Self {
        Self {
            http,
            upstream_url: settings.upstream_url.clone(),
            api_key: settings.openweather_key.clone(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `GET /weather?q=&units=`
    pub async fn current(&self, query: WeatherQuery) -> ProxyReply {
        let Some(key) = self.api_key.as_deref() else {
            return missing_key();
        };

        let city = query
            .q
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_CITY.to_string());
        let units = query.units.unwrap_or_else(|| DEFAULT_UNITS.to_string());

        self.forward(
            Resource::Weather,
            key,
            &units,
            &[("q", city.as_str())],
            ErrorStyle::CityLookup,
            WEATHER_NETWORK_FAILURE,
        )
        .await
    }

    /// `GET /forecast?endpoint=&q=|lat=&lon=&units=`
    pub async fn forecast(&self, query: ForecastQuery) -> ProxyReply {
        let Some(key) = self.api_key.as_deref() else {
            return missing_key();
        };

        let requested = query.endpoint.unwrap_or_default();
        let Some(resource) = Resource::parse(&requested) else {
            return ProxyReply::error(400, format!("Unsupported endpoint: {requested}"));
        };

        let units = query.units.unwrap_or_else(|| DEFAULT_UNITS.to_string());

        let mut location: Vec<(&str, &str)> = Vec::new();
        match (query.q.as_deref(), query.lat.as_deref(), query.lon.as_deref()) {
            (Some(q), _, _) if !q.is_empty() => location.push(("q", q)),
            (_, Some(lat), Some(lon)) => {
                location.push(("lat", lat));
                location.push(("lon", lon));
            }
            _ => {}
        }

        self.forward(
            resource,
            key,
            &units,
            &location,
            ErrorStyle::Provider,
            FORECAST_NETWORK_FAILURE,
        )
        .await
    }

    async fn forward(
        &self,
        resource: Resource,
        key: &str,
        units: &str,
        location: &[(&str, &str)],
        style: ErrorStyle,
        network_failure: &str,
    ) -> ProxyReply {
        let url = format!("{}/{}", self.upstream_url, resource.as_str());
        // the key goes on the wire only; never log the full URL
        debug!("Forwarding to upstream {} {:?} units={}", resource.as_str(), location, units);

        let res = match self
            .http
            .get(&url)
            .query(&[("appid", key), ("units", units)])
            .query(location)
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                warn!("Upstream {} unreachable: {}", resource.as_str(), err.without_url());
                return ProxyReply::error(502, network_failure);
            }
        };

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            warn!("Upstream {} answered {}", resource.as_str(), status);
            return ProxyReply::error(status.as_u16(), upstream_message(style, status, &text));
        }

        match res.json::<Value>().await {
            Ok(body) => ProxyReply::ok(body),
            Err(err) => {
                warn!("Upstream {} sent unreadable JSON: {}", resource.as_str(), err.without_url());
                ProxyReply::error(502, network_failure)
            }
        }
    }
}

fn missing_key() -> ProxyReply {
    warn!("OPENWEATHER_KEY is not set; rejecting request");
    ProxyReply::error(500, MISSING_KEY)
}

fn upstream_message(style: ErrorStyle, status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or_default();
    match style {
        ErrorStyle::CityLookup => {
            let detail = if reason.is_empty() { body.trim() } else { reason };
            format!("City not found or API error: {detail}")
        }
        ErrorStyle::Provider => format!("OpenWeatherMap API Error: {reason}"),
    }
}
