use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

use crate::{
    error::{Result, WeatherError},
    model::{Condition, ForecastEntry, ForecastList, Units, WeatherSnapshot},
};

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8888";

/// Source of weather data for the orchestrator.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str, units: Units) -> Result<WeatherSnapshot>;

    async fn fetch_current_by_coords(&self, lat: f64, lon: f64, units: Units)
    -> Result<WeatherSnapshot>;

    async fn fetch_forecast(&self, city: &str, units: Units) -> Result<ForecastList>;
}

/// HTTP client for the `/weather` and `/forecast` proxy endpoints.
///
/// The proxy holds the API key; this client never talks to the upstream
/// provider directly.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let res = self.http.get(&url).query(query).send().await?;
        Ok(res)
    }
}

/// Turn a non-success response into a typed error.
///
/// The proxy answers failures with `{"error": "..."}`; when that envelope is
/// missing or unreadable, `fallback` builds the message from the status.
async fn error_from_response(res: Response, fallback: impl FnOnce(u16) -> String) -> WeatherError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| fallback(status));

    debug!("Proxy returned {}: {}", status, truncate_body(&body));

    if status == 404 {
        WeatherError::NotFound { message }
    } else {
        WeatherError::Upstream { status, message }
    }
}

async fn parse_body<T: for<'de> Deserialize<'de>>(res: Response, what: &str) -> Result<T> {
    let body = res.text().await?;
    serde_json::from_str(&body)
        .map_err(|err| WeatherError::InvalidResponse(format!("{what}: {err}")))
}

#[async_trait]
impl WeatherSource for ProxyClient {
    async fn fetch_current(&self, city: &str, units: Units) -> Result<WeatherSnapshot> {
        let res = self
            .get("weather", &[("q", city), ("units", units.as_str())])
            .await?;

        if !res.status().is_success() {
            return Err(error_from_response(res, |status| {
                format!("City \"{city}\" not found (Error Code: {status})")
            })
            .await);
        }

        let parsed: OwCurrentResponse = parse_body(res, "current weather").await?;
        parsed.try_into()
    }

    async fn fetch_current_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<WeatherSnapshot> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let res = self
            .get(
                "forecast",
                &[
                    ("endpoint", "weather"),
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", units.as_str()),
                ],
            )
            .await?;

        if !res.status().is_success() {
            return Err(error_from_response(res, |_| {
                "Could not fetch weather data for current location.".to_string()
            })
            .await);
        }

        let parsed: OwCurrentResponse = parse_body(res, "current weather by coordinates").await?;
        parsed.try_into()
    }

    async fn fetch_forecast(&self, city: &str, units: Units) -> Result<ForecastList> {
        let res = self
            .get(
                "forecast",
                &[("endpoint", "forecast"), ("q", city), ("units", units.as_str())],
            )
            .await?;

        if !res.status().is_success() {
            return Err(error_from_response(res, |status| {
                format!("Forecast data unavailable for \"{city}\" (Error Code: {status})")
            })
            .await);
        }

        let parsed: OwForecastResponse = parse_body(res, "forecast").await?;
        parsed.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition {
            main: w.main,
            description: w.description,
            icon: w.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self> {
        let condition = first_condition(parsed.weather, "current weather")?;

        Ok(WeatherSnapshot {
            city: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            condition,
            wind_speed: parsed.wind.speed,
            humidity_pct: parsed.main.humidity,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl TryFrom<OwForecastResponse> for ForecastList {
    type Error = WeatherError;

    fn try_from(parsed: OwForecastResponse) -> Result<Self> {
        let entries = parsed
            .list
            .into_iter()
            .map(|entry| {
                let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
                    .map_err(|err| {
                        WeatherError::InvalidResponse(format!(
                            "bad forecast timestamp '{}': {err}",
                            entry.dt_txt
                        ))
                    })?;

                Ok(ForecastEntry {
                    timestamp,
                    temperature: entry.main.temp,
                    condition: first_condition(entry.weather, "forecast entry")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForecastList::new(entries))
    }
}

fn first_condition(weather: Vec<OwWeather>, what: &str) -> Result<Condition> {
    weather
        .into_iter()
        .next()
        .map(Condition::from)
        .ok_or_else(|| WeatherError::InvalidResponse(format!("{what} has no weather condition")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ProxyClient::new("http://localhost:8888/");
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn current_payload_maps_to_snapshot() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 15.3, "feels_like": 14.8, "humidity": 81 },
            "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }],
            "wind": { "speed": 4.1 }
        }))
        .unwrap();

        let snapshot = WeatherSnapshot::try_from(parsed).unwrap();
        assert_eq!(snapshot.city, "London");
        assert_eq!(snapshot.country, "GB");
        assert_eq!(snapshot.condition.main, "Rain");
        assert_eq!(snapshot.humidity_pct, 81);
    }

    #[test]
    fn current_payload_without_condition_is_invalid() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "London",
            "sys": {},
            "main": { "temp": 1.0, "feels_like": 1.0, "humidity": 1 },
            "weather": [],
            "wind": { "speed": 0.0 }
        }))
        .unwrap();

        let err = WeatherSnapshot::try_from(parsed).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidResponse(_)));
    }

    #[test]
    fn forecast_timestamps_are_parsed() {
        let parsed: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [
                { "dt_txt": "2024-05-01 12:00:00", "main": { "temp": 15.0 },
                  "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }] },
                { "dt_txt": "2024-05-01 15:00:00", "main": { "temp": 16.5 },
                  "weather": [{ "main": "Clouds", "description": "few clouds", "icon": "02d" }] }
            ]
        }))
        .unwrap();

        let list = ForecastList::try_from(parsed).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries[1].timestamp.to_string(), "2024-05-01 15:00:00");
        assert_eq!(list.entries[1].condition.icon, "02d");
    }

    #[test]
    fn bad_forecast_timestamp_is_invalid() {
        let parsed: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [
                { "dt_txt": "yesterday", "main": { "temp": 15.0 },
                  "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }] }
            ]
        }))
        .unwrap();

        let err = ForecastList::try_from(parsed).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
