use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of entries in the hourly timeline.
pub const HOURLY_LIMIT: usize = 8;

/// Measurement system requested from the API and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The `weather[0]` block shared by current and forecast payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Canonical city name as returned by the API.
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: Condition,
    pub wind_speed: f64,
    pub humidity_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub condition: Condition,
}

/// Forecast at 3-hour steps, in the order the API returned it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastList {
    pub entries: Vec<ForecastEntry>,
}

impl ForecastList {
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    /// One entry per day: the slots stamped exactly at noon.
    pub fn daily(&self) -> impl Iterator<Item = &ForecastEntry> {
        self.entries.iter().filter(|e| {
            let t = e.timestamp.time();
            t.hour() == 12 && t.minute() == 0 && t.second() == 0
        })
    }

    /// Slots falling on `today`, at most [`HOURLY_LIMIT`] of them.
    pub fn hourly(&self, today: NaiveDate) -> impl Iterator<Item = &ForecastEntry> {
        self.entries
            .iter()
            .filter(move |e| e.timestamp.date() == today)
            .take(HOURLY_LIMIT)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current conditions and forecast fetched together for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: WeatherSnapshot,
    pub forecast: ForecastList,
}
