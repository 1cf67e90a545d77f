//! Search flows: fetch current weather and forecast together, keep the
//! results page, the history and the error area consistent.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    client::WeatherSource,
    error::{Result, WeatherError},
    history::{HistoryStore, KeyValueStore},
    model::{Coordinates, Units, WeatherReport, WeatherSnapshot},
    render::{self, Dashboard, HistoryPanel},
};

pub const CITY_LOADING: &str = "⏳ Fetching weather details...";
pub const COORDS_LOADING: &str = "⏳ Loading weather data...";
pub const EMPTY_CITY: &str = "⚠️ Please enter a city name!";
pub const NO_CITY_HERE: &str = "⚠️ No city found at your location. Please type a city name.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Results,
}

/// What the front-end should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    pub page: Page,
    /// Placeholder shown in the results panel while a search is in flight.
    pub loading: Option<&'static str>,
    /// Contents of the error/status area.
    pub notice: Option<String>,
    pub dashboard: Option<Dashboard>,
}

/// Handle for one search. Only the most recently issued ticket may change
/// the view; outcomes of older tickets are dropped. The `&mut self` search
/// methods run one search at a time, so front-ends that overlap searches must
/// drive `begin_*`, `fetch_report` and `complete_*` themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    units: Units,
}

impl SearchTicket {
    pub fn units(&self) -> Units {
        self.units
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Dashboard rendered for the canonical city name.
    Loaded(String),
    /// A newer search was started in the meantime.
    Discarded,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Reject empty or blank input before anything goes on the wire.
pub fn validate_city(input: &str) -> Result<&str> {
    let city = input.trim();
    if city.is_empty() {
        Err(WeatherError::Validation(EMPTY_CITY.to_string()))
    } else {
        Ok(city)
    }
}

#[derive(Debug)]
pub struct Orchestrator<S, K> {
    source: S,
    history: HistoryStore<K>,
    units: Units,
    last_city: Option<String>,
    view: View,
    seq: u64,
    today: fn() -> NaiveDate,
}

impl<S: WeatherSource, K: KeyValueStore> Orchestrator<S, K> {
    pub fn new(source: S, history: HistoryStore<K>) -> Self {
        Self {
            source,
            history,
            units: Units::default(),
            last_city: None,
            view: View::default(),
            seq: 0,
            today: local_today,
        }
    }

    /// Override the date used for the hourly timeline.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    /// Canonical name of the last city that loaded successfully.
    pub fn last_city(&self) -> Option<&str> {
        self.last_city.as_deref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn history(&self) -> Vec<String> {
        self.history.list()
    }

    pub fn history_panel(&self) -> HistoryPanel {
        render::render_history(&self.history.list())
    }

    /// Put a message in the error area without touching the page.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.view.notice = Some(message.into());
    }

    /// Show `err` and go back to the home page.
    pub fn fail(&mut self, err: &WeatherError) {
        warn!("Search failed: {}", err);
        self.view = View {
            page: Page::Home,
            loading: None,
            notice: Some(err.user_message()),
            dashboard: None,
        };
    }

    fn issue_ticket(&mut self, loading: &'static str) -> SearchTicket {
        self.seq += 1;
        self.view = View {
            page: Page::Results,
            loading: Some(loading),
            notice: None,
            dashboard: None,
        };
        SearchTicket {
            seq: self.seq,
            units: self.units,
        }
    }

    fn is_current(&self, ticket: &SearchTicket) -> bool {
        if ticket.seq == self.seq {
            true
        } else {
            warn!(
                "Discarding result of search #{} (latest is #{})",
                ticket.seq, self.seq
            );
            false
        }
    }

    /// Switch to the results page with a loading placeholder.
    pub fn begin_city_search(&mut self) -> SearchTicket {
        self.issue_ticket(CITY_LOADING)
    }

    pub fn begin_coordinates_search(&mut self) -> SearchTicket {
        self.issue_ticket(COORDS_LOADING)
    }

    /// Fetch current conditions and forecast concurrently. Both requests are
    /// driven to completion before either result is looked at.
    pub async fn fetch_report(&self, city: &str, units: Units) -> Result<WeatherReport> {
        debug!("Fetching current weather and forecast for '{}' ({})", city, units);

        let (current, forecast) = tokio::join!(
            self.source.fetch_current(city, units),
            self.source.fetch_forecast(city, units),
        );

        Ok(WeatherReport {
            current: current?,
            forecast: forecast?,
        })
    }

    pub async fn resolve_coordinates(&self, at: Coordinates, units: Units) -> Result<WeatherSnapshot> {
        debug!("Resolving coordinates {}, {}", at.lat, at.lon);
        self.source.fetch_current_by_coords(at.lat, at.lon, units).await
    }

    /// Apply the outcome of a city search started with `ticket`.
    pub fn complete_city_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<WeatherReport>,
    ) -> Result<SearchOutcome> {
        if !self.is_current(&ticket) {
            return Ok(SearchOutcome::Discarded);
        }

        let report = match outcome {
            Ok(report) => report,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        let city = report.current.city.clone();
        if let Err(err) = self.history.record(&city) {
            warn!("Could not update search history: {}", err);
        }

        let dashboard = render::render_dashboard(
            &report.current,
            &report.forecast,
            ticket.units,
            (self.today)(),
        );

        self.view = View {
            page: Page::Results,
            loading: None,
            notice: None,
            dashboard: Some(dashboard),
        };
        self.last_city = Some(city.clone());

        info!("Loaded weather for {}", city);
        Ok(SearchOutcome::Loaded(city))
    }

    /// Apply the outcome of a coordinate lookup; yields the canonical city
    /// name to search next, or `None` when the lookup is stale.
    pub fn complete_coordinates_lookup(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<WeatherSnapshot>,
    ) -> Result<Option<String>> {
        if !self.is_current(&ticket) {
            return Ok(None);
        }

        let snapshot = match outcome {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        // open sea and remote positions come back without a name
        if validate_city(&snapshot.city).is_err() {
            let err = WeatherError::NotFound {
                message: NO_CITY_HERE.to_string(),
            };
            self.fail(&err);
            return Err(err);
        }

        Ok(Some(snapshot.city))
    }

    /// Full search for a city typed by the user or picked from history.
    pub async fn search_by_city(&mut self, input: &str) -> Result<SearchOutcome> {
        let city = match validate_city(input) {
            Ok(city) => city.to_string(),
            Err(err) => {
                self.notify(err.user_message());
                return Err(err);
            }
        };

        let ticket = self.begin_city_search();
        let outcome = self.fetch_report(&city, ticket.units).await;
        self.complete_city_search(ticket, outcome)
    }

    /// Resolve the city at the given position, then run the city search for
    /// it so current weather and forecast load the same way as a typed name.
    pub async fn search_by_coordinates(&mut self, lat: f64, lon: f64) -> Result<SearchOutcome> {
        let ticket = self.begin_coordinates_search();
        let outcome = self
            .resolve_coordinates(Coordinates { lat, lon }, ticket.units)
            .await;

        match self.complete_coordinates_lookup(ticket, outcome)? {
            Some(city) => self.search_by_city(&city).await,
            None => Ok(SearchOutcome::Discarded),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::model::{ForecastList, fixtures};

    /// Canned responses keyed by lowercase city name.
    #[derive(Debug, Default)]
    pub struct FakeSource {
        pub current: HashMap<String, std::result::Result<WeatherSnapshot, (u16, String)>>,
        pub forecast: HashMap<String, std::result::Result<ForecastList, (u16, String)>>,
        pub by_coords: Option<std::result::Result<WeatherSnapshot, (u16, String)>>,
        pub calls: AtomicUsize,
        pub units_seen: Mutex<Vec<Units>>,
    }

    fn to_error(status: u16, message: &str) -> WeatherError {
        if status == 404 {
            WeatherError::NotFound {
                message: message.to_string(),
            }
        } else {
            WeatherError::Upstream {
                status,
                message: message.to_string(),
            }
        }
    }

    impl FakeSource {
        pub fn with_city(mut self, name: &str, temperature: f64, main: &str) -> Self {
            let key = name.to_lowercase();
            self.current
                .insert(key.clone(), Ok(fixtures::snapshot(name, temperature, main)));
            let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
            self.forecast
                .insert(key, Ok(fixtures::five_day_list(today, 5)));
            self
        }

        pub fn failing_current(mut self, city: &str, status: u16, message: &str) -> Self {
            self.current
                .insert(city.to_lowercase(), Err((status, message.to_string())));
            self
        }

        pub fn failing_forecast(mut self, city: &str, status: u16, message: &str) -> Self {
            self.forecast
                .insert(city.to_lowercase(), Err((status, message.to_string())));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn fetch_current(&self, city: &str, units: Units) -> Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.units_seen.lock().unwrap().push(units);
            match self.current.get(&city.to_lowercase()) {
                Some(Ok(snapshot)) => Ok(snapshot.clone()),
                Some(Err((status, msg))) => Err(to_error(*status, msg)),
                None => Err(to_error(404, "City not found or API error: Not Found")),
            }
        }

        async fn fetch_current_by_coords(
            &self,
            _lat: f64,
            _lon: f64,
            _units: Units,
        ) -> Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.by_coords {
                Some(Ok(snapshot)) => Ok(snapshot.clone()),
                Some(Err((status, msg))) => Err(to_error(*status, msg)),
                None => Err(to_error(400, "Could not fetch weather data for current location.")),
            }
        }

        async fn fetch_forecast(&self, city: &str, _units: Units) -> Result<ForecastList> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.forecast.get(&city.to_lowercase()) {
                Some(Ok(list)) => Ok(list.clone()),
                Some(Err((status, msg))) => Err(to_error(*status, msg)),
                None => Err(to_error(404, "OpenWeatherMap API Error: Not Found")),
            }
        }
    }

    pub fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }
}
