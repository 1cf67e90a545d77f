//! Pure transforms from weather data to the display model.
//!
//! Nothing in here touches the network or storage. The painting adapter (the
//! terminal front-end) only ever sees these types.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::{
    catalog,
    model::{ForecastList, Units, WeatherSnapshot},
};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

pub const HISTORY_PLACEHOLDER: &str = "Search a city to start your history!";

/// Main panel for the current conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPanel {
    pub heading: String,
    pub temperature: String,
    pub icon_url: String,
    pub icon_alt: String,
    pub feels_like: String,
    pub condition: String,
    pub wind: String,
    pub humidity: String,
    pub advice: String,
}

/// One card of the multi-day summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCard {
    pub date: String,
    pub icon_url: String,
    pub icon_alt: String,
    pub temperature: String,
}

/// One card of the same-day timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyCard {
    pub time: String,
    pub icon: String,
    pub temperature: String,
    pub mood: String,
}

/// Everything shown on the results page after a successful search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub current: CurrentPanel,
    pub daily: Vec<DailyCard>,
    pub hourly: Vec<HourlyCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HistoryPanel {
    Placeholder(&'static str),
    Entries(Vec<String>),
}

/// Round half up, the way the dashboard always displayed temperatures.
pub fn round_temperature(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn format_temperature(value: f64, units: Units) -> String {
    format!("{}{}", round_temperature(value), units.symbol())
}

pub fn render_current(snapshot: &WeatherSnapshot, units: Units) -> CurrentPanel {
    let details = catalog::lookup(&snapshot.condition.main);

    CurrentPanel {
        heading: format!("{}, {}", snapshot.city, snapshot.country),
        temperature: format_temperature(snapshot.temperature, units),
        icon_url: format!("{ICON_BASE_URL}/{}@4x.png", snapshot.condition.icon),
        icon_alt: snapshot.condition.description.clone(),
        feels_like: format!("Feels Like: {}", format_temperature(snapshot.feels_like, units)),
        condition: format!("Condition: {}", snapshot.condition.description),
        wind: format!("💨 Wind: {} {}", snapshot.wind_speed, units.wind_unit()),
        humidity: format!("💧 Humidity: {}%", snapshot.humidity_pct),
        advice: details.advice.to_string(),
    }
}

pub fn render_daily(forecast: &ForecastList, units: Units) -> Vec<DailyCard> {
    forecast
        .daily()
        .map(|day| DailyCard {
            date: day.timestamp.format("%a, %b %-d").to_string(),
            icon_url: format!("{ICON_BASE_URL}/{}.png", day.condition.icon),
            icon_alt: day.condition.description.clone(),
            temperature: format_temperature(day.temperature, units),
        })
        .collect()
}

pub fn render_hourly(forecast: &ForecastList, units: Units, today: NaiveDate) -> Vec<HourlyCard> {
    forecast
        .hourly(today)
        .map(|hour| HourlyCard {
            time: clock_label(hour.timestamp),
            icon: catalog::icon_for(&hour.condition.main).to_string(),
            temperature: format_temperature(hour.temperature, units),
            mood: catalog::mood_message(&hour.condition.main).to_string(),
        })
        .collect()
}

pub fn render_dashboard(
    snapshot: &WeatherSnapshot,
    forecast: &ForecastList,
    units: Units,
    today: NaiveDate,
) -> Dashboard {
    Dashboard {
        current: render_current(snapshot, units),
        daily: render_daily(forecast, units),
        hourly: render_hourly(forecast, units, today),
    }
}

pub fn render_history(entries: &[String]) -> HistoryPanel {
    if entries.is_empty() {
        HistoryPanel::Placeholder(HISTORY_PLACEHOLDER)
    } else {
        HistoryPanel::Entries(entries.to_vec())
    }
}

/// "12AM", "3PM", ...
fn clock_label(ts: NaiveDateTime) -> String {
    let (pm, hour) = ts.hour12();
    format!("{}{}", hour, if pm { "PM" } else { "AM" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_temperature(15.3), 15);
        assert_eq!(round_temperature(15.5), 16);
        assert_eq!(round_temperature(-2.5), -2);
        assert_eq!(round_temperature(-2.6), -3);
    }

    #[test]
    fn london_rain_panel() {
        let panel = render_current(&snapshot("London", 15.3, "Rain"), Units::Metric);

        assert_eq!(panel.heading, "London, GB");
        assert_eq!(panel.temperature, "15°C");
        assert_eq!(panel.feels_like, "Feels Like: 14°C");
        assert_eq!(panel.wind, "💨 Wind: 3.6 m/s");
        assert_eq!(panel.humidity, "💧 Humidity: 81%");
        assert_eq!(panel.condition, "Condition: rain");
        assert_eq!(panel.advice, "🌧 Don't forget your umbrella!");
        assert_eq!(panel.icon_url, "https://openweathermap.org/img/wn/10d@4x.png");
    }

    #[test]
    fn imperial_panel_uses_imperial_labels() {
        let panel = render_current(&snapshot("Boston", 59.9, "Volcano"), Units::Imperial);
        assert_eq!(panel.temperature, "60°F");
        assert!(panel.wind.ends_with(" mph"));
        assert_eq!(panel.advice, "🌍 Have a great day!");
    }

    #[test]
    fn daily_cards_one_per_day() {
        let first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let cards = render_daily(&five_day_list(first, 5), Units::Metric);

        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].date, "Wed, May 1");
        assert_eq!(cards[1].date, "Thu, May 2");
        // noon is slot 4 of day 0
        assert_eq!(cards[0].temperature, "4°C");
        assert_eq!(cards[0].icon_url, "https://openweathermap.org/img/wn/10d.png");
    }

    #[test]
    fn hourly_cards_for_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let list = ForecastList::new(vec![
            entry("2024-05-01 00:00:00", 8.4, "Clear"),
            entry("2024-05-01 12:00:00", 15.6, "Rain"),
            entry("2024-05-01 21:00:00", 10.0, "Mist"),
            entry("2024-05-02 00:00:00", 7.0, "Clear"),
        ]);

        let cards = render_hourly(&list, Units::Metric, today);
        assert_eq!(cards.len(), 3);

        assert_eq!(cards[0].time, "12AM");
        assert_eq!(cards[0].icon, "sun");
        assert_eq!(cards[0].mood, "☀ Bright and sunny!");

        assert_eq!(cards[1].time, "12PM");
        assert_eq!(cards[1].temperature, "16°C");
        assert_eq!(cards[1].mood, "☔ Stay dry!");

        assert_eq!(cards[2].time, "9PM");
        assert_eq!(cards[2].icon, "cloud-fog");
        assert_eq!(cards[2].mood, "🌍 Have a pleasant hour!");
    }

    #[test]
    fn history_panel_placeholder_when_empty() {
        assert_eq!(render_history(&[]), HistoryPanel::Placeholder(HISTORY_PLACEHOLDER));
        assert_eq!(
            render_history(&["Oslo".to_string()]),
            HistoryPanel::Entries(vec!["Oslo".to_string()])
        );
    }
}
