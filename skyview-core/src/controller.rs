//! Maps user input to orchestrator calls.

use tracing::debug;

use crate::{
    client::WeatherSource,
    error::{Result, WeatherError},
    history::KeyValueStore,
    location::Geolocator,
    model::Units,
    orchestrator::{Orchestrator, SearchOutcome, View},
    render::HistoryPanel,
};

pub const LOCATING: &str = "Locating you...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the button that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Dark Mode",
            Theme::Dark => "☀️ Light Mode",
        }
    }
}

pub fn unit_toggle_label(units: Units) -> &'static str {
    match units {
        Units::Metric => "Switch to °F",
        Units::Imperial => "Switch to °C",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Search,
    UseLocation,
    ToggleUnits,
    ToggleTheme,
    SelectHistory,
}

/// An input binding: a key on the front-end and the action it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: char,
    pub action: Action,
    pub description: &'static str,
}

pub const BINDINGS: &[Binding] = &[
    Binding {
        key: 's',
        action: Action::Search,
        description: "Search a city",
    },
    Binding {
        key: 'l',
        action: Action::UseLocation,
        description: "Use my location",
    },
    Binding {
        key: 'u',
        action: Action::ToggleUnits,
        description: "Toggle °C / °F",
    },
    Binding {
        key: 't',
        action: Action::ToggleTheme,
        description: "Toggle dark mode",
    },
    Binding {
        key: 'h',
        action: Action::SelectHistory,
        description: "Pick a recent search",
    },
];

pub fn binding_for_key(key: char) -> Option<&'static Binding> {
    let key = key.to_ascii_lowercase();
    BINDINGS.iter().find(|b| b.key == key)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Search(String),
    UseLocation,
    ToggleUnits,
    ToggleTheme,
    SelectHistory(String),
}

impl Event {
    pub fn action(&self) -> Action {
        match self {
            Event::Search(_) => Action::Search,
            Event::UseLocation => Action::UseLocation,
            Event::ToggleUnits => Action::ToggleUnits,
            Event::ToggleTheme => Action::ToggleTheme,
            Event::SelectHistory(_) => Action::SelectHistory,
        }
    }
}

/// Front-end state around the orchestrator: search field, theme and the
/// device location provider.
#[derive(Debug)]
pub struct Controller<S, K, G> {
    orchestrator: Orchestrator<S, K>,
    geolocator: G,
    theme: Theme,
    search_field: String,
}

impl<S: WeatherSource, K: KeyValueStore, G: Geolocator> Controller<S, K, G> {
    pub fn new(orchestrator: Orchestrator<S, K>, geolocator: G) -> Self {
        Self {
            orchestrator,
            geolocator,
            theme: Theme::default(),
            search_field: String::new(),
        }
    }

    pub fn view(&self) -> &View {
        self.orchestrator.view()
    }

    pub fn orchestrator(&self) -> &Orchestrator<S, K> {
        &self.orchestrator
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn units(&self) -> Units {
        self.orchestrator.units()
    }

    /// Set the starting units without refetching anything.
    pub fn set_units(&mut self, units: Units) {
        self.orchestrator.set_units(units);
    }

    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    pub fn set_search_field(&mut self, value: impl Into<String>) {
        self.search_field = value.into();
    }

    pub fn history_panel(&self) -> HistoryPanel {
        self.orchestrator.history_panel()
    }

    pub async fn dispatch(&mut self, event: Event) -> Result<()> {
        debug!("Dispatching {:?}", event.action());

        match event {
            Event::Search(input) => {
                self.search_field = input;
                let input = self.search_field.clone();
                self.search(&input).await
            }
            Event::UseLocation => self.use_location().await,
            Event::ToggleUnits => self.toggle_units().await,
            Event::ToggleTheme => {
                self.theme = self.theme.toggled();
                Ok(())
            }
            Event::SelectHistory(city) => {
                self.search_field = city.clone();
                self.search(&city).await
            }
        }
    }

    async fn search(&mut self, input: &str) -> Result<()> {
        self.orchestrator.search_by_city(input).await.map(|_| ())
    }

    async fn use_location(&mut self) -> Result<()> {
        self.orchestrator.notify(LOCATING);

        let at = match self.geolocator.locate().await {
            Ok(at) => at,
            Err(err) => {
                let err = WeatherError::from(err);
                self.orchestrator.fail(&err);
                return Err(err);
            }
        };

        if let SearchOutcome::Loaded(city) =
            self.orchestrator.search_by_coordinates(at.lat, at.lon).await?
        {
            self.search_field = city;
        }
        Ok(())
    }

    /// Units change the request itself, so a loaded city is fetched again.
    async fn toggle_units(&mut self) -> Result<()> {
        let units = self.orchestrator.units().toggled();
        self.orchestrator.set_units(units);

        match self.orchestrator.last_city().map(str::to_owned) {
            Some(city) => self.search(&city).await,
            None => Ok(()),
        }
    }
}
