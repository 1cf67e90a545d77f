use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};

use skyview_core::{
    Config, Controller, Coordinates, Event, FileStore, FixedLocation, HistoryStore, Orchestrator,
    ProxyClient, Units, WeatherError,
};

use crate::{
    interactive,
    paint::{self, Chrome},
};

pub type DashboardController = Controller<ProxyClient, FileStore, FixedLocation>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather and forecast for a city.
    Show {
        /// City name.
        city: String,

        /// Use °F and mph instead of °C and m/s.
        #[arg(long)]
        imperial: bool,
    },

    /// Show weather for a position (defaults to the configured home location).
    Locate {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long)]
        imperial: bool,
    },

    /// List recent searches.
    History,

    /// Set the proxy URL, history size and home location.
    Configure,

    /// Menu-driven dashboard (the default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive) {
            Command::Show { city, imperial } => {
                let mut ctl = build_controller(&config, None)?;
                ctl.set_units(units_for(imperial));
                ctl.dispatch(Event::Search(city))
                    .await
                    .map_err(into_report)?;
                print_view(&ctl);
            }
            Command::Locate { lat, lon, imperial } => {
                let at = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
                let mut ctl = build_controller(&config, at)?;
                ctl.set_units(units_for(imperial));
                ctl.dispatch(Event::UseLocation)
                    .await
                    .map_err(into_report)?;
                print_view(&ctl);
            }
            Command::History => {
                let ctl = build_controller(&config, None)?;
                print!("{}", paint::HistoryList(&ctl.history_panel()));
            }
            Command::Configure => configure(config)?,
            Command::Interactive => {
                let ctl = build_controller(&config, None)?;
                interactive::run(ctl).await?;
            }
        }

        Ok(())
    }
}

fn units_for(imperial: bool) -> Units {
    if imperial { Units::Imperial } else { Units::Metric }
}

fn into_report(err: WeatherError) -> anyhow::Error {
    anyhow!(err.user_message())
}

pub fn build_controller(
    config: &Config,
    location: Option<Coordinates>,
) -> anyhow::Result<DashboardController> {
    let store = FileStore::new(Config::data_dir()?);
    let history = HistoryStore::with_cap(store, config.max_history);
    let orchestrator = Orchestrator::new(ProxyClient::new(&config.proxy_url), history);
    let geolocator = FixedLocation(location.or(config.home_location));

    Ok(Controller::new(orchestrator, geolocator))
}

pub fn print_view(ctl: &DashboardController) {
    let history = ctl.history_panel();
    let chrome = Chrome {
        theme: ctl.theme(),
        units: ctl.units(),
        history: &history,
    };
    print!("{}", paint::paint(ctl.view(), &chrome));
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.proxy_url = Text::new("Proxy URL:")
        .with_default(&config.proxy_url)
        .prompt()
        .context("Failed to read proxy URL")?;

    config.max_history = CustomType::<usize>::new("How many recent searches to keep:")
        .with_default(config.max_history)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read history size")?;

    let set_home = Confirm::new("Set a home location for \"use my location\"?")
        .with_default(config.home_location.is_some())
        .prompt()
        .context("Failed to read answer")?;

    config.home_location = if set_home {
        let current = config.home_location.unwrap_or(Coordinates { lat: 0.0, lon: 0.0 });
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(current.lat)
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_default(current.lon)
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinates { lat, lon })
    } else {
        None
    };

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["skyview"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn locate_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["skyview", "locate", "--lat", "1.0"]).is_err());

        let cli =
            Cli::try_parse_from(["skyview", "locate", "--lat", "-33.9", "--lon", "151.2"]).unwrap();
        match cli.command {
            Some(Command::Locate { lat, lon, imperial }) => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(151.2));
                assert!(!imperial);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_takes_city_and_units() {
        let cli = Cli::try_parse_from(["skyview", "show", "New York", "--imperial"]).unwrap();
        match cli.command {
            Some(Command::Show { city, imperial }) => {
                assert_eq!(city, "New York");
                assert!(imperial);
                assert_eq!(units_for(imperial), Units::Imperial);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
