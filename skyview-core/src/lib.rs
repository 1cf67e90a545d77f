//! Core library for the SkyView weather dashboard.
//!
//! This crate defines:
//! - The condition catalog and the pure display model
//! - The persisted search history
//! - A client for the weather proxy endpoints
//! - Search orchestration and the input controller
//!
//! It is used by `skyview-cli`, but any front-end able to paint a [`View`]
//! can drive it.

pub mod catalog;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod render;

pub use client::{ProxyClient, WeatherSource};
pub use config::Config;
pub use controller::{Controller, Event, Theme};
pub use error::{GeolocationError, StorageError, WeatherError};
pub use history::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
pub use location::{FixedLocation, Geolocator};
pub use model::{Coordinates, ForecastEntry, ForecastList, Units, WeatherReport, WeatherSnapshot};
pub use orchestrator::{Orchestrator, Page, SearchOutcome, View};
pub use render::{Dashboard, HistoryPanel};
