//! Thin proxy in front of the OpenWeatherMap API.
//!
//! Serves `/weather` and `/forecast`, attaching the secret API key held by
//! the server so clients never see it.

pub mod relay;
pub mod routes;
pub mod settings;

pub use relay::{ProxyReply, Relay};
pub use settings::Settings;
