use thiserror::Error;

/// Errors surfaced by the dashboard core.
///
/// Every variant ends up as a single line in the error area of the home page,
/// see [`WeatherError::user_message`].
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from weather service: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WeatherError {
    /// User-friendly error message for the error area.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("⚠️ Configuration problem: {msg}"),
            Self::NotFound { message } | Self::Upstream { message, .. } => message.clone(),
            Self::Network(_) => {
                "Unable to reach the weather service. Check your connection.".to_string()
            }
            Self::InvalidResponse(_) => {
                "The weather service returned data we could not read.".to_string()
            }
            Self::Validation(msg) => msg.clone(),
            Self::Geolocation(err) => err.to_string(),
            Self::Storage(_) => "Could not save your search history.".to_string(),
        }
    }

    /// HTTP status relayed by the proxy, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Upstream { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Why the device location could not be determined.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("⚠️ Geolocation is not supported on this device.")]
    Unsupported,

    #[error("⚠️ Geolocation failed. Please type a city name.")]
    Denied,
}

/// Failures of the key-value storage behind the search history.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, WeatherError>;
