use crate::model::{Unit, WeatherQuery, WeatherReading};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Failure of a single weather lookup.
///
/// Each lookup is attempted exactly once; none of these variants is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with a non-2xx status. `message` is the
    /// provider's own error text when it sent one, otherwise a generic
    /// "unable to fetch weather".
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Transport-level failure: no connectivity, DNS, timeout.
    #[error("unable to fetch weather: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx reply whose body did not decode as a weather reading.
    #[error("unable to fetch weather: malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A source of current weather conditions.
///
/// The one real implementation is [`openweather::OpenWeatherProvider`];
/// tests substitute stubs through this seam.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `query`, with figures in `unit`.
    async fn current(
        &self,
        query: &WeatherQuery,
        unit: Unit,
    ) -> Result<WeatherReading, FetchError>;
}
