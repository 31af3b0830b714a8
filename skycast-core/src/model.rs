use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// What to look up: a city by name, or a point by coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coords { latitude: f64, longitude: f64 },
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>) -> Self {
        WeatherQuery::City(name.into())
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::City(name) => f.write_str(name),
            WeatherQuery::Coords { latitude, longitude } => {
                write!(f, "{latitude},{longitude}")
            }
        }
    }
}

/// Display unit system. OpenWeather accepts the lowercase name verbatim
/// as its `units` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    /// Suffix for temperature and feels-like figures.
    pub fn temp_suffix(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    /// Wind speed arrives in the unit system's source units.
    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [Unit] {
        &[Unit::Metric, Unit::Imperial]
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Unit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// One parsed weather snapshot for a location at fetch time.
///
/// Ephemeral: produced from a single API response and replaced on the next
/// fetch. Temperatures and wind speed are in the units the request asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    /// Two-letter country code; empty when the provider omitted it.
    pub country: String,
    /// Condition text, absent when the response carried no condition entry.
    pub description: Option<String>,
    /// Provider icon code, e.g. "04d".
    pub icon: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub cloud_cover: u8,
    pub pressure: u32,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_as_str_roundtrip() {
        for unit in Unit::all() {
            let parsed = Unit::try_from(unit.as_str()).expect("roundtrip should succeed");
            assert_eq!(*unit, parsed);
        }
    }

    #[test]
    fn unit_parse_is_case_insensitive() {
        assert_eq!(Unit::try_from("Imperial").unwrap(), Unit::Imperial);
        assert_eq!(Unit::try_from("METRIC").unwrap(), Unit::Metric);
    }

    #[test]
    fn unknown_unit_error() {
        let err = Unit::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn unit_defaults_to_metric() {
        assert_eq!(Unit::default(), Unit::Metric);
    }

    #[test]
    fn query_display() {
        assert_eq!(WeatherQuery::city("Paris").to_string(), "Paris");
        let coords = WeatherQuery::Coords { latitude: 48.85, longitude: 2.35 };
        assert_eq!(coords.to_string(), "48.85,2.35");
    }
}
