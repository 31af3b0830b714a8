use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::{Unit, WeatherQuery, WeatherReading};

use super::{FetchError, WeatherProvider};

/// OpenWeather current-conditions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const GENERIC_FAILURE: &str = "unable to fetch weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(
        &self,
        query: &WeatherQuery,
        unit: Unit,
    ) -> Result<WeatherReading, FetchError> {
        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::City(name) => vec![("q", name.clone())],
            WeatherQuery::Coords { latitude, longitude } => {
                vec![("lat", latitude.to_string()), ("lon", longitude.to_string())]
            }
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", unit.as_str().to_string()));

        debug!(%query, %unit, "requesting current conditions");

        let res = self.http.get(&self.base_url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status,
                message: api_error_message(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_reading())
    }
}

/// Error bodies look like `{"cod":"404","message":"city not found"}`.
/// Anything else falls back to the generic failure text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
}

impl OwCurrentResponse {
    fn into_reading(self) -> WeatherReading {
        let (description, icon) = match self.weather.into_iter().next() {
            Some(w) => (Some(w.description), w.icon),
            None => (None, None),
        };

        WeatherReading {
            city: self.name,
            country: self.sys.country.unwrap_or_default(),
            description,
            icon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            cloud_cover: self.clouds.all,
            pressure: self.main.pressure,
            observed_at: DateTime::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now),
        }
    }
}
