//! Pure mapping from a weather reading to displayable text.
//!
//! Nothing here touches the terminal or the network; the CLI binds the
//! resulting [`RenderModel`] to its output at the outermost boundary.

use chrono::{DateTime, Utc};

use crate::model::{Unit, WeatherReading};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Everything the presentation layer needs to show one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    /// "Paris, FR", or the bare name when no country code was supplied.
    pub city_label: String,
    /// Condition text; empty when the reading carried none.
    pub description: String,
    /// Absent when the reading carried no icon code.
    pub icon_url: Option<String>,
    /// Whole degrees with suffix, e.g. "22°C".
    pub temperature: String,
    /// e.g. "Feels like 21°C".
    pub feels_like: String,
    /// e.g. "53%".
    pub humidity: String,
    /// e.g. "4.12 m/s".
    pub wind: String,
    /// e.g. "75%".
    pub cloud_cover: String,
    /// e.g. "1016 hPa".
    pub pressure: String,
    pub observed_at: DateTime<Utc>,
}

/// Resolve a provider icon code against the fixed image-URL template.
pub fn icon_url(code: &str) -> String {
    format!("{ICON_URL_BASE}/{code}@2x.png")
}

/// Format a reading for display under the given unit preference.
pub fn render(reading: &WeatherReading, unit: Unit) -> RenderModel {
    let suffix = unit.temp_suffix();

    let city_label = if reading.country.is_empty() {
        reading.city.clone()
    } else {
        format!("{}, {}", reading.city, reading.country)
    };

    let icon_url = reading
        .icon
        .as_deref()
        .filter(|code| !code.is_empty())
        .map(icon_url);

    RenderModel {
        city_label,
        description: reading.description.clone().unwrap_or_default(),
        icon_url,
        temperature: format!("{}{}", reading.temperature.round() as i64, suffix),
        feels_like: format!("Feels like {}{}", reading.feels_like.round() as i64, suffix),
        humidity: format!("{}%", reading.humidity),
        wind: format!("{} {}", reading.wind_speed, unit.wind_suffix()),
        cloud_cover: format!("{}%", reading.cloud_cover),
        pressure: format!("{} hPa", reading.pressure),
        observed_at: reading.observed_at,
    }
}
