//! Session orchestration: wires lookups, rendering and preference updates.
//!
//! [`App`] owns an injected [`WeatherProvider`] and [`PreferenceStore`] and
//! exposes one method per user action. State moves *idle → loading →
//! (displaying | error)* and is re-entrant on every action; a
//! request-generation counter ensures a lookup that was superseded while in
//! flight is never applied over a newer one.

use anyhow::Result;
use tracing::warn;

use crate::model::{Unit, WeatherQuery, WeatherReading};
use crate::prefs::PreferenceStore;
use crate::provider::{FetchError, WeatherProvider};
use crate::render::{self, RenderModel};

/// Outcome of one lookup, as surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered(RenderModel),
    Failed(String),
    /// A newer lookup superseded this one before it finished.
    Stale,
}

pub struct App {
    provider: Box<dyn WeatherProvider>,
    prefs: Box<dyn PreferenceStore>,
    unit: Unit,
    card: Option<RenderModel>,
    error: Option<String>,
    /// City behind the current card; re-fetched when the unit changes.
    shown_city: Option<String>,
    generation: u64,
}

impl App {
    pub fn new(provider: Box<dyn WeatherProvider>, prefs: Box<dyn PreferenceStore>) -> Self {
        let unit = prefs.unit();
        Self {
            provider,
            prefs,
            unit,
            card: None,
            error: None,
            shown_city: None,
            generation: 0,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The currently displayed card, if any. Survives failed lookups.
    pub fn card(&self) -> Option<&RenderModel> {
        self.card.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn favorites(&self) -> Vec<String> {
        self.prefs.favorites()
    }

    pub fn prefs(&self) -> &dyn PreferenceStore {
        self.prefs.as_ref()
    }

    /// On session start, restore the last successfully displayed city.
    /// Returns `None` when there is nothing to restore.
    pub async fn startup(&mut self) -> Option<Outcome> {
        let last = self.prefs.last_city()?;
        Some(self.show(WeatherQuery::City(last)).await)
    }

    /// Text-search submit. Empty input fails without issuing a lookup.
    pub async fn search(&mut self, city: &str) -> Outcome {
        let city = city.trim();
        if city.is_empty() {
            return self.fail("Enter a city name to search.".to_string());
        }
        self.show(WeatherQuery::city(city)).await
    }

    /// Lookup by coordinates, e.g. from a GPS fix.
    pub async fn locate(&mut self, latitude: f64, longitude: f64) -> Outcome {
        self.show(WeatherQuery::Coords { latitude, longitude }).await
    }

    /// Favorite-item click: fetch the favorite at `index`.
    pub async fn open_favorite(&mut self, index: usize) -> Outcome {
        match self.prefs.favorites().get(index).cloned() {
            Some(city) => self.show(WeatherQuery::City(city)).await,
            None => self.fail(format!("No favorite at position {index}.")),
        }
    }

    /// Persist `name` as a favorite. Idempotent; blank input is ignored.
    /// Never validated against the API.
    pub fn add_favorite(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.prefs.add_favorite(name)
    }

    pub fn remove_favorite(&mut self, index: usize) -> Result<()> {
        self.prefs.remove_favorite(index)
    }

    /// Switch display units and persist the choice. If a city is currently
    /// displayed it is re-fetched so the figures reflect the new unit.
    pub async fn set_unit(&mut self, unit: Unit) -> Result<Option<Outcome>> {
        self.unit = unit;
        self.prefs.set_unit(unit)?;

        match self.shown_city.clone() {
            Some(city) => Ok(Some(self.show(WeatherQuery::City(city)).await)),
            None => Ok(None),
        }
    }

    /// Start a lookup: clears the previous error and returns the generation
    /// token the finished lookup must present to [`App::apply`].
    pub fn begin(&mut self) -> u64 {
        self.error = None;
        self.generation += 1;
        self.generation
    }

    /// Apply a finished lookup. Ignored (`Stale`) when a newer lookup began
    /// after `generation` was issued.
    pub fn apply(
        &mut self,
        generation: u64,
        query: &WeatherQuery,
        result: Result<WeatherReading, FetchError>,
    ) -> Outcome {
        if generation != self.generation {
            return Outcome::Stale;
        }

        match result {
            Ok(reading) => {
                let model = render::render(&reading, self.unit);
                self.shown_city = Some(reading.city.clone());
                // Best-effort: a reading we cannot remember is still shown.
                if let Err(err) = self.prefs.set_last_city(&reading.city) {
                    warn!(%err, "failed to persist last city");
                }
                self.error = None;
                self.card = Some(model.clone());
                Outcome::Rendered(model)
            }
            Err(err) => {
                let message = match query {
                    WeatherQuery::Coords { .. } => {
                        "Unable to fetch weather for your location.".to_string()
                    }
                    WeatherQuery::City(_) => format!(
                        "City not found or API error: {err}. \
                         Check that your API key is valid and you have network access."
                    ),
                };
                self.fail(message)
            }
        }
    }

    async fn show(&mut self, query: WeatherQuery) -> Outcome {
        let generation = self.begin();
        let result = self.provider.current(&query, self.unit).await;
        self.apply(generation, &query, result)
    }

    fn fail(&mut self, message: String) -> Outcome {
        self.error = Some(message.clone());
        Outcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPrefs;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct StubState {
        responses: VecDeque<Result<WeatherReading, FetchError>>,
        calls: Vec<(WeatherQuery, Unit)>,
    }

    /// Scripted provider: hands out queued responses and records each call.
    #[derive(Debug, Clone, Default)]
    struct StubProvider(Arc<Mutex<StubState>>);

    impl StubProvider {
        fn push_ok(&self, reading: WeatherReading) {
            self.0.lock().unwrap().responses.push_back(Ok(reading));
        }

        fn push_err(&self, err: FetchError) {
            self.0.lock().unwrap().responses.push_back(Err(err));
        }

        fn calls(&self) -> Vec<(WeatherQuery, Unit)> {
            self.0.lock().unwrap().calls.clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current(
            &self,
            query: &WeatherQuery,
            unit: Unit,
        ) -> Result<WeatherReading, FetchError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push((query.clone(), unit));
            state
                .responses
                .pop_front()
                .unwrap_or_else(|| panic!("no stubbed response left for {query}"))
        }
    }

    fn reading(city: &str, temperature: f64) -> WeatherReading {
        WeatherReading {
            city: city.to_string(),
            country: "FR".to_string(),
            description: Some("clear sky".to_string()),
            icon: Some("01d".to_string()),
            temperature,
            feels_like: temperature - 1.0,
            humidity: 40,
            wind_speed: 3.0,
            cloud_cover: 0,
            pressure: 1020,
            observed_at: DateTime::from_timestamp(1_754_400_000, 0).expect("valid timestamp"),
        }
    }

    fn city_not_found() -> FetchError {
        FetchError::Api {
            status: reqwest::StatusCode::NOT_FOUND,
            message: "city not found".to_string(),
        }
    }

    fn app_with(provider: &StubProvider, prefs: MemoryPrefs) -> App {
        App::new(Box::new(provider.clone()), Box::new(prefs))
    }

    #[tokio::test]
    async fn search_renders_rounded_temperature_with_active_suffix() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 21.64));
        let mut app = app_with(&provider, MemoryPrefs::new());

        let outcome = app.search("Paris").await;

        let model = match outcome {
            Outcome::Rendered(model) => model,
            other => panic!("expected a rendered card, got {other:?}"),
        };
        assert_eq!(model.temperature, "22°C");
        assert_eq!(model.city_label, "Paris, FR");
        assert_eq!(app.card().map(|c| c.temperature.as_str()), Some("22°C"));
        assert_eq!(app.error(), None);
    }

    #[tokio::test]
    async fn successful_render_persists_last_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 20.0));
        let mut app = app_with(&provider, MemoryPrefs::new());

        app.search("paris").await;

        // The rendered city name, not the typed query, is remembered.
        assert_eq!(app.prefs().last_city().as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn failed_lookup_keeps_card_and_last_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 20.0));
        provider.push_err(city_not_found());
        let mut app = app_with(&provider, MemoryPrefs::new());

        app.search("Paris").await;
        let outcome = app.search("Nowhereville").await;

        let message = match outcome {
            Outcome::Failed(message) => message,
            other => panic!("expected failure, got {other:?}"),
        };
        assert!(message.contains("City not found or API error"));
        assert!(message.contains("city not found"));
        assert_eq!(app.error(), Some(message.as_str()));

        // Previous card and last city survive the failure.
        assert_eq!(app.card().map(|c| c.city_label.as_str()), Some("Paris, FR"));
        assert_eq!(app.prefs().last_city().as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn unit_toggle_refetches_displayed_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 21.6));
        provider.push_ok(reading("Paris", 71.1));
        let mut app = app_with(&provider, MemoryPrefs::new());

        app.search("Paris").await;
        let outcome = app.set_unit(Unit::Imperial).await.expect("persist unit");

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, WeatherQuery::city("Paris"));
        assert_eq!(calls[1].1, Unit::Imperial);

        let model = match outcome {
            Some(Outcome::Rendered(model)) => model,
            other => panic!("expected a re-rendered card, got {other:?}"),
        };
        assert_eq!(model.temperature, "71°F");
        assert_eq!(app.prefs().unit(), Unit::Imperial);
    }

    #[tokio::test]
    async fn unit_toggle_without_card_only_persists() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        let outcome = app.set_unit(Unit::Imperial).await.expect("persist unit");

        assert_eq!(outcome, None);
        assert!(provider.calls().is_empty());
        assert_eq!(app.unit(), Unit::Imperial);
    }

    #[tokio::test]
    async fn startup_restores_last_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 18.2));
        let mut app = app_with(&provider, MemoryPrefs::with_last_city("Paris"));

        let outcome = app.startup().await;

        assert!(matches!(outcome, Some(Outcome::Rendered(_))));
        assert_eq!(provider.calls()[0].0, WeatherQuery::city("Paris"));
        assert_eq!(app.card().map(|c| c.city_label.as_str()), Some("Paris, FR"));
    }

    #[tokio::test]
    async fn startup_without_last_city_is_a_noop() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        assert!(app.startup().await.is_none());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_search_fails_without_fetching() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        let outcome = app.search("   ").await;

        assert_eq!(
            outcome,
            Outcome::Failed("Enter a city name to search.".to_string())
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn locate_failure_uses_location_message() {
        let provider = StubProvider::default();
        provider.push_err(city_not_found());
        let mut app = app_with(&provider, MemoryPrefs::new());

        let outcome = app.locate(48.85, 2.35).await;

        assert_eq!(
            outcome,
            Outcome::Failed("Unable to fetch weather for your location.".to_string())
        );
    }

    #[tokio::test]
    async fn locate_success_persists_resolved_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 19.0));
        let mut app = app_with(&provider, MemoryPrefs::new());

        app.locate(48.85, 2.35).await;

        assert_eq!(app.prefs().last_city().as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn favorites_add_is_idempotent_and_ignores_blank() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        app.add_favorite("Paris").expect("add");
        app.add_favorite("Paris").expect("add again");
        app.add_favorite("  ").expect("blank ignored");

        assert_eq!(app.favorites(), vec!["Paris"]);
    }

    #[tokio::test]
    async fn open_favorite_fetches_that_city() {
        let provider = StubProvider::default();
        provider.push_ok(reading("Kyiv", 10.0));
        let mut app = app_with(&provider, MemoryPrefs::new());
        app.add_favorite("Kyiv").expect("add");

        let outcome = app.open_favorite(0).await;

        assert!(matches!(outcome, Outcome::Rendered(_)));
        assert_eq!(provider.calls()[0].0, WeatherQuery::city("Kyiv"));
    }

    #[tokio::test]
    async fn open_favorite_out_of_range_fails() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        let outcome = app.open_favorite(2).await;

        assert_eq!(outcome, Outcome::Failed("No favorite at position 2.".to_string()));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn superseded_lookup_is_not_applied() {
        let provider = StubProvider::default();
        let mut app = app_with(&provider, MemoryPrefs::new());

        let stale = app.begin();
        let _current = app.begin();

        let query = WeatherQuery::city("Paris");
        let outcome = app.apply(stale, &query, Ok(reading("Paris", 20.0)));

        assert_eq!(outcome, Outcome::Stale);
        assert!(app.card().is_none());
        assert_eq!(app.prefs().last_city(), None);
    }

    #[tokio::test]
    async fn unit_preference_is_read_once_at_startup() {
        let mut prefs = MemoryPrefs::new();
        prefs.set_unit(Unit::Imperial).expect("seed unit");
        let provider = StubProvider::default();
        provider.push_ok(reading("Paris", 70.0));
        let mut app = app_with(&provider, prefs);

        assert_eq!(app.unit(), Unit::Imperial);

        app.search("Paris").await;
        assert_eq!(provider.calls()[0].1, Unit::Imperial);
    }
}
