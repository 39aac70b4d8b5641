//! Top-level coordinator: owns the [`AppState`] and turns user actions into
//! provider calls.
//!
//! Issuing a fetch and applying its result are separate steps. A
//! [`PendingFetch`] carries everything needed to run the provider call, so a
//! caller may hold several at once and feed their outcomes back in any order.

use std::sync::Arc;

use crate::{
    Config,
    error::WeatherError,
    model::{TemperatureUnit, WeatherSnapshot},
    provider::{GeolocationProvider, WeatherProvider},
    state::{AppState, Event, OrderingPolicy, RequestId, Transition},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub default_query: String,
    pub unit: TemperatureUnit,
    pub ordering: OrderingPolicy,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_query: config.default_query.clone(),
            unit: config.unit,
            ordering: config.ordering,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// A fetch that has been registered with the state but not yet run.
#[derive(Debug)]
pub struct PendingFetch {
    request: RequestId,
    query: String,
    provider: Arc<dyn WeatherProvider>,
}

impl PendingFetch {
    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Run the provider call. Snapshots that break the model invariants are
    /// turned into [`WeatherError::DataUnavailable`].
    pub async fn resolve(self) -> FetchOutcome {
        let result = match self.provider.fetch_weather(&self.query).await {
            Ok(snapshot) => match snapshot.validate() {
                Ok(()) => Ok(snapshot),
                Err(invalid) => Err(WeatherError::data_unavailable(&self.query, invalid)),
            },
            Err(err) => Err(err),
        };

        FetchOutcome { request: self.request, query: self.query, result }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub request: RequestId,
    pub query: String,
    pub result: Result<WeatherSnapshot, WeatherError>,
}

impl From<FetchOutcome> for Event {
    fn from(outcome: FetchOutcome) -> Self {
        Event::FetchResolved { request: outcome.request, query: outcome.query, result: outcome.result }
    }
}

#[derive(Debug)]
pub struct WeatherApp {
    state: AppState,
    weather: Arc<dyn WeatherProvider>,
    geolocation: Arc<dyn GeolocationProvider>,
    default_query: String,
}

impl WeatherApp {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        geolocation: Arc<dyn GeolocationProvider>,
        settings: AppSettings,
    ) -> Self {
        Self {
            state: AppState::new(settings.unit, settings.ordering),
            weather,
            geolocation,
            default_query: settings.default_query,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fetch issued once at startup, before any user input.
    pub fn start(&mut self) -> PendingFetch {
        let query = self.default_query.clone();
        self.issue(query)
    }

    /// Submit a search. Blank input is ignored.
    pub fn search(&mut self, query: &str) -> Option<PendingFetch> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.issue(query.to_string()))
    }

    /// Re-issue the failed (or, lacking one, the last) query.
    pub fn retry(&mut self) -> Option<PendingFetch> {
        let query = self.state.retry_query()?.to_string();
        Some(self.issue(query))
    }

    /// Look up the current location and search for it as `"lat,lon"`.
    ///
    /// A refused lookup becomes a notice; the snapshot is left alone.
    pub async fn locate(&mut self) -> Option<PendingFetch> {
        match self.geolocation.current_location().await {
            Ok(coords) => Some(self.issue(coords.to_query())),
            Err(err) => {
                tracing::warn!(%err, "current location unavailable");
                let reason = match err {
                    WeatherError::GeolocationDenied(reason) => reason,
                    other => other.to_string(),
                };
                self.state.apply(Event::GeolocationFailed(reason));
                None
            }
        }
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.state.apply(Event::UnitSelected(unit));
    }

    pub fn toggle_unit(&mut self) {
        let unit = self.state.unit().toggle();
        self.set_unit(unit);
    }

    pub fn dismiss_notice(&mut self) {
        self.state.apply(Event::NoticeDismissed);
    }

    pub fn complete(&mut self, outcome: FetchOutcome) -> Transition {
        self.state.apply(outcome.into())
    }

    /// Resolve a single fetch and apply it.
    pub async fn run(&mut self, fetch: PendingFetch) -> Transition {
        let outcome = fetch.resolve().await;
        self.complete(outcome)
    }

    fn issue(&mut self, query: String) -> PendingFetch {
        let request = self.state.begin_fetch(query.clone());
        tracing::debug!(request, %query, "weather fetch issued");

        PendingFetch { request, query, provider: Arc::clone(&self.weather) }
    }
}
