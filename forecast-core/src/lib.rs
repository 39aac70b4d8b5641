//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The weather snapshot model (location, current conditions, 5-day forecast)
//! - Abstractions over weather, suggestion and geolocation providers
//! - Pure presentation selection (theme, day/night, unit, date labels)
//! - Application state, request sequencing and debounced suggestions
//! - Configuration handling
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod state;
pub mod suggest;
pub mod theme;
pub mod units;

pub use app::{AppSettings, FetchOutcome, PendingFetch, WeatherApp};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::{
    Coordinates, ForecastDay, LocationQuery, LocationSuggestion, TemperatureUnit, WeatherSnapshot,
};
pub use provider::{
    GeolocationProvider, ProviderId, Providers, SuggestionProvider, WeatherProvider,
};
pub use state::{AppState, OrderingPolicy, RequestId, Transition};
pub use suggest::{SuggestionList, SuggestionSearch};
pub use theme::{Presentation, Theme, classify_theme, format_relative_date, is_night};
