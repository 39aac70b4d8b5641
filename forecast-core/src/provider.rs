use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, LocationSuggestion, WeatherSnapshot},
    provider::{geolocation::FixedLocation, mock::MockProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod geolocation;
pub mod mock;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Mock,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Mock => "mock",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Mock, ProviderId::WeatherApi]
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, ProviderId::WeatherApi)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "mock" => Ok(ProviderId::Mock),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: mock, weatherapi."
            )),
        }
    }
}

/// Source of complete weather snapshots.
///
/// `query` is either a place name or a `"lat,lon"` pair. A successful
/// result holds exactly five ascending forecast days; every failure is
/// reported as [`WeatherError::DataUnavailable`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, query: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// Source of location candidates for a partially typed query.
///
/// An empty list is a normal answer, not an error.
#[async_trait]
pub trait SuggestionProvider: Send + Sync + Debug {
    async fn fetch_suggestions(
        &self,
        partial: &str,
    ) -> Result<Vec<LocationSuggestion>, WeatherError>;
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinates, WeatherError>;
}

/// The collaborators a coordinator needs, built from one provider choice.
#[derive(Debug, Clone)]
pub struct Providers {
    pub id: ProviderId,
    pub weather: Arc<dyn WeatherProvider>,
    pub suggestions: Arc<dyn SuggestionProvider>,
    pub geolocation: Arc<dyn GeolocationProvider>,
}

/// Construct providers from config and explicit ProviderId.
pub fn provider_from_config(id: ProviderId, config: &Config) -> anyhow::Result<Providers> {
    let geolocation: Arc<dyn GeolocationProvider> = Arc::new(FixedLocation::new(config.home));

    let providers = match id {
        ProviderId::Mock => {
            let mock =
                Arc::new(MockProvider::new(Duration::from_millis(config.mock_latency_ms)));
            Providers { id, weather: mock.clone(), suggestions: mock, geolocation }
        }
        ProviderId::WeatherApi => {
            let provider_cfg = config.provider_config(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                         Hint: run `forecast configure {id}` and enter your API key."
                )
            })?;

            let api = Arc::new(match provider_cfg.base_url.as_deref() {
                Some(base_url) => {
                    WeatherApiProvider::with_base_url(provider_cfg.api_key.clone(), base_url)?
                }
                None => WeatherApiProvider::new(provider_cfg.api_key.clone())?,
            });
            Providers { id, weather: api.clone(), suggestions: api, geolocation }
        }
    };

    tracing::debug!(provider = %id, "providers constructed");
    Ok(providers)
}

/// Construct the default providers from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Providers> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}
