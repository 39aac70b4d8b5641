use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::WeatherError,
    model::{FORECAST_DAYS, LocationQuery, LocationSuggestion, WeatherSnapshot},
};

use super::{SuggestionProvider, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WeatherAPI.com client. Its forecast payload already has the snapshot's
/// shape, so responses decode straight into the model.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    async fn fetch_forecast(&self, query: &str) -> Result<WeatherSnapshot> {
        let days = FORECAST_DAYS.to_string();
        let mut snapshot: WeatherSnapshot = self
            .get_json(
                "forecast.json",
                &[("q", query), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            )
            .await?;

        let received = snapshot.forecast.forecastday.len();
        if received < FORECAST_DAYS {
            return Err(anyhow!(
                "WeatherAPI returned {received} forecast days, {FORECAST_DAYS} are required \
                 (the free plan is limited to 3)"
            ));
        }
        snapshot.forecast.forecastday.truncate(FORECAST_DAYS);

        snapshot.validate().context("WeatherAPI forecast failed validation")?;

        tracing::debug!(
            location = %snapshot.location.name,
            condition = %snapshot.current.condition.text,
            "WeatherAPI forecast decoded"
        );
        Ok(snapshot)
    }

    async fn search(&self, partial: &str) -> Result<Vec<LocationSuggestion>> {
        let found: Vec<LocationSuggestion> = self.get_json("search.json", &[("q", partial)]).await?;

        Ok(found.into_iter().filter(|entry| entry.matches(partial)).collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        tracing::debug!(%url, "WeatherAPI request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WaErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or_else(|_| truncate_body(&body));

            return Err(anyhow!(
                "WeatherAPI {endpoint} request failed with status {status}: {detail}"
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorDetail,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_weather(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        let normalized = match LocationQuery::parse(query)? {
            LocationQuery::Place(name) => name,
            LocationQuery::Coordinates(coords) => coords.to_query(),
        };

        self.fetch_forecast(&normalized)
            .await
            .map_err(|err| WeatherError::data_unavailable(query, format!("{err:#}")))
    }
}

#[async_trait]
impl SuggestionProvider for WeatherApiProvider {
    async fn fetch_suggestions(
        &self,
        partial: &str,
    ) -> Result<Vec<LocationSuggestion>, WeatherError> {
        self.search(partial.trim())
            .await
            .map_err(|err| WeatherError::SuggestionFetchFailed(format!("{err:#}")))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
