//! Application state and the events that move it.
//!
//! Every weather fetch is tagged with a [`RequestId`] when it is issued.
//! Responses come back as [`Event::FetchResolved`] in whatever order the
//! network delivers them, and the [`OrderingPolicy`] decides which ones may
//! still change what is on screen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::WeatherError,
    model::{TemperatureUnit, WeatherSnapshot},
};

/// Monotonic tag of an issued weather fetch. The first request is 1.
pub type RequestId = u64;

/// Message shown for any failed weather fetch.
pub const FETCH_FAILED_MESSAGE: &str = "Unable to fetch weather data. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Once a request resolves, older ones can no longer change the view.
    /// A failure is ignored once a newer request has been issued.
    #[default]
    NewestRequest,
    /// Whichever response resolves last is shown.
    LastResolved,
}

/// A failed fetch as the user sees it, with the query a retry re-issues.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub query: String,
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FetchResolved {
        request: RequestId,
        query: String,
        result: Result<WeatherSnapshot, WeatherError>,
    },
    UnitSelected(TemperatureUnit),
    GeolocationFailed(String),
    NoticeDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The event was stale or unknown and left the state untouched.
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    snapshot: Option<WeatherSnapshot>,
    displayed: Option<RequestId>,
    issued: RequestId,
    in_flight: BTreeMap<RequestId, String>,
    error: Option<FetchFailure>,
    notice: Option<String>,
    unit: TemperatureUnit,
    last_query: Option<String>,
    policy: OrderingPolicy,
}

impl AppState {
    pub fn new(unit: TemperatureUnit, policy: OrderingPolicy) -> Self {
        Self { unit, policy, ..Self::default() }
    }

    /// Register a new fetch for `query` and return its id.
    ///
    /// Clears the error state: the new attempt supersedes the failed one.
    pub fn begin_fetch(&mut self, query: impl Into<String>) -> RequestId {
        let query = query.into();
        self.issued += 1;
        let request = self.issued;

        self.in_flight.insert(request, query.clone());
        self.last_query = Some(query);
        self.error = None;

        request
    }

    pub fn apply(&mut self, event: Event) -> Transition {
        match event {
            Event::FetchResolved { request, query, result } => {
                self.resolve(request, query, result)
            }
            Event::UnitSelected(unit) => {
                self.unit = unit;
                Transition::Applied
            }
            Event::GeolocationFailed(reason) => {
                self.notice = Some(reason);
                Transition::Applied
            }
            Event::NoticeDismissed => {
                self.notice = None;
                Transition::Applied
            }
        }
    }

    fn resolve(
        &mut self,
        request: RequestId,
        query: String,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Transition {
        if self.in_flight.remove(&request).is_none() {
            tracing::warn!(request, %query, "discarding response for unknown or superseded request");
            return Transition::Discarded;
        }

        match result {
            Ok(snapshot) => {
                tracing::info!(request, location = %snapshot.location.name, "snapshot applied");

                self.snapshot = Some(snapshot);
                self.displayed = Some(request);
                self.error = None;

                if self.policy == OrderingPolicy::NewestRequest {
                    self.in_flight.retain(|id, _| *id > request);
                }
                Transition::Applied
            }
            Err(err) => {
                if self.policy == OrderingPolicy::NewestRequest && request < self.issued {
                    tracing::warn!(request, %err, "ignoring failure of superseded request");
                    return Transition::Discarded;
                }

                tracing::warn!(request, %err, "weather fetch failed");
                if self.policy == OrderingPolicy::NewestRequest {
                    self.in_flight.retain(|id, _| *id > request);
                }
                self.error = Some(FetchFailure {
                    query,
                    message: FETCH_FAILED_MESSAGE.to_string(),
                    detail: err.to_string(),
                });
                Transition::Applied
            }
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    /// Id of the request whose snapshot is on display.
    pub fn displayed_request(&self) -> Option<RequestId> {
        self.displayed
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// The query a retry should re-issue: the failed one, else the last one.
    pub fn retry_query(&self) -> Option<&str> {
        self.error.as_ref().map(|failure| failure.query.as_str()).or(self.last_query.as_deref())
    }
}
