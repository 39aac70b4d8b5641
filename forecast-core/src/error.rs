use thiserror::Error;

/// Failures surfaced by providers and the application coordinator.
///
/// None of these are fatal: every variant is recoverable by the user
/// (retry, another query, or simply ignoring it).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// Weather fetch failed: network, timeout, unresolvable or malformed query,
    /// or a response that does not form a valid snapshot.
    #[error("Weather data unavailable for '{query}': {reason}")]
    DataUnavailable { query: String, reason: String },

    /// Location services are unsupported or permission was refused.
    #[error("Unable to get current location: {0}")]
    GeolocationDenied(String),

    /// Suggestion lookup failed. Callers degrade to an empty list.
    #[error("Location suggestions unavailable: {0}")]
    SuggestionFetchFailed(String),
}

impl WeatherError {
    pub fn data_unavailable(query: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable { query: query.into(), reason: reason.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_unavailable_message_names_query() {
        let err = WeatherError::data_unavailable("Atlantis", "No matching location found");
        let msg = err.to_string();

        assert!(msg.contains("'Atlantis'"));
        assert!(msg.contains("No matching location found"));
    }

    #[test]
    fn geolocation_message() {
        let err = WeatherError::GeolocationDenied("no home location configured".into());
        assert!(err.to_string().starts_with("Unable to get current location"));
    }
}
