use async_trait::async_trait;

use crate::{error::WeatherError, model::Coordinates};

use super::GeolocationProvider;

/// "Current location" for a terminal: the home coordinates stored in config.
///
/// Without a configured home the lookup behaves like a refused permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation {
    home: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, WeatherError> {
        match self.home {
            Some(coords) if coords.is_valid() => Ok(coords),
            Some(coords) => Err(WeatherError::GeolocationDenied(format!(
                "configured home location {} is out of range",
                coords.to_query()
            ))),
            None => Err(WeatherError::GeolocationDenied(
                "no home location configured.\n\
                 Hint: run `forecast configure home` first."
                    .to_string(),
            )),
        }
    }
}
