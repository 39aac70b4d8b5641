use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{
    error::WeatherError,
    units::{celsius_to_fahrenheit, km_to_miles, kph_to_mph, mb_to_inhg, mm_to_inches, within},
};

/// Number of days every snapshot carries.
pub const FORECAST_DAYS: usize = 5;

/// Which half of the dual-unit temperature fields gets surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    /// Select between two pre-populated values. No conversion happens here.
    pub fn pick(self, celsius: f64, fahrenheit: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => fahrenheit,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Use 'celsius' (c) or 'fahrenheit' (f)."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Local time at the location, `YYYY-MM-DD HH:MM`.
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub pressure_in: f64,
    pub precip_mm: f64,
    pub precip_in: f64,
    pub humidity: u8,
    pub cloud: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub uv: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
}

/// Aggregated values for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub avgtemp_c: f64,
    pub avgtemp_f: f64,
    pub maxwind_mph: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    pub totalprecip_in: f64,
    pub avgvis_km: f64,
    pub avgvis_miles: f64,
    pub avghumidity: u8,
    pub condition: Condition,
    pub uv: f64,
}

impl DaySummary {
    pub fn max_temp(&self, unit: TemperatureUnit) -> f64 {
        unit.pick(self.maxtemp_c, self.maxtemp_f)
    }

    pub fn min_temp(&self, unit: TemperatureUnit) -> f64 {
        unit.pick(self.mintemp_c, self.mintemp_f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstroInfo {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    /// Percentage 0-100, string-encoded. Numbers are accepted on input.
    #[serde(deserialize_with = "string_or_number")]
    pub moon_illumination: String,
}

impl AstroInfo {
    pub fn moon_illumination_pct(&self) -> Option<u8> {
        self.moon_illumination.trim().parse::<u8>().ok().filter(|pct| *pct <= 100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    pub time_epoch: i64,
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    #[serde(default)]
    pub is_day: u8,
    #[serde(default)]
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub date_epoch: i64,
    pub day: DaySummary,
    pub astro: AstroInfo,
    #[serde(default)]
    pub hour: Vec<HourRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

/// One complete current + forecast data set for one location.
///
/// Always replaced as a whole; nothing in the crate mutates a snapshot
/// after a provider hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

/// Reasons a provider response cannot be used as a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("expected 5 forecast days, got {0}")]
    DayCount(usize),

    #[error("forecast day {index} is not after the previous day")]
    NotAscending { index: usize },

    #[error("{field} disagrees between metric and imperial values")]
    InconsistentUnits { field: String },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: String },
}

impl WeatherSnapshot {
    /// The first forecast day, i.e. today at the location.
    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.forecastday.first()
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }

    /// Check the invariants every provider must uphold.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let days = &self.forecast.forecastday;
        if days.len() != FORECAST_DAYS {
            return Err(SnapshotError::DayCount(days.len()));
        }

        for (index, pair) in days.windows(2).enumerate() {
            if pair[1].date_epoch <= pair[0].date_epoch {
                return Err(SnapshotError::NotAscending { index: index + 1 });
            }
        }

        check_current(&self.current)?;

        for (index, day) in days.iter().enumerate() {
            check_day(index, day)?;
        }

        Ok(())
    }
}

fn check_current(current: &CurrentConditions) -> Result<(), SnapshotError> {
    check_temperature("current.temp", current.temp_c, current.temp_f)?;
    check_temperature("current.feelslike", current.feelslike_c, current.feelslike_f)?;
    check_pair("current.wind", within(current.wind_mph, kph_to_mph(current.wind_kph), 1.0))?;
    check_pair(
        "current.pressure",
        within(current.pressure_in, mb_to_inhg(current.pressure_mb), 0.05),
    )?;
    check_pair(
        "current.precip",
        within(current.precip_in, mm_to_inches(current.precip_mm), 0.02),
    )?;
    check_pair("current.vis", within(current.vis_miles, km_to_miles(current.vis_km), 1.0))?;
    check_percent("current.humidity", current.humidity)?;
    check_percent("current.cloud", current.cloud)?;
    check_uv("current.uv", current.uv)
}

fn check_day(index: usize, day: &ForecastDay) -> Result<(), SnapshotError> {
    let summary = &day.day;
    let field = |name: &str| format!("forecastday[{index}].{name}");

    check_temperature(&field("maxtemp"), summary.maxtemp_c, summary.maxtemp_f)?;
    check_temperature(&field("mintemp"), summary.mintemp_c, summary.mintemp_f)?;
    check_temperature(&field("avgtemp"), summary.avgtemp_c, summary.avgtemp_f)?;
    check_pair(
        &field("maxwind"),
        within(summary.maxwind_mph, kph_to_mph(summary.maxwind_kph), 1.0),
    )?;
    check_pair(
        &field("totalprecip"),
        within(summary.totalprecip_in, mm_to_inches(summary.totalprecip_mm), 0.02),
    )?;
    check_pair(
        &field("avgvis"),
        within(summary.avgvis_miles, km_to_miles(summary.avgvis_km), 1.0),
    )?;
    check_percent(&field("avghumidity"), summary.avghumidity)?;
    check_uv(&field("uv"), summary.uv)?;

    if day.astro.moon_illumination_pct().is_none() {
        return Err(SnapshotError::OutOfRange {
            field: field("astro.moon_illumination"),
            value: day.astro.moon_illumination.clone(),
        });
    }

    Ok(())
}

fn check_temperature(field: &str, celsius: f64, fahrenheit: f64) -> Result<(), SnapshotError> {
    check_pair(field, within(fahrenheit, celsius_to_fahrenheit(celsius), 1.5))
}

fn check_pair(field: &str, consistent: bool) -> Result<(), SnapshotError> {
    if consistent {
        Ok(())
    } else {
        Err(SnapshotError::InconsistentUnits { field: field.to_string() })
    }
}

fn check_percent(field: &str, value: u8) -> Result<(), SnapshotError> {
    if value > 100 {
        return Err(SnapshotError::OutOfRange { field: field.to_string(), value: value.to_string() });
    }
    Ok(())
}

fn check_uv(field: &str, value: f64) -> Result<(), SnapshotError> {
    if value.is_nan() || value < 0.0 {
        return Err(SnapshotError::OutOfRange { field: field.to_string(), value: value.to_string() });
    }
    Ok(())
}

/// A candidate location offered while the user is typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    /// Unique within one result set only.
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
}

impl LocationSuggestion {
    /// Suggestion filter: `name` or `country` contains `partial`, ignoring case.
    pub fn matches(&self, partial: &str) -> bool {
        let needle = partial.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.country.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// The `"lat,lon"` query form providers accept.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// A location query in one of the two forms providers resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::data_unavailable(raw, "empty location query"));
        }

        if let Some((lat, lon)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                let coords = Coordinates::new(lat, lon);
                if !coords.is_valid() {
                    return Err(WeatherError::data_unavailable(
                        raw,
                        "coordinates out of range",
                    ));
                }
                return Ok(LocationQuery::Coordinates(coords));
            }
        }

        Ok(LocationQuery::Place(trimmed.to_string()))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(value) => value.to_string(),
        Raw::Float(value) => format!("{}", value.round() as i64),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn condition(text: &str) -> Condition {
        Condition {
            text: text.to_string(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/116.png".to_string(),
            code: 1003,
        }
    }

    pub fn current(text: &str) -> CurrentConditions {
        CurrentConditions {
            temp_c: 22.0,
            temp_f: 72.0,
            condition: condition(text),
            wind_mph: 8.1,
            wind_kph: 13.0,
            wind_dir: "WSW".to_string(),
            pressure_mb: 1013.0,
            pressure_in: 29.92,
            precip_mm: 0.0,
            precip_in: 0.0,
            humidity: 65,
            cloud: 25,
            feelslike_c: 24.0,
            feelslike_f: 75.0,
            uv: 6.0,
            vis_km: 16.0,
            vis_miles: 10.0,
        }
    }

    pub fn day(date: &str, epoch: i64) -> ForecastDay {
        ForecastDay {
            date: date.to_string(),
            date_epoch: epoch,
            day: DaySummary {
                maxtemp_c: 25.0,
                maxtemp_f: 77.0,
                mintemp_c: 18.0,
                mintemp_f: 64.4,
                avgtemp_c: 22.0,
                avgtemp_f: 71.6,
                maxwind_mph: 12.5,
                maxwind_kph: 20.2,
                totalprecip_mm: 0.0,
                totalprecip_in: 0.0,
                avgvis_km: 16.0,
                avgvis_miles: 10.0,
                avghumidity: 65,
                condition: condition("Partly cloudy"),
                uv: 6.0,
            },
            astro: AstroInfo {
                sunrise: "06:15 AM".to_string(),
                sunset: "07:45 PM".to_string(),
                moonrise: "10:30 PM".to_string(),
                moonset: "09:15 AM".to_string(),
                moon_phase: "Waxing Crescent".to_string(),
                moon_illumination: "25".to_string(),
            },
            hour: Vec::new(),
        }
    }

    pub fn snapshot(name: &str) -> WeatherSnapshot {
        let dates = ["2026-10-19", "2026-10-20", "2026-10-21", "2026-10-22", "2026-10-23"];
        WeatherSnapshot {
            location: Location {
                name: name.to_string(),
                region: name.to_string(),
                country: "Nowhere".to_string(),
                lat: 0.0,
                lon: 0.0,
                localtime: "2026-10-19 09:00".to_string(),
            },
            current: current("Partly cloudy"),
            forecast: Forecast {
                forecastday: dates
                    .iter()
                    .enumerate()
                    .map(|(i, date)| day(date, 1_792_368_000 + i as i64 * 86_400))
                    .collect(),
            },
        }
    }
}
