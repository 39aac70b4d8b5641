//! Offline provider that synthesizes plausible weather.
//!
//! Output is a pure function of the normalized query and the start date, so
//! repeated lookups for the same place agree with each other. The seed comes
//! from `DefaultHasher`, whose output may change between Rust releases, so
//! generated values are only stable within one build.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};

use crate::{
    error::WeatherError,
    model::{
        AstroInfo, Condition, Coordinates, CurrentConditions, DaySummary, FORECAST_DAYS,
        Forecast, ForecastDay, Location, LocationQuery, LocationSuggestion, WeatherSnapshot,
    },
    units::{celsius_to_fahrenheit, km_to_miles, kph_to_mph, mb_to_inhg, mm_to_inches, round_to},
};

use super::{SuggestionProvider, WeatherProvider};

/// Simulated network latency, long enough for a loading state to show.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

/// How close (in degrees) a coordinate query must be to snap to a known city.
const SNAP_DEGREES: f64 = 1.0;

const CONDITIONS: [(&str, i32, &str); 5] = [
    ("Sunny", 1000, "//cdn.weatherapi.com/weather/64x64/day/113.png"),
    ("Partly cloudy", 1003, "//cdn.weatherapi.com/weather/64x64/day/116.png"),
    ("Cloudy", 1006, "//cdn.weatherapi.com/weather/64x64/day/119.png"),
    ("Light rain", 1183, "//cdn.weatherapi.com/weather/64x64/day/296.png"),
    ("Overcast", 1009, "//cdn.weatherapi.com/weather/64x64/day/122.png"),
];

const WIND_DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "WSW"];

/// The fixed set of places the mock knows about.
pub fn catalog() -> Vec<LocationSuggestion> {
    let entry = |id, name: &str, region: &str, country: &str, lat, lon, url: &str| {
        LocationSuggestion {
            id,
            name: name.to_string(),
            region: region.to_string(),
            country: country.to_string(),
            lat,
            lon,
            url: url.to_string(),
        }
    };

    vec![
        entry(1, "New York", "New York", "USA", 40.71, -74.01, "new-york-new-york-usa"),
        entry(2, "London", "City of London", "UK", 51.52, -0.11, "london-city-of-london-uk"),
        entry(3, "Tokyo", "Tokyo", "Japan", 35.69, 139.69, "tokyo-tokyo-japan"),
        entry(
            4,
            "Sydney",
            "New South Wales",
            "Australia",
            -33.87,
            151.21,
            "sydney-new-south-wales-australia",
        ),
        entry(5, "Paris", "Ile-de-France", "France", 48.87, 2.33, "paris-ile-de-france-france"),
    ]
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    latency: Duration,
    today: Option<NaiveDate>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl MockProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency, today: None }
    }

    /// Pin the first forecast date instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn generate(&self, raw_query: &str) -> Result<WeatherSnapshot, WeatherError> {
        let query = LocationQuery::parse(raw_query)?;
        let now = Local::now();
        let today = self.today.unwrap_or_else(|| now.date_naive());

        let mut location = resolve(&query);
        location.localtime = format!("{} {}", today.format("%Y-%m-%d"), now.format("%H:%M"));

        let mut rng = SplitMix::seeded(&location.name.to_lowercase());
        let offset = rng.below(CONDITIONS.len() as u64) as usize;

        let mut forecastday = Vec::with_capacity(FORECAST_DAYS);
        for i in 0..FORECAST_DAYS {
            let date = today.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                WeatherError::data_unavailable(raw_query, "forecast date out of range")
            })?;
            let sky = condition((i + offset) % CONDITIONS.len());
            forecastday.push(forecast_day(date, sky, &mut rng));
        }

        let current = current_conditions(&forecastday[0].day, &mut rng);

        Ok(WeatherSnapshot { location, current, forecast: Forecast { forecastday } })
    }
}

fn resolve(query: &LocationQuery) -> Location {
    let known = catalog();

    let (hit, fallback) = match query {
        LocationQuery::Place(name) => {
            let hit = known.into_iter().find(|entry| entry.name.eq_ignore_ascii_case(name));
            (hit, unlisted(name.clone(), Coordinates::new(0.0, 0.0)))
        }
        LocationQuery::Coordinates(coords) => {
            let hit = known.into_iter().find(|entry| {
                (entry.lat - coords.lat).abs() <= SNAP_DEGREES
                    && (entry.lon - coords.lon).abs() <= SNAP_DEGREES
            });
            let name = format!("{:.2}, {:.2}", coords.lat, coords.lon);
            (hit, unlisted(name, *coords))
        }
    };

    match hit {
        Some(entry) => Location {
            name: entry.name,
            region: entry.region,
            country: entry.country,
            lat: entry.lat,
            lon: entry.lon,
            localtime: String::new(),
        },
        None => fallback,
    }
}

fn unlisted(name: String, coords: Coordinates) -> Location {
    Location {
        name,
        region: String::new(),
        country: String::new(),
        lat: coords.lat,
        lon: coords.lon,
        localtime: String::new(),
    }
}

fn condition(index: usize) -> Condition {
    let (text, code, icon) = CONDITIONS[index];
    Condition { text: text.to_string(), icon: icon.to_string(), code }
}

fn fahrenheit(celsius: f64) -> f64 {
    round_to(celsius_to_fahrenheit(celsius), 1)
}

fn forecast_day(date: NaiveDate, condition: Condition, rng: &mut SplitMix) -> ForecastDay {
    let maxtemp_c = 20.0 + rng.below(15) as f64;
    let mintemp_c = 10.0 + rng.below(10) as f64;
    let avgtemp_c = round_to((maxtemp_c + mintemp_c) / 2.0, 1);
    let maxwind_kph = 8.0 + rng.below(24) as f64;
    let totalprecip_mm = rng.below(10) as f64;
    let avgvis_km = 10.0 + rng.below(10) as f64;

    let date_epoch =
        date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc().timestamp()).unwrap_or_default();

    ForecastDay {
        date: date.format("%Y-%m-%d").to_string(),
        date_epoch,
        day: DaySummary {
            maxtemp_c,
            maxtemp_f: fahrenheit(maxtemp_c),
            mintemp_c,
            mintemp_f: fahrenheit(mintemp_c),
            avgtemp_c,
            avgtemp_f: fahrenheit(avgtemp_c),
            maxwind_mph: round_to(kph_to_mph(maxwind_kph), 1),
            maxwind_kph,
            totalprecip_mm,
            totalprecip_in: round_to(mm_to_inches(totalprecip_mm), 2),
            avgvis_km,
            avgvis_miles: round_to(km_to_miles(avgvis_km), 1),
            avghumidity: 40 + rng.below(40) as u8,
            condition,
            uv: 3.0 + rng.below(5) as f64,
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

fn current_conditions(today: &DaySummary, rng: &mut SplitMix) -> CurrentConditions {
    let temp_c = today.avgtemp_c;
    let feelslike_c = temp_c + 2.0;
    let wind_kph = round_to(today.maxwind_kph * 0.65, 1);
    let pressure_mb = 1000.0 + rng.below(30) as f64;
    let precip_mm = round_to(today.totalprecip_mm / 4.0, 1);
    let vis_km = today.avgvis_km;

    CurrentConditions {
        temp_c,
        temp_f: fahrenheit(temp_c),
        condition: today.condition.clone(),
        wind_mph: round_to(kph_to_mph(wind_kph), 1),
        wind_kph,
        wind_dir: WIND_DIRECTIONS[rng.below(WIND_DIRECTIONS.len() as u64) as usize].to_string(),
        pressure_mb,
        pressure_in: round_to(mb_to_inhg(pressure_mb), 2),
        precip_mm,
        precip_in: round_to(mm_to_inches(precip_mm), 2),
        humidity: today.avghumidity,
        cloud: rng.below(101) as u8,
        feelslike_c,
        feelslike_f: fahrenheit(feelslike_c),
        uv: today.uv,
        vis_km,
        vis_miles: round_to(km_to_miles(vis_km), 1),
    }
}

/// Small deterministic generator (splitmix64) seeded from a string.
struct SplitMix(u64);

impl SplitMix {
    fn seeded(seed: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        Self(hasher.finish())
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

#[async_trait]
impl WeatherProvider for MockProvider {
    async fn fetch_weather(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        tracing::debug!(query, latency_ms = self.latency.as_millis() as u64, "mock weather fetch");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.generate(query)
    }
}

#[async_trait]
impl SuggestionProvider for MockProvider {
    async fn fetch_suggestions(
        &self,
        partial: &str,
    ) -> Result<Vec<LocationSuggestion>, WeatherError> {
        Ok(catalog().into_iter().filter(|entry| entry.matches(partial)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Theme, classify_theme};

    #[test]
    fn generator_repeats_for_the_same_seed() {
        let mut a = SplitMix::seeded("london");
        let mut b = SplitMix::seeded("london");
        let mut other = SplitMix::seeded("paris");

        let first: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let second: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        let third: Vec<u64> = (0..4).map(|_| other.next_u64()).collect();

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert!((0..100).all(|_| a.below(7) < 7));
    }

    fn provider() -> MockProvider {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        MockProvider::new(Duration::ZERO).with_today(today)
    }

    #[tokio::test]
    async fn snapshot_has_five_ascending_days_from_today() {
        let snapshot = provider().fetch_weather("London").await.unwrap();
        let days = snapshot.days();

        assert_eq!(days.len(), 5);
        assert_eq!(days[0].date, "2026-10-19");
        assert_eq!(days[4].date, "2026-10-23");
        assert!(days.windows(2).all(|pair| pair[0].date_epoch < pair[1].date_epoch));
    }

    #[tokio::test]
    async fn generated_snapshots_pass_validation() {
        let provider = provider();
        for query in ["London", "Paris", "Tokyo", "Springfield", "12.5,-70.0", "-33.9,151.2"] {
            let snapshot = provider.fetch_weather(query).await.unwrap();
            assert_eq!(snapshot.validate(), Ok(()), "invalid snapshot for {query}");
        }
    }

    #[tokio::test]
    async fn known_city_resolves_to_catalog_entry() {
        let snapshot = provider().fetch_weather("tokyo").await.unwrap();

        assert_eq!(snapshot.location.name, "Tokyo");
        assert_eq!(snapshot.location.country, "Japan");
        assert!(snapshot.location.localtime.starts_with("2026-10-19 "));
    }

    #[tokio::test]
    async fn coordinates_snap_to_nearby_city() {
        let snapshot = provider().fetch_weather("48.85,2.35").await.unwrap();
        assert_eq!(snapshot.location.name, "Paris");
    }

    #[tokio::test]
    async fn remote_coordinates_keep_their_position() {
        let snapshot = provider().fetch_weather("12.5,-70").await.unwrap();

        assert_eq!(snapshot.location.name, "12.50, -70.00");
        assert_eq!(snapshot.location.lat, 12.5);
        assert_eq!(snapshot.location.lon, -70.0);
    }

    #[tokio::test]
    async fn unknown_place_keeps_query_as_name() {
        let snapshot = provider().fetch_weather("  Springfield ").await.unwrap();
        assert_eq!(snapshot.location.name, "Springfield");
    }

    #[tokio::test]
    async fn same_query_is_deterministic() {
        let provider = provider();
        let first = provider.fetch_weather("Paris").await.unwrap();
        let second = provider.fetch_weather("PARIS").await.unwrap();

        assert_eq!(first.forecast, second.forecast);
        assert_eq!(first.current.temp_c, second.current.temp_c);
    }

    #[tokio::test]
    async fn current_condition_matches_today() {
        let snapshot = provider().fetch_weather("Sydney").await.unwrap();
        let today = snapshot.today().unwrap();

        assert_eq!(snapshot.current.condition, today.day.condition);
        assert_ne!(classify_theme(&today.day.condition.text), Theme::Snow);
    }

    #[tokio::test]
    async fn empty_query_is_data_unavailable() {
        let err = provider().fetch_weather("  ").await.unwrap_err();
        assert!(matches!(err, WeatherError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn suggestions_filter_by_name_or_country() {
        let provider = provider();

        let japan = provider.fetch_suggestions("jap").await.unwrap();
        assert!(!japan.is_empty());
        assert!(japan.iter().any(|s| s.country == "Japan"));

        let by_name = provider.fetch_suggestions("LON").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "London");

        let none = provider.fetch_suggestions("zzzznotaplace").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_simulated() {
        let provider = MockProvider::new(Duration::from_millis(1000));
        let started = tokio::time::Instant::now();

        provider.fetch_weather("London").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
