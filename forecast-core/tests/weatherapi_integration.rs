//! Integration tests for WeatherApiProvider using wiremock.

use forecast_core::{
    SuggestionProvider, WeatherError, WeatherProvider,
    provider::weatherapi::WeatherApiProvider,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn condition(text: &str, code: i64) -> Value {
    json!({ "text": text, "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png", "code": code })
}

fn forecast_day(date: &str, epoch: i64) -> Value {
    json!({
        "date": date,
        "date_epoch": epoch,
        "day": {
            "maxtemp_c": 25.0, "maxtemp_f": 77.0,
            "mintemp_c": 18.0, "mintemp_f": 64.4,
            "avgtemp_c": 21.5, "avgtemp_f": 70.7,
            "maxwind_mph": 12.5, "maxwind_kph": 20.2,
            "totalprecip_mm": 1.2, "totalprecip_in": 0.05,
            "avgvis_km": 10.0, "avgvis_miles": 6.0,
            "avghumidity": 71,
            "daily_chance_of_rain": 40,
            "condition": condition("Patchy rain nearby", 1063),
            "uv": 4.0
        },
        "astro": {
            "sunrise": "07:24 AM", "sunset": "05:48 PM",
            "moonrise": "02:10 PM", "moonset": "11:02 PM",
            "moon_phase": "Waxing Gibbous",
            "moon_illumination": 64,
            "is_moon_up": 0
        },
        "hour": [{
            "time_epoch": epoch,
            "time": format!("{date} 00:00"),
            "temp_c": 15.1, "temp_f": 59.2,
            "is_day": 0,
            "condition": condition("Clear ", 1000),
            "chance_of_rain": 0
        }]
    })
}

fn forecast_body(days: usize) -> Value {
    let dates = ["2026-10-19", "2026-10-20", "2026-10-21", "2026-10-22", "2026-10-23", "2026-10-24"];
    let forecastday: Vec<Value> = dates
        .iter()
        .take(days)
        .enumerate()
        .map(|(i, date)| forecast_day(date, 1_792_368_000 + i as i64 * 86_400))
        .collect();

    json!({
        "location": {
            "name": "London", "region": "City of London, Greater London",
            "country": "United Kingdom", "lat": 51.52, "lon": -0.11,
            "tz_id": "Europe/London", "localtime_epoch": 1_792_400_000_i64,
            "localtime": "2026-10-19 9:53"
        },
        "current": {
            "last_updated": "2026-10-19 09:45",
            "temp_c": 14.0, "temp_f": 57.2, "is_day": 1,
            "condition": condition("Partly cloudy", 1003),
            "wind_mph": 9.4, "wind_kph": 15.1, "wind_degree": 240, "wind_dir": "WSW",
            "pressure_mb": 1012.0, "pressure_in": 29.88,
            "precip_mm": 0.0, "precip_in": 0.0,
            "humidity": 77, "cloud": 50,
            "feelslike_c": 12.6, "feelslike_f": 54.7,
            "vis_km": 10.0, "vis_miles": 6.0,
            "uv": 2.0, "gust_mph": 13.2, "gust_kph": 21.3
        },
        "forecast": { "forecastday": forecastday }
    })
}

async fn provider_for(server: &MockServer) -> WeatherApiProvider {
    WeatherApiProvider::with_base_url("TEST_KEY".into(), &server.uri()).unwrap()
}

#[tokio::test]
async fn test_forecast_decodes_into_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("key", "TEST_KEY"))
        .and(query_param("q", "London"))
        .and(query_param("days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let snapshot = provider.fetch_weather(" London ").await.unwrap();

    assert_eq!(snapshot.location.name, "London");
    assert_eq!(snapshot.current.condition.text, "Partly cloudy");
    assert_eq!(snapshot.days().len(), 5);
    assert_eq!(snapshot.days()[0].astro.moon_illumination, "64");
    assert_eq!(snapshot.days()[0].hour.len(), 1);
    assert_eq!(snapshot.validate(), Ok(()));
}

#[tokio::test]
async fn test_extra_days_are_truncated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(6)))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let snapshot = provider.fetch_weather("London").await.unwrap();

    assert_eq!(snapshot.days().len(), 5);
    assert_eq!(snapshot.days()[4].date, "2026-10-23");
}

#[tokio::test]
async fn test_short_forecast_is_data_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(3)))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let err = provider.fetch_weather("London").await.unwrap_err();

    match err {
        WeatherError::DataUnavailable { query, reason } => {
            assert_eq!(query, "London");
            assert!(reason.contains("returned 3 forecast days"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_location_reports_api_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let err = provider.fetch_weather("Atlantis").await.unwrap_err();

    assert!(matches!(err, WeatherError::DataUnavailable { .. }));
    let msg = err.to_string();
    assert!(msg.contains("400"));
    assert!(msg.contains("No matching location found."));
}

#[tokio::test]
async fn test_malformed_body_is_data_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let err = provider.fetch_weather("London").await.unwrap_err();

    assert!(err.to_string().contains("Failed to parse WeatherAPI forecast.json JSON"));
}

#[tokio::test]
async fn test_coordinate_query_is_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "51.52,-0.11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let snapshot = provider.fetch_weather("51.52, -0.11").await.unwrap();

    assert_eq!(snapshot.location.lat, 51.52);
}

#[tokio::test]
async fn test_search_filters_by_name_or_country() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "jap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2801268, "name": "Tokyo", "region": "Tokyo", "country": "Japan",
              "lat": 35.69, "lon": 139.69, "url": "tokyo-tokyo-japan" },
            { "id": 2612730, "name": "Japaratinga", "region": "Alagoas", "country": "Brazil",
              "lat": -9.09, "lon": -35.26, "url": "japaratinga-alagoas-brazil" },
            { "id": 999, "name": "Jasper", "region": "Alberta", "country": "Canada",
              "lat": 52.88, "lon": -118.08, "url": "jasper-alberta-canada" }
        ])))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let found = provider.fetch_suggestions("jap").await.unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().any(|s| s.country == "Japan"));
    assert!(found.iter().all(|s| s.name != "Jasper"));
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let found = provider.fetch_suggestions("zzzznotaplace").await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn test_search_server_error_is_suggestion_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).await;
    let err = provider.fetch_suggestions("lond").await.unwrap_err();

    assert!(matches!(err, WeatherError::SuggestionFetchFailed(_)));
    assert!(err.to_string().contains("upstream unavailable"));
}
