//! Plain-text rendering of the application state.
//!
//! Every function returns the finished text; printing is left to the caller.

use chrono::{NaiveDateTime, Timelike};
use forecast_core::{
    AppState, LocationSuggestion, Presentation, TemperatureUnit, WeatherSnapshot,
    model::ForecastDay,
    suggest::MIN_QUERY_CHARS,
    theme::{card_gradient, classify_theme, format_relative_date, select_feels_like, select_temperature},
};

/// Whole degrees, never "-0".
fn degrees(value: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", value.round() as i64, unit.symbol())
}

fn place_line(snapshot: &WeatherSnapshot) -> String {
    let location = &snapshot.location;
    [location.name.as_str(), location.region.as_str(), location.country.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn stat(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {label:<12}{value}")
}

/// Full view: notice, error, current conditions and the forecast.
pub fn render_state(state: &AppState, now: NaiveDateTime) -> String {
    let mut out = String::new();

    if let Some(notice) = state.notice() {
        out.push_str(&format!("Note: {notice}\n\n"));
    }

    if let Some(failure) = state.error() {
        out.push_str(&format!(
            "! {}\n  {}\n  Type :r to retry \"{}\".\n\n",
            failure.message, failure.detail, failure.query
        ));
    }

    match state.snapshot() {
        Some(snapshot) => out.push_str(&render_snapshot(snapshot, state.unit(), now)),
        None if state.is_loading() => out.push_str("Loading weather...\n"),
        None => out.push_str("No weather data yet.\n"),
    }

    out
}

pub fn render_snapshot(snapshot: &WeatherSnapshot, unit: TemperatureUnit, now: NaiveDateTime) -> String {
    let current = &snapshot.current;
    let look = Presentation::for_snapshot(Some(snapshot), now.hour());
    let theme = look.theme.map(|theme| theme.as_str()).unwrap_or("none");

    let mut headline = format!(
        "  {}  {}",
        degrees(select_temperature(current, unit), unit),
        current.condition.text.trim()
    );
    if let Some(today) = snapshot.today() {
        headline.push_str(&format!(
            "  H: {}  L: {}",
            degrees(today.day.max_temp(unit), unit),
            degrees(today.day.min_temp(unit), unit)
        ));
    }

    let mut lines = vec![
        place_line(snapshot),
        format!("Local time: {}", snapshot.location.localtime),
        String::new(),
        headline,
        format!(
            "  theme: {theme} ({})  background: {}",
            if look.night { "night" } else { "day" },
            look.background.stops().join(" -> ")
        ),
        String::new(),
        stat("Feels like", degrees(select_feels_like(current, unit), unit)),
        stat("Wind", format!("{} km/h {}", current.wind_kph.round() as i64, current.wind_dir)),
        stat("Humidity", format!("{}%", current.humidity)),
        stat("Visibility", format!("{} km", current.vis_km.round() as i64)),
        stat("Pressure", format!("{} mb", current.pressure_mb.round() as i64)),
        stat("UV index", current.uv),
    ];

    if let Some(today) = snapshot.today() {
        let astro = &today.astro;
        lines.extend([
            String::new(),
            "Sun & Moon".to_string(),
            format!("  Sunrise   {:<10}  Sunset   {}", astro.sunrise, astro.sunset),
            format!("  Moonrise  {:<10}  Moonset  {}", astro.moonrise, astro.moonset),
            format!("  Moon      {} ({}% illuminated)", astro.moon_phase, astro.moon_illumination),
        ]);
    }

    lines.push(String::new());
    lines.push(format!("{}-Day Forecast", snapshot.days().len()));
    lines.extend(snapshot.days().iter().map(|day| format!("  {}", forecast_row(day, unit, now))));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn forecast_row(day: &ForecastDay, unit: TemperatureUnit, now: NaiveDateTime) -> String {
    let summary = &day.day;
    let theme = classify_theme(&summary.condition.text);

    let mut row = format!(
        "{:<13}{:>6} / {:<6}{:<24}{:>4}%  {:>3} km/h",
        format_relative_date(&day.date, now.date()),
        degrees(summary.max_temp(unit), unit),
        degrees(summary.min_temp(unit), unit),
        summary.condition.text.trim(),
        summary.avghumidity,
        summary.maxwind_kph.round() as i64,
    );
    if summary.totalprecip_mm > 0.0 {
        row.push_str(&format!("  {} mm", summary.totalprecip_mm));
    }
    row.push_str(&format!("  [{}: {}]", theme, card_gradient(theme).stops().join(" -> ")));

    row
}

/// One-line description of a suggestion, e.g. `Tokyo, Tokyo, Japan (35.69, 139.69)`.
pub fn suggestion_label(item: &LocationSuggestion) -> String {
    let region = if item.region.is_empty() { String::new() } else { format!(", {}", item.region) };
    format!("{}{}, {}  ({:.2}, {:.2})", item.name, region, item.country, item.lat, item.lon)
}

pub fn short_input_hint() -> String {
    format!("Type at least {MIN_QUERY_CHARS} characters to get suggestions.")
}

pub fn render_suggestions(items: &[LocationSuggestion]) -> String {
    if items.is_empty() {
        return "No matching locations.\n".to_string();
    }

    items.iter().map(|item| format!("  {}\n", suggestion_label(item))).collect()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chrono::NaiveDate;
    use forecast_core::{
        AppSettings, Coordinates, WeatherApp,
        provider::{geolocation::FixedLocation, mock::MockProvider},
        state::FETCH_FAILED_MESSAGE,
    };

    use super::*;

    fn now(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(hour, 30, 0).unwrap()
    }

    fn app(home: Option<Coordinates>) -> WeatherApp {
        let mock = MockProvider::new(Duration::ZERO)
            .with_today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        WeatherApp::new(Arc::new(mock), Arc::new(FixedLocation::new(home)), AppSettings::default())
    }

    #[tokio::test]
    async fn renders_current_and_five_days() {
        let mut app = app(None);
        let fetch = app.search("London").unwrap();
        app.run(fetch).await;

        let text = render_state(app.state(), now(10));

        assert!(text.starts_with("London, City of London, UK"));
        assert!(text.contains("°C"));
        assert!(text.contains("(day)"));
        assert!(text.contains("Sun & Moon"));
        assert!(text.contains("5-Day Forecast"));
        assert!(text.contains("  Today "));
        assert!(text.contains("  Tomorrow "));
        assert!(text.contains("Wed, Oct 21"));
        assert!(text.contains("Fri, Oct 23"));
    }

    #[tokio::test]
    async fn unit_and_night_follow_state_and_clock() {
        let mut app = app(None);
        let fetch = app.search("Tokyo").unwrap();
        app.run(fetch).await;
        app.toggle_unit();

        let text = render_state(app.state(), now(22));

        assert!(text.contains("°F"));
        assert!(!text.contains("°C"));
        assert!(text.contains("(night)"));
    }

    #[tokio::test]
    async fn failure_shows_message_and_detail() {
        let mut app = app(None);
        let fetch = app.search("95,10").unwrap();
        app.run(fetch).await;

        let text = render_state(app.state(), now(10));

        assert!(text.contains(FETCH_FAILED_MESSAGE));
        assert!(text.contains("coordinates out of range"));
        assert!(text.contains("No weather data yet."));
    }

    #[tokio::test]
    async fn geolocation_notice_is_rendered() {
        let mut app = app(None);
        assert!(app.locate().await.is_none());

        let text = render_state(app.state(), now(10));
        assert!(text.starts_with("Note: "));
        assert!(text.contains("no home location configured"));
    }

    #[test]
    fn degrees_round_without_negative_zero() {
        assert_eq!(degrees(-0.4, TemperatureUnit::Celsius), "0°C");
        assert_eq!(degrees(71.6, TemperatureUnit::Fahrenheit), "72°F");
    }

    #[tokio::test]
    async fn headline_carries_todays_high_and_low() {
        let mut app = app(None);
        let fetch = app.search("Paris").unwrap();
        app.run(fetch).await;

        let snapshot = app.state().snapshot().unwrap();
        let today = &snapshot.today().unwrap().day;
        let expected = format!(
            "H: {}  L: {}",
            degrees(today.maxtemp_c, TemperatureUnit::Celsius),
            degrees(today.mintemp_c, TemperatureUnit::Celsius)
        );

        let text = render_snapshot(snapshot, TemperatureUnit::Celsius, now(10));
        let headline = text.lines().nth(3).unwrap();
        assert!(headline.ends_with(&expected), "headline was {headline:?}");
    }

    #[test]
    fn empty_suggestions_have_a_message() {
        assert_eq!(render_suggestions(&[]), "No matching locations.\n");
    }
}
