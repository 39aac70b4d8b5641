//! Pure mapping from weather data to presentation parameters.
//!
//! Everything here is total: unknown condition text lands in
//! [`Theme::Other`], unparseable dates are echoed back, and no function
//! touches the clock on its own.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{CurrentConditions, TemperatureUnit, WeatherSnapshot};

/// Presentation bucket derived from a condition description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Clear,
    Cloud,
    Rain,
    Snow,
    Other,
}

/// Keyword groups in priority order; the first group with a hit wins.
const KEYWORDS: &[(&[&str], Theme)] = &[
    (&["sunny", "clear"], Theme::Clear),
    (&["cloud"], Theme::Cloud),
    (&["rain", "drizzle"], Theme::Rain),
    (&["snow"], Theme::Snow),
];

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Clear => "clear",
            Theme::Cloud => "cloud",
            Theme::Rain => "rain",
            Theme::Snow => "snow",
            Theme::Other => "other",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_theme(condition_text: &str) -> Theme {
    let text = condition_text.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|word| text.contains(word)))
        .map(|(_, theme)| *theme)
        .unwrap_or(Theme::Other)
}

/// Night is before 06:00 or after 20:59 local time.
pub fn is_night(hour: u32) -> bool {
    hour < 6 || hour > 20
}

pub fn select_temperature(current: &CurrentConditions, unit: TemperatureUnit) -> f64 {
    unit.pick(current.temp_c, current.temp_f)
}

pub fn select_feels_like(current: &CurrentConditions, unit: TemperatureUnit) -> f64 {
    unit.pick(current.feelslike_c, current.feelslike_f)
}

/// Label a forecast date relative to `reference`: "Today", "Tomorrow",
/// otherwise a short weekday/month/day label such as "Wed, Oct 21".
///
/// Only the leading `YYYY-MM-DD` counts; any time of day after it is ignored.
pub fn format_relative_date(iso_date: &str, reference: NaiveDate) -> String {
    let Ok((date, _time)) = NaiveDate::parse_and_remainder(iso_date.trim(), "%Y-%m-%d") else {
        return iso_date.to_string();
    };

    if date == reference {
        return "Today".to_string();
    }
    if reference.checked_add_days(Days::new(1)) == Some(date) {
        return "Tomorrow".to_string();
    }

    date.format("%a, %b %-d").to_string()
}

/// Color stops of a gradient, named after the palette the UI used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub from: &'static str,
    pub via: Option<&'static str>,
    pub to: &'static str,
}

impl Gradient {
    const fn three(from: &'static str, via: &'static str, to: &'static str) -> Self {
        Self { from, via: Some(via), to }
    }

    const fn two(from: &'static str, to: &'static str) -> Self {
        Self { from, via: None, to }
    }

    pub fn stops(&self) -> Vec<&'static str> {
        let mut stops = vec![self.from];
        stops.extend(self.via);
        stops.push(self.to);
        stops
    }
}

/// Page background. `None` means no snapshot has loaded yet.
pub fn background_gradient(theme: Option<Theme>, night: bool) -> Gradient {
    match (theme, night) {
        (None, _) => Gradient::three("blue-400", "blue-500", "purple-600"),
        (Some(Theme::Clear), false) => Gradient::three("yellow-400", "orange-400", "red-400"),
        (Some(Theme::Clear), true) => Gradient::three("indigo-900", "purple-900", "pink-900"),
        (Some(Theme::Cloud), false) => Gradient::three("gray-400", "gray-500", "gray-600"),
        (Some(Theme::Cloud), true) => Gradient::three("gray-800", "gray-700", "gray-600"),
        (Some(Theme::Rain), false) => Gradient::three("blue-400", "blue-500", "blue-600"),
        (Some(Theme::Rain), true) => Gradient::three("blue-900", "blue-800", "gray-800"),
        (Some(Theme::Snow), false) => Gradient::three("blue-200", "blue-300", "blue-400"),
        (Some(Theme::Snow), true) => Gradient::three("blue-900", "blue-800", "gray-700"),
        (Some(Theme::Other), _) => Gradient::three("blue-400", "purple-500", "pink-500"),
    }
}

/// Gradient of a single forecast day card.
pub fn card_gradient(theme: Theme) -> Gradient {
    match theme {
        Theme::Clear => Gradient::two("yellow-100", "orange-100"),
        Theme::Cloud => Gradient::two("gray-100", "gray-200"),
        Theme::Rain => Gradient::two("blue-100", "blue-200"),
        Theme::Snow => Gradient::two("blue-50", "blue-100"),
        Theme::Other => Gradient::two("purple-100", "pink-100"),
    }
}

/// Everything the presentation layer needs to style the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub theme: Option<Theme>,
    pub night: bool,
    pub background: Gradient,
}

impl Presentation {
    pub fn for_snapshot(snapshot: Option<&WeatherSnapshot>, hour: u32) -> Self {
        let theme = snapshot.map(|snap| classify_theme(&snap.current.condition.text));
        let night = is_night(hour);

        Self { theme, night, background: background_gradient(theme, night) }
    }
}
