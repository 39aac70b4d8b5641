//! Conversions between the metric and imperial halves of dual-unit fields.
//!
//! Providers use these to populate both representations; snapshot
//! validation uses them to check the two halves agree.

pub const KM_PER_MILE: f64 = 1.609_344;
pub const INHG_PER_MB: f64 = 0.029_53;
pub const MM_PER_INCH: f64 = 25.4;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn kph_to_mph(kph: f64) -> f64 {
    kph / KM_PER_MILE
}

pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

pub fn mb_to_inhg(mb: f64) -> f64 {
    mb * INHG_PER_MB
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Round to `places` decimal digits, the way the API reports imperial values.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub(crate) fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance
}
