//! Unit conversions used when normalizing source data

/// Statute miles per hour in one knot
pub const MPH_PER_KNOT: f64 = 1.15078;

const FEET_PER_METER: f64 = 3.28084;
const MPH_PER_KMH: f64 = 0.621_371;

/// Round to one decimal place
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Knots to mph, rounded to one decimal
#[must_use]
pub fn knots_to_mph(knots: f64) -> f64 {
    round1(knots * MPH_PER_KNOT)
}

/// km/h to mph, rounded to one decimal
#[must_use]
pub fn kmh_to_mph(kmh: f64) -> f64 {
    round1(kmh * MPH_PER_KMH)
}

/// Meters to whole feet
#[must_use]
pub fn meters_to_feet(meters: f64) -> u32 {
    let feet = (meters * FEET_PER_METER).round();
    if feet <= 0.0 { 0 } else { feet as u32 }
}

/// Parse a visibility string in statute miles, ignoring a trailing `+` ("greater than")
#[must_use]
pub fn parse_visibility_sm(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('+').trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// First run of ASCII digits in free text, e.g. `"10 to 15 mph"` gives 10
#[must_use]
pub fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
