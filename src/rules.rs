//! Go/No-Go rule evaluation
//!
//! Pure function over a normalized observation and a daylight classification.
//! Reasons are reported in a fixed order: daylight, wind, visibility, ceiling, condition.

use serde::Serialize;

use crate::daylight::DaylightStatus;
use crate::models::{Ceiling, NormalizedObservation};

/// Maximum sustained wind, mph
pub const MAX_WIND_MPH: f64 = 15.7;
/// Minimum horizontal visibility, statute miles
pub const MIN_VISIBILITY_SM: f64 = 3.0;
/// Minimum ceiling, feet AGL
pub const MIN_CEILING_FT: u32 = 500;
/// Condition words that ground the flight (case-insensitive substring match)
pub const HAZARD_WORDS: [&str; 5] = ["rain", "snow", "fog", "thunderstorm", "mist"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Go,
    NoGo,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Go => write!(f, "GO"),
            Self::NoGo => write!(f, "NO GO"),
        }
    }
}

/// Pass/fail per criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriteriaBreakdown {
    pub wind: bool,
    pub visibility: bool,
    pub ceiling: bool,
    pub condition: bool,
    pub daylight: bool,
    /// False when the daylight window was unknown and the criterion passed by default
    pub daylight_checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub criteria: CriteriaBreakdown,
}

impl EvaluationResult {
    #[must_use]
    pub fn is_go(&self) -> bool {
        self.decision == Decision::Go
    }
}

/// True when the condition text names a hazard
#[must_use]
pub fn has_hazard(condition: &str) -> bool {
    let condition = condition.to_lowercase();
    HAZARD_WORDS.iter().any(|word| condition.contains(word))
}

fn ceiling_ok(ceiling: Ceiling) -> bool {
    match ceiling {
        Ceiling::Unlimited => true,
        Ceiling::Feet(feet) => feet >= MIN_CEILING_FT,
    }
}

#[must_use]
pub fn evaluate(
    observation: &NormalizedObservation,
    daylight: &DaylightStatus,
) -> EvaluationResult {
    let criteria = CriteriaBreakdown {
        wind: observation.wind_mph <= MAX_WIND_MPH,
        visibility: observation.visibility_sm >= MIN_VISIBILITY_SM,
        ceiling: ceiling_ok(observation.ceiling),
        condition: !has_hazard(&observation.condition),
        daylight: daylight.permits_flight(),
        daylight_checked: daylight.is_known(),
    };

    let mut reasons = Vec::new();
    match daylight {
        DaylightStatus::Before {
            minutes_until_sunrise,
        } => reasons.push(format!(
            "Operation is {minutes_until_sunrise} minutes before sunrise"
        )),
        DaylightStatus::After {
            minutes_since_sunset,
        } => reasons.push(format!(
            "Operation is {minutes_since_sunset} minutes after sunset"
        )),
        DaylightStatus::Within { .. } | DaylightStatus::Unknown => {}
    }
    if !criteria.wind {
        reasons.push(format!("Wind above {MAX_WIND_MPH} mph"));
    }
    if !criteria.visibility {
        reasons.push(format!("Visibility below {MIN_VISIBILITY_SM} statute miles"));
    }
    if !criteria.ceiling {
        reasons.push(format!("Cloud base below {MIN_CEILING_FT} ft AGL"));
    }
    if !criteria.condition {
        reasons.push("Bad weather conditions present".to_string());
    }

    let decision = if reasons.is_empty() {
        Decision::Go
    } else {
        Decision::NoGo
    };

    EvaluationResult {
        decision,
        reasons,
        criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTier;
    use rstest::rstest;

    fn observation(
        wind: f64,
        visibility: f64,
        ceiling: Ceiling,
        condition: &str,
    ) -> NormalizedObservation {
        NormalizedObservation {
            source: SourceTier::Current,
            reported_by: Some("KSWO".to_string()),
            wind_mph: wind,
            visibility_sm: visibility,
            ceiling,
            condition: condition.to_string(),
            valid_from: None,
            valid_to: None,
            raw_text: None,
            segments: Vec::new(),
        }
    }

    fn daytime() -> DaylightStatus {
        DaylightStatus::Within {
            minutes_until_sunset: 240,
        }
    }

    #[test]
    fn test_all_thresholds_met_is_go() {
        let result = evaluate(&observation(10.0, 10.0, Ceiling::Unlimited, "Clear"), &daytime());
        assert_eq!(result.decision, Decision::Go);
        assert!(result.reasons.is_empty());
        assert!(result.criteria.daylight_checked);
    }

    #[test]
    fn test_high_wind_only() {
        let result = evaluate(&observation(20.0, 5.0, Ceiling::Feet(1000), "Clear"), &daytime());
        assert_eq!(result.decision, Decision::NoGo);
        assert_eq!(result.reasons, vec!["Wind above 15.7 mph"]);
        assert!(!result.criteria.wind);
    }

    #[test]
    fn test_rain_only() {
        let result = evaluate(
            &observation(10.0, 5.0, Ceiling::Feet(1000), "Light Rain Showers"),
            &daytime(),
        );
        assert_eq!(result.decision, Decision::NoGo);
        assert_eq!(result.reasons, vec!["Bad weather conditions present"]);
    }

    #[rstest]
    #[case(15.7, true)]
    #[case(15.8, false)]
    fn test_wind_boundary(#[case] wind: f64, #[case] ok: bool) {
        let result = evaluate(&observation(wind, 10.0, Ceiling::Unlimited, "Clear"), &daytime());
        assert_eq!(result.criteria.wind, ok);
    }

    #[rstest]
    #[case(3.0, true)]
    #[case(2.9, false)]
    fn test_visibility_boundary(#[case] visibility: f64, #[case] ok: bool) {
        let result = evaluate(
            &observation(5.0, visibility, Ceiling::Unlimited, "Clear"),
            &daytime(),
        );
        assert_eq!(result.criteria.visibility, ok);
    }

    #[rstest]
    #[case(Ceiling::Feet(500), true)]
    #[case(Ceiling::Feet(499), false)]
    #[case(Ceiling::Unlimited, true)]
    fn test_ceiling_boundary(#[case] ceiling: Ceiling, #[case] ok: bool) {
        let result = evaluate(&observation(5.0, 10.0, ceiling, "Clear"), &daytime());
        assert_eq!(result.criteria.ceiling, ok);
    }

    #[rstest]
    #[case("Patchy Fog", true)]
    #[case("SNOW", true)]
    #[case("Chance Showers And Thunderstorms", true)]
    #[case("Light rain, mist", true)]
    #[case("Mostly Sunny", false)]
    #[case("VFR", false)]
    #[case("Unknown", false)]
    fn test_hazard_words(#[case] condition: &str, #[case] hazard: bool) {
        assert_eq!(has_hazard(condition), hazard);
    }

    #[test]
    fn test_reasons_in_fixed_order() {
        let result = evaluate(
            &observation(30.0, 1.0, Ceiling::Feet(200), "Thunderstorm"),
            &DaylightStatus::After {
                minutes_since_sunset: 45,
            },
        );
        assert_eq!(
            result.reasons,
            vec![
                "Operation is 45 minutes after sunset",
                "Wind above 15.7 mph",
                "Visibility below 3 statute miles",
                "Cloud base below 500 ft AGL",
                "Bad weather conditions present",
            ]
        );
    }

    #[test]
    fn test_before_sunrise_reason() {
        let result = evaluate(
            &observation(5.0, 10.0, Ceiling::Unlimited, "Clear"),
            &DaylightStatus::Before {
                minutes_until_sunrise: 30,
            },
        );
        assert_eq!(result.reasons, vec!["Operation is 30 minutes before sunrise"]);
        assert!(!result.criteria.daylight);
    }

    #[test]
    fn test_unknown_daylight_passes_unchecked() {
        let result = evaluate(
            &observation(5.0, 10.0, Ceiling::Unlimited, "Clear"),
            &DaylightStatus::Unknown,
        );
        assert!(result.is_go());
        assert!(result.criteria.daylight);
        assert!(!result.criteria.daylight_checked);
    }

    #[test]
    fn test_unavailable_observation_is_no_go() {
        let result = evaluate(&NormalizedObservation::unavailable(), &daytime());
        assert_eq!(result.decision, Decision::NoGo);
        assert_eq!(result.reasons, vec!["Visibility below 3 statute miles"]);
    }
}
