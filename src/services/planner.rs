use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::weather::WeatherReport;

pub const ARRIVAL_OFFSET_HOURS: i64 = 2;
pub const DEFAULT_DURATION_HOURS: i64 = 4;

const LATE_NIGHT_GEAR: &[&str] = &[
    "Extra lighting",
    "Warm clothing",
    "Emergency blanket",
    "Hot drinks",
];

const LATE_NIGHT_SAFETY: &[&str] = &[
    "Be extra cautious of wildlife at night",
    "Ensure all lights are working properly",
    "Share your route with someone",
    "Take regular breaks to avoid fatigue",
];

pub const ACTIVITY_CATALOG: &[&str] = &[
    "Explore a scenic viewpoint",
    "Tackle a light offroad trail",
    "Have a picnic at a scenic spot",
    "Go for a short hike",
    "Practice recovery techniques",
    "Photograph the landscape",
    "Identify local flora and fauna",
    "Test your vehicle articulation on an obstacle",
];

const SPONTANEOUS_NOTE: &str =
    "Enjoy your spontaneous adventure! Remember to check local conditions.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateNightPlan {
    pub destination: String,
    pub estimated_arrival: DateTime<Utc>,
    pub weather: WeatherReport,
    pub recommended_gear: Vec<String>,
    pub safety_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpontaneousPlan {
    pub duration_hours: i64,
    pub suggested_activities: Vec<String>,
    pub notes: String,
}

/// Builds a late-night plan. `weather` is `None` when the lookup failed, in
/// which case the plan carries an empty weather record.
pub fn plan_late_night(
    destination: &str,
    now: DateTime<Utc>,
    weather: Option<WeatherReport>,
) -> LateNightPlan {
    LateNightPlan {
        destination: destination.to_string(),
        estimated_arrival: now + Duration::hours(ARRIVAL_OFFSET_HOURS),
        weather: weather.unwrap_or_default(),
        recommended_gear: to_owned_list(LATE_NIGHT_GEAR),
        safety_notes: to_owned_list(LATE_NIGHT_SAFETY),
    }
}

/// Samples `clamp(duration / 2, 1, catalog size)` distinct activities.
pub fn plan_spontaneous<R: Rng + ?Sized>(duration_hours: i64, rng: &mut R) -> SpontaneousPlan {
    let count = activity_count(duration_hours);
    let suggested_activities = ACTIVITY_CATALOG
        .choose_multiple(rng, count)
        .map(|activity| activity.to_string())
        .collect();
    SpontaneousPlan {
        duration_hours,
        suggested_activities,
        notes: SPONTANEOUS_NOTE.to_string(),
    }
}

pub fn activity_count(duration_hours: i64) -> usize {
    let max = ACTIVITY_CATALOG.len() as i64;
    duration_hours.div_euclid(2).clamp(1, max) as usize
}

/// Reads an integer from a JSON number or a numeric string. Fractions are
/// truncated toward zero; anything else is `None`.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>().ok().or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Duration for the spontaneous planner, falling back to four hours when the
/// field is absent or not numeric.
pub fn duration_or_default(value: Option<&Value>) -> i64 {
    value.and_then(lenient_int).unwrap_or(DEFAULT_DURATION_HOURS)
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
