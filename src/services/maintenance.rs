use serde::Serialize;

use crate::knowledge;

pub const OIL_CHANGE_NOTE: &str = "Consider an oil change soon.";
pub const TIRE_ROTATION_NOTE: &str = "Consider rotating tires soon.";

const OIL_INTERVAL: i64 = 3000;
const TIRE_INTERVAL: i64 = 5000;
/// Miles past an interval boundary that still count as "recently crossed".
const WINDOW: i64 = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct MaintenancePlan {
    pub trip_type: String,
    pub mileage: i64,
    pub recommendations: Vec<String>,
}

/// Terrain recommendations plus the mileage heuristics. Both interval checks
/// run independently and only for positive mileage.
pub fn anticipate(trip_type: &str, mileage: i64) -> MaintenancePlan {
    let trip_type = knowledge::normalize_key(trip_type);
    let mut recommendations: Vec<String> = knowledge::maintenance_items(&trip_type)
        .iter()
        .map(|item| item.to_string())
        .collect();

    if mileage > 0 {
        if mileage % OIL_INTERVAL < WINDOW {
            recommendations.push(OIL_CHANGE_NOTE.to_string());
        }
        if mileage % TIRE_INTERVAL < WINDOW {
            recommendations.push(TIRE_ROTATION_NOTE.to_string());
        }
    }

    if recommendations.is_empty() {
        recommendations = knowledge::general_maintenance()
            .iter()
            .map(|item| item.to_string())
            .collect();
    }

    MaintenancePlan {
        trip_type,
        mileage,
        recommendations,
    }
}
