use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Category tag of a stored trip. The tag alone determines the shape of
/// [`Trip::details`], since each planner is the only producer of its kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TripKind {
    #[serde(rename = "late-night")]
    LateNight,
    #[serde(rename = "spontaneous")]
    Spontaneous,
}

impl TripKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripKind::LateNight => "late-night",
            TripKind::Spontaneous => "spontaneous",
        }
    }
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "late-night" => Ok(TripKind::LateNight),
            "spontaneous" => Ok(TripKind::Spontaneous),
            other => Err(format!("unknown trip type `{other}`")),
        }
    }
}

/// Row as stored: `details` is the JSON text written by the planner.
#[derive(Debug, Clone, FromRow)]
pub struct TripRow {
    pub id: i64,
    pub user_id: i64,
    pub trip_type: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub trip_type: TripKind,
    pub details: Value,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = anyhow::Error;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let trip_type = row.trip_type.parse().map_err(anyhow::Error::msg)?;
        let details = serde_json::from_str(&row.details)?;
        Ok(Self {
            id: row.id,
            trip_type,
            details,
            created_at: row.created_at,
        })
    }
}
