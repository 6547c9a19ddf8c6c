use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    auth::CurrentUser,
    error::AppError,
    knowledge::{self, Table, Tip},
    models::trip::{Trip, TripKind},
    services::{
        maintenance::{self, MaintenancePlan},
        mechanic,
        planner::{self, LateNightPlan, SpontaneousPlan},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/guide", get(guide))
        .route("/tips/random", get(random_tip))
        .route("/plan/late-night", post(plan_late_night))
        .route("/plan/spontaneous", post(plan_spontaneous))
        .route("/vehicle/checklist", get(vehicle_checklist))
        .route("/maintenance/anticipate", post(anticipate_maintenance))
        .route("/mechanic/assist", post(mechanic_assist))
        .route("/trips", get(saved_trips))
}

async fn guide() -> Json<Table> {
    Json(knowledge::guide())
}

async fn random_tip() -> Json<Tip> {
    Json(knowledge::random_tip(&mut rand::thread_rng(), Utc::now()))
}

async fn vehicle_checklist() -> Json<Table> {
    Json(knowledge::vehicle_checklist())
}

#[derive(Debug, Default, Deserialize)]
struct LateNightRequest {
    destination: Option<String>,
}

async fn plan_late_night(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<LateNightRequest>, AppError>,
) -> Result<Json<LateNightPlan>, AppError> {
    let destination = body
        .destination
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("Destination is required".into()))?;

    let weather = match state.weather.current(destination).await {
        Ok(report) => Some(report),
        Err(err) => {
            warn!(%destination, "weather unavailable: {err}");
            None
        }
    };

    let plan = planner::plan_late_night(destination, Utc::now(), weather);
    if let Some(user) = current.0.as_ref() {
        state.trips.record(user, TripKind::LateNight, &plan).await?;
    }
    Ok(Json(plan))
}

#[derive(Debug, Default, Deserialize)]
struct SpontaneousRequest {
    duration_hours: Option<Value>,
}

async fn plan_spontaneous(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<SpontaneousRequest>, AppError>,
) -> Result<Json<SpontaneousPlan>, AppError> {
    let hours = planner::duration_or_default(body.duration_hours.as_ref());
    let plan = planner::plan_spontaneous(hours, &mut rand::thread_rng());
    if let Some(user) = current.0.as_ref() {
        state.trips.record(user, TripKind::Spontaneous, &plan).await?;
    }
    Ok(Json(plan))
}

#[derive(Debug, Default, Deserialize)]
struct MaintenanceRequest {
    trip_type: Option<String>,
    mileage: Option<Value>,
}

async fn anticipate_maintenance(
    WithRejection(Json(body), _): WithRejection<Json<MaintenanceRequest>, AppError>,
) -> Result<Json<MaintenancePlan>, AppError> {
    let trip_type = body
        .trip_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| knowledge::GENERAL_TERRAIN.to_string());
    let mileage = match body.mileage {
        None | Some(Value::Null) => 0,
        Some(raw) => planner::lenient_int(&raw)
            .ok_or_else(|| AppError::BadRequest("mileage must be a whole number".into()))?,
    };
    Ok(Json(maintenance::anticipate(&trip_type, mileage)))
}

#[derive(Debug, Default, Deserialize)]
struct MechanicRequest {
    #[serde(default)]
    issue: String,
}

async fn mechanic_assist(
    WithRejection(Json(body), _): WithRejection<Json<MechanicRequest>, AppError>,
) -> Response {
    match mechanic::assist(&body.issue) {
        Ok(help) => Json(help).into_response(),
        Err(miss) => (StatusCode::NOT_FOUND, Json(miss)).into_response(),
    }
}

async fn saved_trips(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Trip>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.trips.list_for(user).await?))
}
