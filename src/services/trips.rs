use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::{
    auth::AuthenticatedUser,
    db::DbPool,
    error::AppError,
    models::trip::{Trip, TripKind, TripRow},
};

/// Append-only trip history, scoped to the user passed in.
#[derive(Clone)]
pub struct TripStore {
    db: DbPool,
}

impl TripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn record<T: Serialize>(
        &self,
        user: &AuthenticatedUser,
        kind: TripKind,
        details: &T,
    ) -> Result<i64, AppError> {
        let details =
            serde_json::to_string(details).map_err(|err| AppError::Other(err.into()))?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO trips (user_id, trip_type, details, created_at)
               VALUES (?, ?, ?, ?) RETURNING id"#,
        )
        .bind(user.id)
        .bind(kind.as_str())
        .bind(details)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        debug!(trip_id = id, user = %user.username, kind = %kind, "trip stored");
        Ok(id)
    }

    /// All trips of `user`, newest first.
    pub async fn list_for(&self, user: &AuthenticatedUser) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query_as::<_, TripRow>(
            r#"SELECT id, user_id, trip_type, details, created_at
               FROM trips WHERE user_id = ? ORDER BY created_at DESC, id DESC"#,
        )
        .bind(user.id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|row| Trip::try_from(row).map_err(AppError::Other))
            .collect()
    }
}
