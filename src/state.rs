use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{trips::TripStore, weather::WeatherSource},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub trips: TripStore,
    pub weather: Arc<dyn WeatherSource>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, weather: Arc<dyn WeatherSource>) -> Self {
        let cookie_key = match config.cookie_secret.as_deref() {
            Some(secret) => Key::from(&Sha512::digest(secret.as_bytes())[..]),
            None => Key::generate(),
        };
        Self {
            config: Arc::new(config),
            trips: TripStore::new(db.clone()),
            db,
            weather,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
