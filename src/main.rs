use std::sync::Arc;

use offroad::config::AppConfig;
use offroad::db::{init_pool, run_migrations};
use offroad::error::AppError;
use offroad::routes::create_router;
use offroad::services::weather::OpenWeatherClient;
use offroad::state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    if config.weather.api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set, late-night plans will carry no weather");
    }
    if config.cookie_secret.is_none() {
        warn!("COOKIE_SECRET not set, sessions will not survive a restart");
    }
    let weather =
        OpenWeatherClient::new(&config.weather).map_err(|err| AppError::Other(err.into()))?;

    let listen_addr = config.listen_addr;
    let state = AppState::new(config, db, Arc::new(weather));
    let app = create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,offroad=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
