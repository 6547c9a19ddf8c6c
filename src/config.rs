use std::{env, net::SocketAddr, time::Duration};

use url::Url;

use crate::error::AppError;

pub const DEFAULT_WEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    /// `None` means a fresh key per process, so sessions do not survive restarts.
    pub cookie_secret: Option<String>,
    pub weather: WeatherConfig,
    pub session_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub endpoint: Url,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://offroad.db".to_string());

        let listen_addr: SocketAddr = match (env::var("APP_LISTEN_ADDR"), env::var("PORT")) {
            (Ok(addr), _) => addr,
            (Err(_), Ok(port)) => format!("0.0.0.0:{port}"),
            _ => "127.0.0.1:5001".to_string(),
        }
        .parse()
        .map_err(|err| AppError::Config(format!("invalid listen address: {err}")))?;

        let cookie_secret = non_empty_var("COOKIE_SECRET");

        let endpoint = env::var("WEATHER_API_URL")
            .unwrap_or_else(|_| DEFAULT_WEATHER_URL.to_string())
            .parse::<Url>()
            .map_err(|err| AppError::Config(format!("invalid WEATHER_API_URL: {err}")))?;
        let timeout_secs = parse_var("WEATHER_TIMEOUT_SECS", 10u64)?;

        let session_ttl_days = parse_var("SESSION_TTL_DAYS", 30i64)?;
        if session_ttl_days <= 0 {
            return Err(AppError::Config("SESSION_TTL_DAYS must be positive".into()));
        }

        Ok(Self {
            database_url,
            listen_addr,
            cookie_secret,
            weather: WeatherConfig {
                api_key: non_empty_var("OPENWEATHER_API_KEY"),
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
            },
            session_ttl_days,
        })
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            // constant is a valid URL
            endpoint: Url::parse(DEFAULT_WEATHER_URL).expect("default weather url parses"),
            timeout: Duration::from_secs(10),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {name}: {err}"))),
        None => Ok(default),
    }
}
