//! Best-effort current-weather lookup against an OpenWeatherMap-style API.
//!
//! A lookup either yields a [`WeatherReport`] or a [`WeatherError`]; callers
//! treat any error as "no weather data" and carry on.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::WeatherConfig;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API key not configured")]
    NotConfigured,
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("weather provider answered {0}")]
    Status(StatusCode),
    #[error("invalid weather payload: {0}")]
    Decode(String),
}

/// Normalised weather for a destination. An empty report serialises as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<String>,
}

impl WeatherReport {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, destination: &str) -> Result<WeatherReport, WeatherError>;
}

pub struct OpenWeatherClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, destination: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", destination), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body = response.bytes().await?;
        parse_report(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeatherDto {
    #[serde(default)]
    main: MainDto,
    #[serde(default)]
    weather: Vec<ConditionDto>,
    #[serde(default)]
    wind: WindDto,
}

#[derive(Debug, Default, Deserialize)]
struct MainDto {
    temp: Option<f64>,
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionDto {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WindDto {
    speed: Option<f64>,
}

fn parse_report(body: &[u8]) -> Result<WeatherReport, WeatherError> {
    let dto: CurrentWeatherDto =
        serde_json::from_slice(body).map_err(|err| WeatherError::Decode(err.to_string()))?;
    Ok(WeatherReport {
        temperature: dto.main.temp.map(|t| format!("{t}°C")),
        feels_like: dto.main.feels_like.map(|t| format!("{t}°C")),
        description: dto.weather.into_iter().next().and_then(|c| c.description),
        wind_speed: dto.wind.speed.map(|s| format!("{s} m/s")),
    })
}
