use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::model::{Coordinate, WeatherSnapshot};

use super::WeatherProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Unknown(anyhow::Error::new(e)))?;

        Ok(Self { api_key, base_url, http })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        debug!(lat = coordinate.latitude, lon = coordinate.longitude, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", "en".to_string()),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            warn!(status = %status, "current weather request failed");
            return Err(AppError::Api {
                code: status.as_u16(),
                message: server_message(&body),
            });
        }

        let dto: CurrentWeatherDto = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "current weather body did not decode");
            AppError::Parsing
        })?;

        Ok(dto.into_snapshot())
    }
}

/// reqwest errors out of `send`/`text` are transport trouble; only a
/// malformed request counts as unanticipated. The url is stripped before
/// the error is carried anywhere, since it embeds the API key.
fn classify_transport(err: reqwest::Error) -> AppError {
    let err = err.without_url();
    if err.is_builder() {
        return AppError::Unknown(anyhow::Error::new(err));
    }
    warn!(error = %err, "transport failure talking to the weather endpoint");
    AppError::Network
}

/// OpenWeather error bodies look like `{"cod":401,"message":"..."}`.
fn server_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// Unknown response fields are ignored by default, which keeps decoding
// forward-compatible with additions to the payload.

#[derive(Debug, Deserialize)]
struct CurrentWeatherDto {
    weather: Vec<ConditionDto>,
    main: MainDto,
    wind: WindDto,
    clouds: CloudsDto,
    #[serde(default)]
    rain: Option<RainDto>,
    sys: SysDto,
    name: String,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct ConditionDto {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainDto {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct WindDto {
    speed: f64,
    deg: i32,
    #[serde(default)]
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloudsDto {
    all: i32,
}

#[derive(Debug, Deserialize)]
struct RainDto {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SysDto {
    sunrise: i64,
    sunset: i64,
}

impl CurrentWeatherDto {
    /// Field-by-field mapping; values are carried as reported, out-of-range
    /// humidity/cloud values included. Clamping belongs to the view layer.
    fn into_snapshot(self) -> WeatherSnapshot {
        let condition = self.weather.into_iter().next();
        let (description, icon) = condition
            .map(|c| (c.description, c.icon))
            .unwrap_or_default();

        WeatherSnapshot {
            city: self.name,
            description,
            icon,
            temperature: self.main.temp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            feels_like: self.main.feels_like,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            clouds: self.clouds.all,
            wind_speed: self.wind.speed,
            wind_deg: self.wind.deg,
            wind_gust: self.wind.gust,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            last_updated: self.dt,
            rain_one_hour: self.rain.and_then(|r| r.one_hour),
        }
    }
}
