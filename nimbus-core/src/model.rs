use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single geographic fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Immutable point-in-time weather reading for one location.
///
/// Values are carried exactly as the source reported them. Humidity and
/// cloud cover are nominally 0-100 but the source does not guarantee the
/// range; the presentation layer clamps them before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like: f64,
    /// Pressure in hPa.
    pub pressure: i32,
    pub humidity: i32,
    pub clouds: i32,
    pub wind_speed: f64,
    /// Wind direction in degrees.
    pub wind_deg: i32,
    pub wind_gust: Option<f64>,
    /// Epoch seconds.
    pub sunrise: i64,
    /// Epoch seconds.
    pub sunset: i64,
    /// Epoch seconds of the source observation.
    pub last_updated: i64,
    /// Rain volume for the last hour, in mm.
    pub rain_one_hour: Option<f64>,
}

impl WeatherSnapshot {
    pub fn sunrise_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.sunrise)
    }

    pub fn sunset_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.sunset)
    }

    pub fn last_updated_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.last_updated)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    if ts <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(ts, 0)
}
