use std::fmt::Debug;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::model::{Coordinate, WeatherSnapshot};
use crate::provider::openweather::OpenWeatherProvider;

pub mod openweather;

/// Weather backend seam: one call, current conditions for one coordinate.
///
/// Every expected failure comes back as an [`crate::AppError`]; callers
/// never see a raw transport or decode error.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?.to_owned();
    let provider = OpenWeatherProvider::new(api_key, config.base_url.clone())?;
    Ok(Box::new(provider))
}
