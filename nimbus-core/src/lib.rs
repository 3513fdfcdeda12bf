//! Core library for the `nimbus` weather client.
//!
//! This crate owns the location-acquisition and weather-fetch pipeline:
//! - Closed error taxonomy shared by every stage
//! - Location resolver over an abstract platform capability
//! - OpenWeather client with typed failure classification
//! - Fetch view-model publishing one observable `{Loading|Success|Error}`
//!   state to any number of subscribers
//!
//! The view layer (a CLI here, a screen elsewhere) only calls
//! [`WeatherViewModel::load_weather`] and watches the state.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod viewmodel;

pub use config::Config;
pub use dispatcher::{Dispatcher, RuntimeDispatcher};
pub use error::{AppError, Result};
pub use location::{AccuracyHint, LocationResolver, LocationService, Permissions};
pub use model::{Coordinate, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use viewmodel::{FetchState, WeatherViewModel};
