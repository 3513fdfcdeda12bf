use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::display;

use nimbus_core::location::fixed::FixedLocationService;
use nimbus_core::location::ip::IpLocationService;
use nimbus_core::{
    Config, Coordinate, FetchState, LocationResolver, LocationService, RuntimeDispatcher,
    WeatherViewModel, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about = "Current weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for the device location.
    Show {
        /// Pin the latitude instead of resolving the device location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Pin the longitude instead of resolving the device location.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon } => show(lat, lon).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let service: Box<dyn LocationService> = match (lat, lon) {
        (Some(lat), Some(lon)) => Box::new(FixedLocationService::new(Coordinate::new(lat, lon))),
        _ => Box::new(IpLocationService::new()?),
    };

    let view_model = WeatherViewModel::new(
        LocationResolver::new(service),
        provider,
        Arc::new(RuntimeDispatcher::current()),
    );

    let mut state = view_model.subscribe();
    view_model.load_weather();

    let outcome = state.wait_for(FetchState::is_terminal).await?.clone();
    match outcome {
        FetchState::Success(snapshot) => {
            print!("{}", display::render(&snapshot));
            Ok(())
        }
        FetchState::Error(message) => Err(anyhow::anyhow!(message)),
        FetchState::Loading => unreachable!("wait_for only returns terminal states"),
    }
}
