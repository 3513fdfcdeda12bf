use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::location::{AccuracyHint, LocationService, Permissions};
use crate::model::Coordinate;

pub const DEFAULT_ENDPOINT: &str = "https://ipapi.co/json/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Network-provider location strategy: a best-effort fix derived from the
/// caller's public IP address.
///
/// Desktop hosts have no OS permission gate, so both grants always read as
/// present. The last successful lookup doubles as the platform's cached fix.
#[derive(Debug)]
pub struct IpLocationService {
    endpoint: String,
    http: Client,
    last_fix: Mutex<Option<Coordinate>>,
}

impl IpLocationService {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Unknown(anyhow::Error::new(e)))?;

        Ok(Self {
            endpoint,
            http,
            last_fix: Mutex::new(None),
        })
    }
}

/// Fields of interest in the ipapi.co JSON body; anything else is ignored.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl LocationService for IpLocationService {
    fn permissions(&self) -> Permissions {
        Permissions::granted()
    }

    async fn current_fix(&self, _hint: AccuracyHint) -> Result<Option<Coordinate>> {
        let res = self.http.get(&self.endpoint).send().await.map_err(|e| {
            warn!(error = %e, "ip lookup request failed");
            AppError::Location
        })?;

        if !res.status().is_success() {
            warn!(status = %res.status(), "ip lookup answered with an error status");
            return Err(AppError::Location);
        }

        let parsed: IpLookupResponse = res.json().await.map_err(|e| {
            warn!(error = %e, "ip lookup body did not decode");
            AppError::Location
        })?;

        let fix = match (parsed.latitude, parsed.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude),
            _ => return Ok(None),
        };

        debug!(%fix, "ip lookup produced a fix");
        *self.last_fix.lock().expect("last_fix lock poisoned") = Some(fix);
        Ok(Some(fix))
    }

    async fn last_known_fix(&self) -> Result<Option<Coordinate>> {
        Ok(*self.last_fix.lock().expect("last_fix lock poisoned"))
    }
}
