use std::fmt::Debug;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::model::Coordinate;

pub mod fixed;
pub mod ip;

/// Grant status of the two platform location permissions.
///
/// The core only observes grant status; prompting the user is the view
/// layer's responsibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub fine: bool,
    pub coarse: bool,
}

impl Permissions {
    pub fn granted() -> Self {
        Self { fine: true, coarse: true }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    /// Either grant is enough to request a fix.
    pub fn any(&self) -> bool {
        self.fine || self.coarse
    }
}

/// Power/accuracy quality hint passed to the platform when requesting a
/// fresh fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyHint {
    LowPower,
    Balanced,
    HighAccuracy,
}

/// Abstract platform location capability.
///
/// This is the seam between the resolver and whatever actually produces
/// fixes: a fused vendor service, plain provider polling, an IP lookup, or
/// a test fake. Exactly one concrete is selected at composition time.
///
/// `current_fix` must be cancel-safe: dropping the returned future releases
/// any listener registered with the platform, and no result is delivered
/// afterwards.
#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    /// Current grant status. Never suspends and never prompts.
    fn permissions(&self) -> Permissions;

    /// Request a fresh best-effort fix. `Ok(None)` means the platform had
    /// nothing to offer (timeout, no provider signal).
    async fn current_fix(&self, hint: AccuracyHint) -> Result<Option<Coordinate>>;

    /// Last fix the platform has cached, if any.
    async fn last_known_fix(&self) -> Result<Option<Coordinate>>;
}

/// Resolves a best-effort coordinate from the platform location service.
///
/// One call, one result: the future resolves exactly once, and dropping it
/// cancels the underlying platform request.
#[derive(Debug)]
pub struct LocationResolver {
    service: Box<dyn LocationService>,
}

impl LocationResolver {
    pub fn new(service: Box<dyn LocationService>) -> Self {
        Self { service }
    }

    /// Obtain a coordinate, preferring a fresh fix over the platform cache.
    ///
    /// Errors: [`AppError::Permission`] when neither grant is present (the
    /// service is not touched), [`AppError::Location`] when neither a fresh
    /// nor a cached fix exists.
    pub async fn resolve(&self) -> Result<Coordinate> {
        if !self.service.permissions().any() {
            return Err(AppError::Permission);
        }

        match self.service.current_fix(AccuracyHint::Balanced).await {
            Ok(Some(fix)) => {
                debug!(%fix, "resolved fresh fix");
                return Ok(fix);
            }
            Ok(None) => debug!("no fresh fix, trying last known"),
            Err(err) => warn!(error = %err, "fresh fix request failed, trying last known"),
        }

        match self.service.last_known_fix().await {
            Ok(Some(fix)) => {
                debug!(%fix, "resolved cached fix");
                Ok(fix)
            }
            Ok(None) => Err(AppError::Location),
            Err(err) => {
                warn!(error = %err, "last known fix unavailable");
                Err(AppError::Location)
            }
        }
    }
}
