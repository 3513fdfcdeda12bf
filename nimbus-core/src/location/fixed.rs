use async_trait::async_trait;

use crate::error::Result;
use crate::location::{AccuracyHint, LocationService, Permissions};
use crate::model::Coordinate;

/// Location service pinned to a coordinate chosen at composition time.
///
/// Used for the CLI's `--lat`/`--lon` override; the "platform" always has a
/// fresh fix and no permission gate.
#[derive(Debug, Clone)]
pub struct FixedLocationService {
    coordinate: Coordinate,
}

impl FixedLocationService {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationService for FixedLocationService {
    fn permissions(&self) -> Permissions {
        Permissions::granted()
    }

    async fn current_fix(&self, _hint: AccuracyHint) -> Result<Option<Coordinate>> {
        Ok(Some(self.coordinate))
    }

    async fn last_known_fix(&self) -> Result<Option<Coordinate>> {
        Ok(Some(self.coordinate))
    }
}
