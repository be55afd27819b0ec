pub mod google_maps;

use async_trait::async_trait;

use crate::{entities::Coordinates, error::Error};

/// One origin/destination cell of a distance matrix lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixElement {
    pub status: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl MatrixElement {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// A mapping service able to return driving distance and duration between
/// two points.
#[async_trait]
pub trait DistanceMatrix: Send + Sync {
    async fn distance_and_duration(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<MatrixElement, Error>;
}
