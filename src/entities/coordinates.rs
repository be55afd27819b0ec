use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error_with, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting values outside the WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid_input_error_with(
                "Latitude must be between -90 and 90",
            ));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid_input_error_with(
                "Longitude must be between -180 and 180",
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.latitude, coordinates.longitude)
    }
}

#[test]
fn rejects_out_of_range_coordinates() {
    assert!(Coordinates::new(12.9716, 77.5946).is_ok());
    assert!(Coordinates::new(90.0, -180.0).is_ok());

    let err = Coordinates::new(90.5, 0.0).unwrap_err();
    assert!(err.is_invalid_input_error());
    assert_eq!(err.message, "Latitude must be between -90 and 90");

    let err = Coordinates::new(0.0, 180.01).unwrap_err();
    assert_eq!(err.message, "Longitude must be between -180 and 180");

    assert!(Coordinates::new(f64::NAN, 0.0).is_err());
}

#[test]
fn formats_as_query_pair() {
    let location: String = Coordinates::new(12.5, -3.25).unwrap().into();
    assert_eq!(location, "12.5,-3.25");
}
