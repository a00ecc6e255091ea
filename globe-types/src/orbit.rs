use derive_more::Display;
use serde::Serialize;

/// Output of a propagation step
#[derive(Copy, Clone, PartialEq, Debug, Default, Display)]
#[display(fmt = "{{pos_eci: {}}}", "pos_eci")]
pub struct EciPosition {
    /// Position, [km], expressed in the Earth-centered inertial frame
    pub pos_eci: na::Vector3<f64>,
}

impl EciPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            pos_eci: na::Vector3::new(x, y, z),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos_eci.iter().all(|c| c.is_finite())
    }
}

/// Geodetic coordinates relative to the rotating reference body
#[derive(Copy, Clone, PartialEq, Debug, Default, Display, Serialize)]
#[display(
    fmt = "{{lat: {}, lng: {}, height: {}}}",
    "latitude",
    "longitude",
    "height"
)]
pub struct Geodetic {
    /// Latitude [rad]
    pub latitude: f64,

    /// Longitude [rad], in (-pi, pi]
    pub longitude: f64,

    /// Height above the ellipsoid [km]
    pub height: f64,
}

impl Geodetic {
    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }
}
