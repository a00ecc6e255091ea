//! The boundary to the orbital mechanics library.
//!
//! Everything the engine knows about orbits goes through [`OrbitalModel`]; the
//! per-object state it hands back is opaque and only ever passed back in.

use crate::units::{Angle, Length, Timestamp};
use globe_types::prelude::{EciPosition, Geodetic};
use nav_types::{ECEF, WGS84};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Failed to parse the element lines. {0}")]
    Elements(String),

    #[error("Failed to derive propagator constants. {0}")]
    Constants(String),

    #[error("Propagation failed. {0}")]
    Propagate(String),

    #[error("Propagation produced a non-finite position {0}")]
    NonFinite(EciPosition),
}

pub trait OrbitalModel {
    /// Opaque per-object state, produced by [`OrbitalModel::parse`]
    type State;

    fn parse(&self, line1: &str, line2: &str) -> Result<Self::State, PropagationError>;

    /// Inertial position of the object at `t`
    fn propagate(&self, state: &Self::State, t: Timestamp)
        -> Result<EciPosition, PropagationError>;

    /// Rotation of the reference body at `t`
    fn sidereal_time(&self, t: Timestamp) -> Angle;

    fn eci_to_geodetic(&self, pos: &EciPosition, sidereal_time: Angle) -> Geodetic;
}

/// SGP4/SDP4 via the `sgp4` crate, IAU-82 mean sidereal time, WGS84 geodetics
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Sgp4Model;

pub struct Sgp4State {
    epoch: sgp4::chrono::NaiveDateTime,
    constants: sgp4::Constants,
}

impl fmt::Debug for Sgp4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sgp4State")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Sgp4State {
    pub fn epoch(&self) -> sgp4::chrono::NaiveDateTime {
        self.epoch
    }
}

impl OrbitalModel for Sgp4Model {
    type State = Sgp4State;

    fn parse(&self, line1: &str, line2: &str) -> Result<Sgp4State, PropagationError> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PropagationError::Elements(e.to_string()))?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| PropagationError::Constants(e.to_string()))?;
        Ok(Sgp4State {
            epoch: elements.datetime,
            constants,
        })
    }

    fn propagate(&self, state: &Sgp4State, t: Timestamp) -> Result<EciPosition, PropagationError> {
        let since_epoch = t.as_utc().naive_utc() - state.epoch;
        let minutes = since_epoch.num_milliseconds() as f64 / 60_000.0;
        let prediction = state
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::Propagate(e.to_string()))?;
        let [x, y, z] = prediction.position;
        let pos = EciPosition::new(x, y, z);
        if !pos.is_finite() {
            return Err(PropagationError::NonFinite(pos));
        }
        Ok(pos)
    }

    fn sidereal_time(&self, t: Timestamp) -> Angle {
        greenwich_mean_sidereal_time(t)
    }

    fn eci_to_geodetic(&self, pos: &EciPosition, sidereal_time: Angle) -> Geodetic {
        eci_to_geodetic(pos, sidereal_time)
    }
}

/// J2000.0, 2000-01-01T12:00:00Z, in unix seconds
const J2000_UNIX_SECS: f64 = 946_728_000.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const GMST_AT_J2000_DEG: f64 = 280.46061837;
const GMST_DEG_PER_DAY: f64 = 360.98564736629;
const GMST_T2_DEG: f64 = 0.000387933;
const GMST_T3_DIVISOR: f64 = 38_710_000.0;

/// Greenwich mean sidereal time, wrapped into `[0, 360)` degrees
pub fn greenwich_mean_sidereal_time(t: Timestamp) -> Angle {
    let unix_secs = t.as_millis() as f64 / 1000.0;
    let days = (unix_secs - J2000_UNIX_SECS) / SECONDS_PER_DAY;
    let centuries = days / DAYS_PER_JULIAN_CENTURY;
    let deg = GMST_AT_J2000_DEG + GMST_DEG_PER_DAY * days + GMST_T2_DEG * centuries.powi(2)
        - centuries.powi(3) / GMST_T3_DIVISOR;
    Angle::from_degrees(deg).normalized()
}

/// Rotate an inertial position [km] into the body-fixed frame and convert it
/// to WGS84 geodetic coordinates
pub fn eci_to_geodetic(pos: &EciPosition, gmst: Angle) -> Geodetic {
    let rot = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), -gmst.as_radians());
    let ecef_km = rot * pos.pos_eci;
    let ecef = ECEF::new(
        Length::from_kilometers(ecef_km.x).as_meters(),
        Length::from_kilometers(ecef_km.y).as_meters(),
        Length::from_kilometers(ecef_km.z).as_meters(),
    );
    let wgs = WGS84::from(ecef);
    Geodetic {
        latitude: wgs.latitude_radians(),
        longitude: wgs.longitude_radians(),
        height: Length::from_meters(wgs.altitude()).as_kilometers(),
    }
}
