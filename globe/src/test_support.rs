//! Fixtures shared by the unit tests

use crate::{
    orbital::{OrbitalModel, PropagationError},
    units::{Angle, Timestamp},
};
use globe_types::prelude::{EciPosition, Geodetic};
use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

pub const ISS_L1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_L2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

/// A three line group for `name` with the ISS elements relabelled as `catalog`
pub fn tle_group(name: &str, catalog: &str) -> String {
    assert_eq!(catalog.len(), 5);
    format!(
        "{name}\n1 {catalog}{}\n2 {catalog}{}\n",
        &ISS_L1[7..],
        &ISS_L2[7..]
    )
}

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse_rfc3339(s).unwrap()
}

#[derive(Debug, PartialEq)]
pub struct FakeState {
    pub catalog: String,
}

/// Deterministic stand-in for the orbital library.
///
/// Latitude is the catalog number mod 90, longitude follows the sidereal
/// angle, height is a tenth of an Earth radius.
#[derive(Debug, Default)]
pub struct FakeModel {
    pub reject_parse: HashSet<String>,
    pub reject_propagate: HashSet<String>,
    /// Fail only at these instants
    pub reject_at: RefCell<Vec<(String, Timestamp)>>,
    pub sidereal_calls: Cell<usize>,
    pub propagate_calls: Cell<usize>,
}

impl FakeModel {
    pub fn rejecting_parse(catalogs: &[&str]) -> Self {
        FakeModel {
            reject_parse: catalogs.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn rejecting_propagate(catalogs: &[&str]) -> Self {
        FakeModel {
            reject_propagate: catalogs.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl OrbitalModel for FakeModel {
    type State = FakeState;

    fn parse(&self, line1: &str, _line2: &str) -> Result<FakeState, PropagationError> {
        let catalog = line1[2..7].trim().to_owned();
        if self.reject_parse.contains(&catalog) {
            return Err(PropagationError::Elements(format!("rejected {catalog}")));
        }
        Ok(FakeState { catalog })
    }

    fn propagate(&self, state: &FakeState, t: Timestamp) -> Result<EciPosition, PropagationError> {
        self.propagate_calls.set(self.propagate_calls.get() + 1);
        let failing_now = self
            .reject_at
            .borrow()
            .iter()
            .any(|(c, at)| *c == state.catalog && *at == t);
        if self.reject_propagate.contains(&state.catalog) || failing_now {
            return Err(PropagationError::Propagate(format!(
                "rejected {}",
                state.catalog
            )));
        }
        let n: f64 = state.catalog.parse().unwrap_or(0.0);
        Ok(EciPosition::new(n % 90.0, 0.0, 0.0))
    }

    fn sidereal_time(&self, t: Timestamp) -> Angle {
        self.sidereal_calls.set(self.sidereal_calls.get() + 1);
        Angle::from_degrees(((t.as_millis() / 1000) % 180) as f64)
    }

    fn eci_to_geodetic(&self, pos: &EciPosition, sidereal_time: Angle) -> Geodetic {
        Geodetic {
            latitude: pos.pos_eci.x.to_radians(),
            longitude: sidereal_time.as_radians(),
            height: 637.1,
        }
    }
}
