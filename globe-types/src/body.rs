use derive_more::Display;

/// The body every tracked object orbits and every altitude is relative to
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub enum ReferenceBody {
    Earth,
}

impl ReferenceBody {
    pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

    /// Mean radius [km]
    pub const fn mean_radius_km(self) -> f64 {
        match self {
            ReferenceBody::Earth => Self::EARTH_MEAN_RADIUS_KM,
        }
    }
}
