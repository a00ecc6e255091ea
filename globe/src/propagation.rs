use crate::{
    ingest::{OrbitalRecord, SharedRecord},
    orbital::{OrbitalModel, PropagationError},
    units::{Angle, Timestamp},
};
use globe_types::prelude::ReferenceBody;
use std::{fmt, rc::Rc};
use tracing::trace;

/// A point above the reference body, the way the renderer wants it
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GeoPoint {
    /// [deg]
    pub lat: f64,
    /// [deg]
    pub lng: f64,
    /// Height over the reference body's mean radius
    pub alt: f64,
}

/// One object's position for one frame
pub struct RenderableObject<S> {
    pub record: SharedRecord<S>,
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

impl<S> Clone for RenderableObject<S> {
    fn clone(&self) -> Self {
        RenderableObject {
            record: self.record.clone(),
            lat: self.lat,
            lng: self.lng,
            alt: self.alt,
        }
    }
}

impl<S> fmt::Debug for RenderableObject<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderableObject")
            .field("id", &self.record.id())
            .field("lat", &self.lat)
            .field("lng", &self.lng)
            .field("alt", &self.alt)
            .finish()
    }
}

impl<S> RenderableObject<S> {
    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
            alt: self.alt,
        }
    }

    /// Position in the renderer's scene for a globe of `radius`; y is the
    /// polar axis and the prime meridian lies along +z
    pub fn position(&self, radius: f64) -> na::Vector3<f64> {
        self.geo().to_scene(radius)
    }
}

impl GeoPoint {
    pub fn to_scene(&self, radius: f64) -> na::Vector3<f64> {
        let r = radius * (1.0 + self.alt);
        let phi = (90.0 - self.lat).to_radians();
        let theta = (90.0 - self.lng).to_radians();
        na::Vector3::new(
            r * phi.sin() * theta.cos(),
            r * phi.cos(),
            r * phi.sin() * theta.sin(),
        )
    }
}

/// Turns records into geographic positions at a simulated instant
#[derive(Debug)]
pub struct Propagator<M> {
    model: M,
    body: ReferenceBody,
}

impl<M: OrbitalModel> Propagator<M> {
    pub fn new(model: M) -> Self {
        Propagator {
            model,
            body: ReferenceBody::Earth,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Position of a single record at `t`
    pub fn position(
        &self,
        record: &OrbitalRecord<M::State>,
        t: Timestamp,
    ) -> Result<GeoPoint, PropagationError> {
        self.position_with(record, t, self.model.sidereal_time(t))
    }

    fn position_with(
        &self,
        record: &OrbitalRecord<M::State>,
        t: Timestamp,
        sidereal_time: Angle,
    ) -> Result<GeoPoint, PropagationError> {
        let eci = self.model.propagate(record.state(), t)?;
        let geo = self.model.eci_to_geodetic(&eci, sidereal_time);
        Ok(GeoPoint {
            lat: geo.latitude_degrees(),
            lng: geo.longitude_degrees(),
            alt: geo.height / self.body.mean_radius_km(),
        })
    }

    /// Every record that propagates at `t`, in input order. Records that
    /// fail are left out of this frame only.
    pub fn frame(
        &self,
        records: &[SharedRecord<M::State>],
        t: Timestamp,
    ) -> Vec<RenderableObject<M::State>> {
        let sidereal_time = self.model.sidereal_time(t);
        records
            .iter()
            .filter_map(|record| match self.position_with(record, t, sidereal_time) {
                Ok(p) => Some(RenderableObject {
                    record: Rc::clone(record),
                    lat: p.lat,
                    lng: p.lng,
                    alt: p.alt,
                }),
                Err(e) => {
                    trace!(id = record.id(), err = %e, "Omitting object from frame");
                    None
                }
            })
            .collect()
    }
}
