//! The one mesh every object marker is drawn with

use globe_types::prelude::ReferenceBody;
use std::rc::Rc;
use tracing::debug;

#[derive(Clone, PartialEq, Debug)]
pub struct MarkerStyle {
    /// Nominal size of a tracked object [km], exaggerated so it's visible
    pub object_size_km: f64,
    /// Radius [km] the scene radius stands for
    pub reference_radius_km: f64,
    pub color: [u8; 3],
    pub opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            object_size_km: 80.0,
            reference_radius_km: ReferenceBody::EARTH_MEAN_RADIUS_KM,
            // palegreen
            color: [152, 251, 152],
            opacity: 0.7,
        }
    }
}

/// A regular octahedron centered on the origin
#[derive(Clone, PartialEq, Debug)]
pub struct MarkerTemplate {
    /// Distance from the center to each vertex, in scene units
    pub circumradius: f64,
    pub vertices: Vec<na::Point3<f32>>,
    pub faces: Vec<[u16; 3]>,
    pub color: [u8; 3],
    pub opacity: f32,
    pub transparent: bool,
}

impl MarkerTemplate {
    const UNIT_VERTICES: [[f32; 3]; 6] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];

    const FACES: [[u16; 3]; 8] = [
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];

    pub fn octahedron(circumradius: f64, style: &MarkerStyle) -> Self {
        let r = circumradius as f32;
        MarkerTemplate {
            circumradius,
            vertices: Self::UNIT_VERTICES
                .iter()
                .map(|[x, y, z]| na::Point3::new(x * r, y * r, z * r))
                .collect(),
            faces: Self::FACES.to_vec(),
            color: style.color,
            opacity: style.opacity,
            transparent: style.opacity < 1.0,
        }
    }

    /// Color as `[0, 1]` floats
    pub fn color_f32(&self) -> [f32; 3] {
        self.color.map(|c| f32::from(c) / 255.0)
    }
}

/// Builds the marker template on demand, at most once per scene radius
#[derive(Debug, Default)]
pub struct MarkerFactory {
    style: MarkerStyle,
    cached: Option<(u64, Rc<MarkerTemplate>)>,
    builds: usize,
}

impl MarkerFactory {
    pub fn new(style: MarkerStyle) -> Self {
        MarkerFactory {
            style,
            cached: None,
            builds: 0,
        }
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// Circumradius of the marker for a globe of `scene_radius`
    pub fn marker_radius(&self, scene_radius: f64) -> f64 {
        self.style.object_size_km * scene_radius / self.style.reference_radius_km / 2.0
    }

    /// No template until the scene radius is known
    pub fn template(&mut self, scene_radius: Option<f64>) -> Option<Rc<MarkerTemplate>> {
        let radius = scene_radius?;
        let key = radius.to_bits();
        if let Some((cached_key, template)) = &self.cached {
            if *cached_key == key {
                return Some(Rc::clone(template));
            }
        }

        let template = Rc::new(MarkerTemplate::octahedron(
            self.marker_radius(radius),
            &self.style,
        ));
        self.builds += 1;
        debug!(
            scene_radius = radius,
            marker_radius = template.circumradius,
            "Built marker template"
        );
        self.cached = Some((key, Rc::clone(&template)));
        Some(template)
    }

    /// How many times a template has been built
    pub fn builds(&self) -> usize {
        self.builds
    }
}
