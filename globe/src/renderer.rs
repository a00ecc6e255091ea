//! The renderer boundary, and a headless renderer that writes JSON lines

use crate::{marker::MarkerTemplate, propagation::RenderableObject, units::Timestamp};
use globe_types::prelude::CanvasSize;
use serde::Serialize;
use std::{io::Write, rc::Rc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Failed to write renderer output. {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize a frame. {0}")]
    Json(#[from] serde_json::Error),
}

/// The frame the renderer is asked to draw
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RenderFrame {
    pub index: u64,
    /// Simulated time of the objects
    pub time: Timestamp,
}

pub trait GlobeRenderer<S> {
    /// Radius of the globe in scene units, queried once the renderer is ready
    fn scene_radius(&self) -> f64;

    /// Place the camera `altitude` globe radii above the surface
    fn point_of_view(&mut self, altitude: f64);

    /// Replace the whole object set
    fn set_objects(&mut self, objects: &[RenderableObject<S>]);

    fn set_object_template(&mut self, template: Option<Rc<MarkerTemplate>>);

    fn set_canvas_size(&mut self, size: CanvasSize);

    /// Draw a frame. Returns false if the renderer wants to shut down.
    fn render(&mut self, frame: &RenderFrame) -> Result<bool, RendererError>;
}

#[derive(Clone, PartialEq, Debug, Serialize)]
struct ObjectLine {
    id: String,
    lat: f64,
    lng: f64,
    alt: f64,
}

#[derive(Serialize)]
struct FrameLine<'a> {
    frame: u64,
    time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    canvas: Option<CanvasSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker_radius: Option<f64>,
    objects: &'a [ObjectLine],
}

/// Writes one JSON object per emitted frame
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    scene_radius: f64,
    every: u64,
    objects: Vec<ObjectLine>,
    canvas: Option<CanvasSize>,
    template: Option<Rc<MarkerTemplate>>,
    camera_altitude: Option<f64>,
    lines_written: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    /// Radius used by the browser globe this output mimics
    pub const DEFAULT_SCENE_RADIUS: f64 = 100.0;

    pub fn new(out: W) -> Self {
        JsonLinesRenderer {
            out,
            scene_radius: Self::DEFAULT_SCENE_RADIUS,
            every: 1,
            objects: Vec::new(),
            canvas: None,
            template: None,
            camera_altitude: None,
            lines_written: 0,
        }
    }

    /// Only emit every `n`th frame
    pub fn with_every(mut self, n: u64) -> Self {
        self.every = n.max(1);
        self
    }

    pub fn with_scene_radius(mut self, radius: f64) -> Self {
        self.scene_radius = radius;
        self
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn camera_altitude(&self) -> Option<f64> {
        self.camera_altitude
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<S, W: Write> GlobeRenderer<S> for JsonLinesRenderer<W> {
    fn scene_radius(&self) -> f64 {
        self.scene_radius
    }

    fn point_of_view(&mut self, altitude: f64) {
        self.camera_altitude = Some(altitude);
    }

    fn set_objects(&mut self, objects: &[RenderableObject<S>]) {
        self.objects = objects
            .iter()
            .map(|o| ObjectLine {
                id: o.id().to_owned(),
                lat: o.lat,
                lng: o.lng,
                alt: o.alt,
            })
            .collect();
    }

    fn set_object_template(&mut self, template: Option<Rc<MarkerTemplate>>) {
        self.template = template;
    }

    fn set_canvas_size(&mut self, size: CanvasSize) {
        self.canvas = Some(size);
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<bool, RendererError> {
        if frame.index % self.every != 0 {
            return Ok(true);
        }
        let line = FrameLine {
            frame: frame.index,
            time: frame.time,
            canvas: self.canvas,
            marker_radius: self.template.as_ref().map(|t| t.circumradius),
            objects: &self.objects,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.lines_written += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ingest::OrbitalRecord,
        marker::{MarkerFactory, MarkerStyle},
        test_support::ts,
    };

    fn object(id: &str, lat: f64) -> RenderableObject<()> {
        RenderableObject {
            record: Rc::new(OrbitalRecord::new(id, ())),
            lat,
            lng: -45.0,
            alt: 0.0625,
        }
    }

    fn lines(buf: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn one_line_per_frame() {
        let mut r = JsonLinesRenderer::new(Vec::new());
        let t = ts("2020-07-13T00:00:00Z");
        GlobeRenderer::<()>::set_objects(&mut r, &[object("A", 10.0), object("B", -20.0)]);
        for index in 1..=3 {
            assert!(GlobeRenderer::<()>::render(&mut r, &RenderFrame { index, time: t }).unwrap());
        }
        assert_eq!(r.lines_written(), 3);

        let lines = lines(r.into_inner());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["frame"], 1);
        assert_eq!(lines[0]["time"], "2020-07-13T00:00:00Z");
        assert_eq!(lines[0]["objects"][1]["id"], "B");
        assert_eq!(lines[0]["objects"][1]["lat"], -20.0);
        assert!(lines[0].get("canvas").is_none());
    }

    #[test]
    fn every_nth_frame() {
        let mut r = JsonLinesRenderer::new(Vec::new()).with_every(5);
        let t = ts("2020-07-13T00:00:00Z");
        GlobeRenderer::<()>::set_canvas_size(
            &mut r,
            CanvasSize {
                width: 1000.0,
                height: 800.0,
            },
        );
        let mut factory = MarkerFactory::new(MarkerStyle::default());
        GlobeRenderer::<()>::set_object_template(&mut r, factory.template(Some(100.0)));
        for index in 1..=12 {
            GlobeRenderer::<()>::render(&mut r, &RenderFrame { index, time: t }).unwrap();
        }
        let lines = lines(r.into_inner());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["frame"], 10);
        assert_eq!(lines[1]["canvas"]["width"], 1000.0);
        assert!(lines[1]["marker_radius"].as_f64().unwrap() > 0.0);
    }
}
