//! Wires the components of a mounted globe together.
//!
//! The view owns the clock, the viewport sync, the dataset and the derived
//! per-frame state. After each scheduler frame the host calls
//! [`GlobeView::sync`], which pushes whatever changed to the renderer.

use crate::{
    clock::{ClockError, SimulatedClock, TimeDriver},
    config::{Config, ConfigError},
    dataset::{DatasetState, FetchError},
    events::ResizeEvents,
    frame::{FrameInfo, FrameScheduler},
    ingest::{ingest, IngestOptions, IngestReport, SharedRecord},
    marker::{MarkerFactory, MarkerStyle},
    orbital::OrbitalModel,
    propagation::{Propagator, RenderableObject},
    renderer::{GlobeRenderer, RenderFrame},
    scene::SceneMetrics,
    units::{Time, Timestamp},
    viewport::{SharedLayout, ViewportSync},
    FrameComponent,
};
use globe_types::prelude::CanvasSize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Clock(#[from] ClockError),
}

#[derive(Clone, Debug)]
pub struct ViewOptions {
    /// Simulated time at mount
    pub start: Timestamp,
    pub step: Time,
    pub ingest: IngestOptions,
    pub marker: MarkerStyle,
    pub camera_altitude: f64,
}

impl ViewOptions {
    pub fn new(start: Timestamp) -> Self {
        ViewOptions {
            start,
            step: Time::from_millis(SimulatedClock::DEFAULT_STEP_MILLIS),
            ingest: IngestOptions::default(),
            marker: MarkerStyle::default(),
            camera_altitude: Config::DEFAULT_CAMERA_ALTITUDE,
        }
    }

    /// `now` is used when the config doesn't pin the start time
    pub fn from_config(cfg: &Config, now: Timestamp) -> Result<Self, ConfigError> {
        Ok(ViewOptions {
            start: cfg.start()?.unwrap_or(now),
            step: cfg.frame_step()?,
            ingest: cfg.ingest_options()?,
            marker: cfg.marker_style()?,
            camera_altitude: cfg.camera_altitude(),
        })
    }
}

/// What the renderer was last given
#[derive(Copy, Clone, Debug, Default)]
struct Published {
    /// Simulated time and dataset generation of the object set
    objects: Option<(Timestamp, u64)>,
    canvas: Option<CanvasSize>,
}

pub struct GlobeView<M: OrbitalModel> {
    propagator: Propagator<M>,
    ingest: IngestOptions,
    camera_altitude: f64,
    dataset: DatasetState<M::State>,
    dataset_generation: u64,
    report: Option<IngestReport>,
    time: TimeDriver,
    viewport: ViewportSync,
    scene: SceneMetrics,
    markers: MarkerFactory,
    objects: Vec<RenderableObject<M::State>>,
    published: Published,
}

impl<M: OrbitalModel> GlobeView<M> {
    /// Create the view and start its frame-driven components
    pub fn mount(
        model: M,
        opts: ViewOptions,
        scheduler: &FrameScheduler,
        events: &ResizeEvents,
        layout: SharedLayout,
    ) -> Result<Self, ViewError> {
        let clock = SimulatedClock::new(opts.start, opts.step)?;
        let mut view = GlobeView {
            propagator: Propagator::new(model),
            ingest: opts.ingest,
            camera_altitude: opts.camera_altitude,
            dataset: DatasetState::Pending,
            dataset_generation: 0,
            report: None,
            time: TimeDriver::new(clock, scheduler),
            viewport: ViewportSync::new(layout, scheduler, events),
            scene: SceneMetrics::default(),
            markers: MarkerFactory::new(opts.marker),
            objects: Vec::new(),
            published: Published::default(),
        };
        view.time.start();
        view.viewport.start();
        info!(start = %opts.start, step = ?opts.step, "Mounted globe view");
        Ok(view)
    }

    /// Deliver the fetched dataset. A failed fetch leaves the view empty.
    pub fn load_dataset(&mut self, fetched: Result<String, FetchError>) {
        self.dataset_generation += 1;
        match fetched {
            Ok(raw) => {
                let (records, report) =
                    ingest(self.propagator.model(), &raw, &self.ingest, self.now());
                self.report = Some(report);
                self.dataset = DatasetState::Loaded(records);
            }
            Err(e) => {
                warn!(err = %e, "Dataset fetch failed, continuing without objects");
                self.report = None;
                self.dataset = DatasetState::Failed(e.to_string());
            }
        }
    }

    /// The renderer has finished initializing; configure the camera once and
    /// hand it the marker template for its scene radius
    pub fn renderer_ready<R: GlobeRenderer<M::State>>(&mut self, renderer: &mut R) {
        let first = !self.scene.is_ready();
        let radius = renderer.scene_radius();
        if self.scene.set_ready(radius) {
            info!(radius, "Renderer ready");
            renderer.set_object_template(self.markers.template(self.scene.radius()));
        }
        if first {
            renderer.point_of_view(self.camera_altitude);
        }
    }

    /// Push whatever changed since the last call to the renderer
    pub fn sync<R: GlobeRenderer<M::State>>(&mut self, renderer: &mut R) {
        let key = (self.now(), self.dataset_generation);
        if self.published.objects != Some(key) {
            self.objects = self.propagator.frame(self.dataset.records(), key.0);
            renderer.set_objects(&self.objects);
            self.published.objects = Some(key);
        }

        if let Some(size) = self.viewport.canvas_size() {
            if self.published.canvas != Some(size) {
                debug!(canvas = %size, "Publishing canvas size");
                renderer.set_canvas_size(size);
                self.published.canvas = Some(size);
            }
        }
    }

    pub fn render_frame(&self, frame: &FrameInfo) -> RenderFrame {
        RenderFrame {
            index: frame.index,
            time: self.now(),
        }
    }

    /// Stop the clock and the viewport sync. Nothing is scheduled or written
    /// on behalf of the view afterwards.
    pub fn teardown(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.time.stop();
        self.viewport.stop();
        info!(
            ticks = self.time.clock().ticks(),
            measurements = self.viewport.measurements(),
            "Tore down globe view"
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.time.is_running() || self.viewport.is_running()
    }

    pub fn now(&self) -> Timestamp {
        self.time.now()
    }

    pub fn clock(&self) -> SimulatedClock {
        self.time.clock()
    }

    pub fn objects(&self) -> &[RenderableObject<M::State>] {
        &self.objects
    }

    pub fn records(&self) -> &[SharedRecord<M::State>] {
        self.dataset.records()
    }

    pub fn dataset(&self) -> &DatasetState<M::State> {
        &self.dataset
    }

    pub fn ingest_report(&self) -> Option<&IngestReport> {
        self.report.as_ref()
    }

    pub fn scene(&self) -> &SceneMetrics {
        &self.scene
    }

    pub fn markers(&self) -> &MarkerFactory {
        &self.markers
    }

    pub fn viewport(&self) -> &ViewportSync {
        &self.viewport
    }
}

impl<M: OrbitalModel> Drop for GlobeView<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
