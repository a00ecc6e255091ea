//! Keeps a full-viewport canvas lined up with the region of the page (or
//! window) it is supposed to fill.
//!
//! The renderer always draws at viewport size. Negative margins on the
//! element wrapping the canvas shift it so its visible part coincides with
//! the container.

use crate::{
    events::{ListenerId, ResizeEvents},
    frame::{FrameRequestId, FrameScheduler, WeakFrameScheduler},
    FrameComponent,
};
use globe_types::prelude::{CanvasSize, Margins, Rect, ViewportMetrics};
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};
use tracing::{debug, info};

/// The layout the view is embedded in
pub trait LayoutHost {
    /// Bounding rectangle of the hosting container
    fn container_rect(&self) -> Rect;

    /// Client size of the viewport
    fn viewport_size(&self) -> CanvasSize;

    fn set_inner_margins(&mut self, margins: Margins);
}

pub type SharedLayout = Rc<RefCell<dyn LayoutHost>>;

/// Margin applied before measuring, so the inner element doesn't
/// contribute to the container's own size
pub const RESET_MARGIN: f64 = -99999.0;

struct SyncState {
    layout: SharedLayout,
    mounted: Cell<bool>,
    pending: Cell<Option<FrameRequestId>>,
    canvas_size: Cell<Option<CanvasSize>>,
    margins: Cell<Option<Margins>>,
    measurements: Cell<usize>,
}

impl SyncState {
    fn schedule(self: &Rc<Self>, scheduler: &FrameScheduler) {
        if !self.mounted.get() || self.pending.get().is_some() {
            return;
        }
        let weak: Weak<SyncState> = Rc::downgrade(self);
        let id = scheduler.request_frame(move |_frame| {
            if let Some(state) = weak.upgrade() {
                state.pending.set(None);
                if state.mounted.get() {
                    state.measure();
                }
            }
        });
        self.pending.set(Some(id));
    }

    fn measure(&self) {
        let metrics = {
            let mut layout = self.layout.borrow_mut();
            layout.set_inner_margins(Margins::uniform(RESET_MARGIN));
            let metrics = ViewportMetrics::new(layout.container_rect(), layout.viewport_size());
            layout.set_inner_margins(metrics.margins());
            metrics
        };
        let margins = metrics.margins();
        let size = metrics.viewport();
        self.margins.set(Some(margins));
        self.canvas_size.set(Some(size));
        self.measurements.set(self.measurements.get() + 1);
        debug!(%margins, canvas = %size, "Measured viewport");
    }
}

/// Measures the layout on mount and after every resize, one frame later.
/// Resizes that arrive before that frame share one measurement.
pub struct ViewportSync {
    state: Rc<SyncState>,
    scheduler: FrameScheduler,
    events: ResizeEvents,
    listener: Option<ListenerId>,
}

impl std::fmt::Debug for ViewportSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportSync")
            .field("mounted", &self.state.mounted.get())
            .field("canvas_size", &self.state.canvas_size.get())
            .field("margins", &self.state.margins.get())
            .finish()
    }
}

impl ViewportSync {
    pub fn new(layout: SharedLayout, scheduler: &FrameScheduler, events: &ResizeEvents) -> Self {
        ViewportSync {
            state: Rc::new(SyncState {
                layout,
                mounted: Cell::new(false),
                pending: Cell::new(None),
                canvas_size: Cell::new(None),
                margins: Cell::new(None),
                measurements: Cell::new(0),
            }),
            scheduler: scheduler.clone(),
            events: events.clone(),
            listener: None,
        }
    }

    /// Latest published canvas size, none before the first measurement
    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.state.canvas_size.get()
    }

    pub fn margins(&self) -> Option<Margins> {
        self.state.margins.get()
    }

    pub fn measurements(&self) -> usize {
        self.state.measurements.get()
    }

    pub fn has_pending_measurement(&self) -> bool {
        self.state.pending.get().is_some()
    }
}

impl FrameComponent for ViewportSync {
    fn start(&mut self) {
        if self.state.mounted.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.state);
        let weak_sched: WeakFrameScheduler = self.scheduler.downgrade();
        self.listener = Some(self.events.add_listener(move || {
            if let (Some(state), Some(sched)) = (weak.upgrade(), weak_sched.upgrade()) {
                state.schedule(&sched);
            }
        }));
        self.state.schedule(&self.scheduler);
        info!("Viewport sync mounted");
    }

    fn stop(&mut self) {
        if !self.state.mounted.replace(false) {
            return;
        }
        if let Some(id) = self.listener.take() {
            self.events.remove_listener(id);
        }
        if let Some(id) = self.state.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        debug!(measurements = self.measurements(), "Viewport sync unmounted");
    }

    fn is_running(&self) -> bool {
        self.state.mounted.get()
    }
}

impl Drop for ViewportSync {
    fn drop(&mut self) {
        self.stop();
    }
}
