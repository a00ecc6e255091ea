//! Drive a mounted view with the SGP4 model and the JSON lines renderer,
//! frame by frame, the same way the `globe` binary does

use globe_lib::{
    config::Config,
    dataset::{DatasetSource, DatasetState},
    events::ResizeEvents,
    frame::FrameScheduler,
    orbital::{Sgp4Model, Sgp4State},
    renderer::{GlobeRenderer, JsonLinesRenderer},
    units::{Time, Timestamp},
    view::{GlobeView, ViewOptions},
    viewport::{LayoutHost, RESET_MARGIN},
};
use globe_types::prelude::{CanvasSize, Margins, Rect};
use std::{cell::RefCell, rc::Rc, time::Duration};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../globe-tle/test_fixtures/leo_sample.txt");

/// A page where the globe sits in a 600x400 box below a 64px header
#[derive(Debug)]
struct PageLayout {
    viewport: CanvasSize,
    margins: Vec<Margins>,
}

impl LayoutHost for PageLayout {
    fn container_rect(&self) -> Rect {
        Rect {
            top: 64.0,
            left: 0.0,
            width: 600.0,
            height: 400.0,
        }
    }

    fn viewport_size(&self) -> CanvasSize {
        self.viewport
    }

    fn set_inner_margins(&mut self, margins: Margins) {
        self.margins.push(margins);
    }
}

fn page() -> Rc<RefCell<PageLayout>> {
    Rc::new(RefCell::new(PageLayout {
        viewport: CanvasSize {
            width: 1024.0,
            height: 768.0,
        },
        margins: Vec::new(),
    }))
}

fn options() -> ViewOptions {
    let cfg = Config::load("../configs/leo_sample.toml").unwrap();
    ViewOptions::from_config(&cfg, Timestamp::now()).unwrap()
}

#[test]
fn leo_sample_frames() {
    let sched = FrameScheduler::new();
    let events = ResizeEvents::new();
    let layout = page();
    let opts = options();
    let start = opts.start;
    assert_eq!(start, Timestamp::parse_rfc3339("2020-07-12T21:16:01Z").unwrap());

    let mut renderer = JsonLinesRenderer::new(Vec::new());
    let mut view = GlobeView::mount(Sgp4Model, opts, &sched, &events, layout.clone()).unwrap();
    view.renderer_ready(&mut renderer);
    assert_eq!(renderer.camera_altitude(), Some(2.0));

    view.load_dataset(DatasetSource::file(FIXTURE).fetch());
    let report = *view.ingest_report().unwrap();
    assert_eq!(report.groups, 4);
    assert_eq!(report.malformed, 1);
    assert_eq!(report.accepted, view.records().len());
    assert!(matches!(view.dataset(), DatasetState::Loaded(_)));

    for _ in 0..6 {
        let frame = sched.run_frame(Duration::from_millis(33));
        view.sync(&mut renderer);
        assert!(GlobeRenderer::<Sgp4State>::render(&mut renderer, &view.render_frame(&frame)).unwrap());
    }

    assert_eq!(view.clock().ticks(), 6);
    assert_eq!(view.now(), start + Time::from_secs(60.0));

    let iss = view
        .objects()
        .iter()
        .find(|o| o.id() == "ISS (ZARYA)")
        .expect("ISS is close to its epoch");
    assert!((-90.0..=90.0).contains(&iss.lat));
    assert!((-180.0..=180.0).contains(&iss.lng));
    let height_km = iss.alt * 6371.0;
    assert!((300.0..500.0).contains(&height_km), "{height_km}");

    // One measurement for the initial mount, a reset then the real margins
    {
        let l = layout.borrow();
        assert_eq!(l.margins.len(), 2);
        assert_eq!(l.margins[0], Margins::uniform(RESET_MARGIN));
        assert_eq!(
            l.margins[1],
            Margins {
                top: -64.0,
                right: -424.0,
                bottom: -304.0,
                left: 0.0,
            }
        );
    }

    view.teardown();
    assert!(!view.is_mounted());
    sched.run_frame(Duration::from_millis(33));
    assert_eq!(view.clock().ticks(), 6);
    assert_eq!(sched.pending(), 0);

    assert_eq!(renderer.lines_written(), 6);
    let out = String::from_utf8(renderer.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5]["frame"], 6);
    assert_eq!(lines[5]["canvas"]["width"], 1024.0);
    assert!(lines[5]["marker_radius"].as_f64().unwrap() > 0.0);
    assert!(lines[5]["objects"]
        .as_array()
        .unwrap()
        .iter()
        .any(|o| o["id"] == "ISS (ZARYA)"));
}

#[test]
fn resize_while_running() {
    let sched = FrameScheduler::new();
    let events = ResizeEvents::new();
    let layout = page();
    let mut renderer = JsonLinesRenderer::new(Vec::new()).with_every(100);
    let mut view = GlobeView::mount(Sgp4Model, options(), &sched, &events, layout.clone()).unwrap();
    view.renderer_ready(&mut renderer);

    sched.run_frame(Duration::from_millis(33));
    view.sync(&mut renderer);

    layout.borrow_mut().viewport = CanvasSize {
        width: 800.0,
        height: 600.0,
    };
    // A burst of resize events is measured once, on the next frame
    for _ in 0..5 {
        events.dispatch();
    }
    sched.run_frame(Duration::from_millis(33));
    view.sync(&mut renderer);

    assert_eq!(view.viewport().measurements(), 2);
    assert_eq!(
        view.viewport().canvas_size(),
        Some(CanvasSize {
            width: 800.0,
            height: 600.0,
        })
    );
    assert_eq!(layout.borrow().margins.last().unwrap().right, -200.0);

    drop(view);
    events.dispatch();
    sched.run_frame(Duration::from_millis(33));
    assert_eq!(layout.borrow().margins.len(), 4);
}
