use clap::Parser;
use ratelimit::Ratelimiter;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;

use globe_lib::{
    config::{parse_frame_step, Config},
    dataset::DatasetSource,
    events::ResizeEvents,
    frame::FrameScheduler,
    orbital::Sgp4Model,
    renderer::{GlobeRenderer, JsonLinesRenderer},
    units::Timestamp,
    view::{GlobeView, ViewOptions},
    viewport::SharedLayout,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Enable the dev GUI
    #[cfg(feature = "gui")]
    #[arg(long)]
    dev_gui: bool,

    /// Configuration toml file.
    ///
    /// Defaults are used when not provided.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The TLE dataset, a file path or '-' for stdin
    #[arg(long = "tle", default_value = "-")]
    dataset: DatasetSource,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Only emit every Nth frame
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Write JSON lines here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Simulated time per frame, overrides 'clock.frame-step' (e.g. "3s", "250ms")
    #[arg(long)]
    step: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let cfg = match opts.config.as_ref() {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    let mut view_opts = ViewOptions::from_config(&cfg, Timestamp::now())?;
    if let Some(step) = opts.step.as_deref() {
        view_opts.step = parse_frame_step(step)?;
    }

    let frame_rate = cfg.frame_rate()?;
    let ratelimiter = Ratelimiter::builder(1, Duration::from_secs_f64(1.0 / frame_rate))
        .max_tokens(1)
        .initial_available(1)
        .build()
        .map_err(|e| format!("Invalid frame rate {frame_rate}. {e:?}"))?;

    let scheduler = FrameScheduler::new();
    let events = ResizeEvents::new();

    #[cfg(feature = "gui")]
    if opts.dev_gui {
        let mut renderer = globe_lib::gui::GuiRenderer::new("Dev GUI", &events);
        let layout = renderer.layout();
        return run(&opts, view_opts, &scheduler, &events, layout, &mut renderer, &ratelimiter, &intr);
    }

    let out: Box<dyn Write> = match opts.output.as_ref() {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut renderer = JsonLinesRenderer::new(out).with_every(opts.every);
    let layout = headless::layout();
    run(&opts, view_opts, &scheduler, &events, layout, &mut renderer, &ratelimiter, &intr)
}

#[allow(clippy::too_many_arguments)]
fn run<R>(
    opts: &Opts,
    view_opts: ViewOptions,
    scheduler: &FrameScheduler,
    events: &ResizeEvents,
    layout: SharedLayout,
    renderer: &mut R,
    ratelimiter: &Ratelimiter,
    intr: &interruptor::Interruptor,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: GlobeRenderer<<Sgp4Model as globe_lib::orbital::OrbitalModel>::State>,
{
    let mut view = GlobeView::mount(Sgp4Model, view_opts, scheduler, events, layout)?;
    view.renderer_ready(renderer);

    info!(source = %opts.dataset, "Loading dataset");
    view.load_dataset(opts.dataset.fetch());

    let mut last_frame = Instant::now();
    loop {
        if intr.is_set() {
            break;
        }

        if let Err(sleep) = ratelimiter.try_wait() {
            std::thread::sleep(sleep);
            continue;
        }

        let now = Instant::now();
        let frame = scheduler.run_frame(now.duration_since(last_frame));
        last_frame = now;

        view.sync(renderer);
        if !renderer.render(&view.render_frame(&frame))? {
            break;
        }

        if opts.frames.map(|n| frame.index >= n).unwrap_or(false) {
            break;
        }
    }

    view.teardown();
    info!(
        frames = scheduler.last_frame().index,
        sim_time = %view.now(),
        objects = view.objects().len(),
        "Stopped"
    );

    Ok(())
}

mod headless {
    use globe_lib::viewport::{LayoutHost, SharedLayout};
    use globe_types::prelude::{CanvasSize, Margins, Rect};
    use std::{cell::RefCell, rc::Rc};

    /// A fixed 1920x1080 viewport, the whole of it is the container
    #[derive(Debug)]
    struct FixedLayout {
        size: CanvasSize,
    }

    impl LayoutHost for FixedLayout {
        fn container_rect(&self) -> Rect {
            Rect {
                top: 0.0,
                left: 0.0,
                width: self.size.width,
                height: self.size.height,
            }
        }

        fn viewport_size(&self) -> CanvasSize {
            self.size
        }

        fn set_inner_margins(&mut self, _margins: Margins) {}
    }

    pub fn layout() -> SharedLayout {
        Rc::new(RefCell::new(FixedLayout {
            size: CanvasSize {
                width: 1920.0,
                height: 1080.0,
            },
        }))
    }
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }
}
