// cargo run --bin ground-track -- --name "ISS (ZARYA)" --start 2020-07-12T21:16:01Z --step 30s --count 200 \
//     globe-tle/test_fixtures/leo_sample.txt /tmp/iss_track.csv

use clap::Parser;
use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;

use globe_lib::{
    config::parse_frame_step,
    dataset::DatasetSource,
    ingest::{ingest, IngestOptions},
    orbital::Sgp4Model,
    propagation::Propagator,
    units::Timestamp,
};

/// Write the ground track of one object as CSV
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Object name, as it appears in the dataset without the '0 ' prefix
    #[arg(short = 'n', long)]
    name: String,

    /// First sample time (RFC 3339), defaults to now
    #[arg(short = 's', long)]
    start: Option<String>,

    /// Time between samples
    #[arg(short = 't', long, default_value = "60s")]
    step: String,

    /// Number of samples
    #[arg(short = 'c', long, default_value_t = 100)]
    count: u64,

    /// The TLE dataset, a file path or '-' for stdin
    dataset: DatasetSource,

    /// Output file path to write
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let start = match opts.start.as_deref() {
        Some(s) => Timestamp::parse_rfc3339(s)?,
        None => Timestamp::now(),
    };
    let step = parse_frame_step(&opts.step)?;

    let raw = opts.dataset.fetch()?;
    let ingest_opts = IngestOptions {
        max_objects: usize::MAX,
        name_filter: None,
    };
    let (records, _report) = ingest(&Sgp4Model, &raw, &ingest_opts, start);
    let record = records
        .iter()
        .find(|r| r.id() == opts.name)
        .ok_or_else(|| format!("No object named '{}' in {}", opts.name, opts.dataset))?;

    let propagator = Propagator::new(Sgp4Model);
    let mut output = File::create(&opts.output)?;
    writeln!(output, "time,lat,lng,alt")?;

    let mut t = start;
    for _ in 0..opts.count {
        match propagator.position(record, t) {
            Ok(p) => writeln!(output, "{t},{},{},{}", p.lat, p.lng, p.alt)?,
            Err(e) => eprintln!("{t}: {e}"),
        }
        t += step;
    }

    Ok(())
}
