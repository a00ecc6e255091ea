// cargo run --bin tle-check -- --at 2020-07-13T00:00:00Z globe-tle/test_fixtures/leo_sample.txt
// RUST_LOG=debug shows why each dropped group was dropped

use clap::Parser;
use std::path::PathBuf;

use globe_lib::{
    config::Config,
    dataset::DatasetSource,
    ingest::ingest,
    orbital::Sgp4Model,
    units::Timestamp,
};

/// Ingest a TLE dataset and report what survives
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Configuration toml file, for the 'dataset' options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probe propagation time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<String>,

    /// List the accepted object names
    #[arg(short = 'l', long)]
    list: bool,

    /// The TLE dataset, a file path or '-' for stdin
    #[arg(default_value = "-")]
    dataset: DatasetSource,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let cfg = match opts.config.as_ref() {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    let at = match opts.at.as_deref() {
        Some(s) => Timestamp::parse_rfc3339(s)?,
        None => Timestamp::now(),
    };

    let raw = opts.dataset.fetch()?;
    let (records, report) = ingest(&Sgp4Model, &raw, &cfg.ingest_options()?, at);

    println!("Dataset: {}", opts.dataset);
    println!("Probe time: {at}");
    println!("Groups: {}", report.groups);
    println!("Malformed: {}", report.malformed);
    println!("Filtered: {}", report.filtered);
    println!("Parse failures: {}", report.parse_failures);
    println!("Probe failures: {}", report.probe_failures);
    println!("Truncated: {}", report.truncated);
    println!("Accepted: {}", report.accepted);

    if opts.list {
        for r in records.iter() {
            println!("  {} (epoch {})", r.id(), r.state().epoch());
        }
    }

    Ok(())
}
