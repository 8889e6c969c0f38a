use std::{path::PathBuf, process::ExitCode};

use brc_parallel::{BrcResult, Config, summarize_file};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Prints `{station=min/mean/max, ...}` for a measurements file.
///
/// Tuning comes from BRC_CHUNK_SIZE, BRC_WORKERS, BRC_TABLE_CAPACITY and
/// BRC_HUGEPAGES; log verbosity from RUST_LOG.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Input file of `<station>;<temperature>` lines
    #[arg(default_value = "measurements.txt")]
    input: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg_attr(feature = "profiled", inline(never))]
fn run(args: &Args) -> BrcResult {
    let config = Config::from_env()?;
    let report = summarize_file(&args.input, &config)?;
    println!("{report}");
    Ok(())
}

#[cfg(feature = "profiled")]
fn profile(args: &Args) {
    let guard = match pprof::ProfilerGuardBuilder::default()
        .frequency(1000)
        .blocklist(&["libc", "libgcc", "pthread", "vdso"])
        .build()
    {
        Ok(guard) => guard,
        Err(err) => {
            tracing::warn!(%err, "profiler unavailable");
            return;
        }
    };

    for _ in 0..4 {
        let _ = run(args);
    }

    match guard.report().build() {
        Ok(report) => {
            let written = std::fs::File::create("flamegraph.svg")
                .map_err(|err| err.to_string())
                .and_then(|file| report.flamegraph(file).map_err(|err| err.to_string()));
            if let Err(err) = written {
                tracing::warn!(%err, "failed to write flamegraph");
            }
        }
        Err(err) => tracing::warn!(%err, "failed to build profile report"),
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    #[cfg(feature = "profiled")]
    profile(&args);

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
