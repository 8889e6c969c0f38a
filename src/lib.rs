//! Per-station min/mean/max over `<station>;<temperature>` files.
//!
//! The input is split into line-aligned chunks, each chunk is aggregated on a
//! worker pool, and the per-chunk tables are folded into one sorted report.

pub mod aggregator;
pub mod chunk;
pub mod config;
pub mod error;
pub mod executor;
pub mod memops;
pub mod mmap_allocator;
pub mod parser;
pub mod report;
pub mod station_map;
pub mod temperature_summary;

use std::{fs::File, path::Path};

use memmap2::MmapOptions;
use tracing::{debug, info};

use crate::{
    chunk::{Chunk, ChunkScanner},
    executor::ParallelExecutor,
    report::merge_tables,
    station_map::StationMapOptions,
};

pub use config::Config;
pub use error::{BrcError, BrcResult};
pub use report::Report;

/// Runs the whole pipeline over an in-memory buffer.
#[cfg_attr(feature = "profiled", inline(never))]
pub fn summarize_bytes(buffer: &[u8], config: &Config) -> BrcResult<Report> {
    config.validate()?;

    let chunks: Vec<Chunk<'_>> = ChunkScanner::new(buffer, config.chunk_size).collect();
    info!(
        bytes = buffer.len(),
        chunks = chunks.len(),
        workers = config.workers,
        "aggregating"
    );

    let executor = ParallelExecutor::new(config)?;
    let tables = executor.run(&chunks)?;

    let merged = merge_tables(tables, &StationMapOptions::from(config));
    info!(stations = merged.len(), "merged chunk tables");

    Ok(Report::from_table(merged))
}

/// Maps `path` read-only and summarizes it.
///
/// The mapping outlives every worker task since it is only dropped after
/// `summarize_bytes` returns.
pub fn summarize_file(path: &Path, config: &Config) -> BrcResult<Report> {
    let file = File::open(path).map_err(|err| BrcError::file_access(path, err))?;
    let len = file
        .metadata()
        .map_err(|err| BrcError::file_access(path, err))?
        .len();
    if len == 0 {
        debug!(path = %path.display(), "empty input");
        return Ok(Report::empty());
    }

    let mmap = unsafe { MmapOptions::new().map(&file) }
        .map_err(|err| BrcError::file_access(path, err))?;
    #[cfg(unix)]
    mmap.advise(memmap2::Advice::Sequential)
        .map_err(|err| BrcError::file_access(path, err))?;
    debug!(path = %path.display(), len, "mapped input");

    summarize_bytes(&mmap, config)
}
