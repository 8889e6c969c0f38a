use rayon::prelude::*;
use tracing::debug;

use crate::{
    aggregator::aggregate_chunk,
    chunk::Chunk,
    config::Config,
    error::{BrcError, BrcResult},
    station_map::{StationMapOptions, StationTable},
};

/// Fixed-size worker pool that aggregates chunks independently.
///
/// Workers share only the read-only input buffer; each chunk's table is
/// owned by the task that builds it until it is handed back here.
pub struct ParallelExecutor {
    pool: rayon::ThreadPool,
    table_opts: StationMapOptions,
}

impl ParallelExecutor {
    pub fn new(config: &Config) -> BrcResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("brc-worker-{i}"))
            .build()
            .map_err(|e| BrcError::ThreadPool(e.to_string()))?;

        Ok(Self {
            pool,
            table_opts: StationMapOptions::from(config),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Aggregates every chunk, one task per chunk, and returns the tables in
    /// chunk order.
    ///
    /// The first malformed record fails the whole run; chunks not yet started
    /// are skipped and finished tables are dropped.
    pub fn run(&self, chunks: &[Chunk<'_>]) -> BrcResult<Vec<StationTable>> {
        let table_opts = &self.table_opts;
        self.pool.install(|| {
            chunks
                .par_iter()
                .with_max_len(1)
                .map(|chunk| -> BrcResult<StationTable> {
                    let table = aggregate_chunk(*chunk, table_opts)?;
                    debug!(
                        start = chunk.start(),
                        end = chunk.end(),
                        stations = table.len(),
                        worker = ?rayon::current_thread_index(),
                        "chunk aggregated"
                    );
                    Ok(table)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod test {
    use super::ParallelExecutor;
    use crate::chunk::ChunkScanner;
    use crate::config::Config;
    use crate::error::BrcError;
    use crate::station_map::StationNameKeyView;

    fn config(workers: usize) -> Config {
        Config::default().with_workers(workers).with_table_capacity(8)
    }

    #[test]
    fn test_one_table_per_chunk_in_order() {
        let input = b"a;1.0\nb;2.0\nc;3.0\nd;4.0\n";
        let chunks: Vec<_> = ChunkScanner::new(input, 1).collect();
        let executor = ParallelExecutor::new(&config(3)).unwrap();
        assert_eq!(executor.workers(), 3);

        let tables = executor.run(&chunks).unwrap();
        assert_eq!(tables.len(), 4);
        for (table, name) in tables.iter().zip([b"a", b"b", b"c", b"d"]) {
            assert_eq!(table.len(), 1);
            assert!(table.get(StationNameKeyView::new(name)).is_some());
        }
    }

    #[test]
    fn test_failure_in_any_chunk_fails_run() {
        let mut input = Vec::new();
        for i in 0..200 {
            input.extend_from_slice(format!("s{};{}.5\n", i % 7, i).as_bytes());
        }
        input.extend_from_slice(b"oops\n");
        for i in 0..200 {
            input.extend_from_slice(format!("t{};-{}.0\n", i % 5, i).as_bytes());
        }
        let chunks: Vec<_> = ChunkScanner::new(&input, 64).collect();
        let executor = ParallelExecutor::new(&config(4)).unwrap();

        let err = executor.run(&chunks).unwrap_err();
        assert!(matches!(err, BrcError::MalformedRecord { .. }));
    }

    #[test]
    fn test_no_chunks() {
        let executor = ParallelExecutor::new(&config(2)).unwrap();
        assert!(executor.run(&[]).unwrap().is_empty());
    }
}
