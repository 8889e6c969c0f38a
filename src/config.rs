use std::str::FromStr;

use crate::error::{BrcError, BrcResult};

/// Target chunk size in bytes before line alignment.
pub const DEFAULT_CHUNK_SIZE: usize = 40 * 1024 * 1024;

/// Initial number of stations each per-chunk table is sized for.
pub const DEFAULT_TABLE_CAPACITY: usize = 1024;

pub const CHUNK_SIZE_VAR: &str = "BRC_CHUNK_SIZE";
pub const WORKERS_VAR: &str = "BRC_WORKERS";
pub const TABLE_CAPACITY_VAR: &str = "BRC_TABLE_CAPACITY";
pub const HUGEPAGES_VAR: &str = "BRC_HUGEPAGES";

/// Tuning knobs for a single summarization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub chunk_size: usize,
    pub workers: usize,
    pub table_capacity: usize,
    pub request_hugepage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: num_cpus::get(),
            table_capacity: DEFAULT_TABLE_CAPACITY,
            request_hugepage: false,
        }
    }
}

impl Config {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_table_capacity(mut self, table_capacity: usize) -> Self {
        self.table_capacity = table_capacity;
        self
    }

    pub fn with_hugepages(mut self, request_hugepage: bool) -> Self {
        self.request_hugepage = request_hugepage;
        self
    }

    /// Defaults overridden by any `BRC_*` variables present in the environment.
    pub fn from_env() -> BrcResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> BrcResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(CHUNK_SIZE_VAR) {
            config.chunk_size = parse_var(CHUNK_SIZE_VAR, &v)?;
        }
        if let Some(v) = lookup(WORKERS_VAR) {
            config.workers = parse_var(WORKERS_VAR, &v)?;
        }
        if let Some(v) = lookup(TABLE_CAPACITY_VAR) {
            config.table_capacity = parse_var(TABLE_CAPACITY_VAR, &v)?;
        }
        if let Some(v) = lookup(HUGEPAGES_VAR) {
            config.request_hugepage = match v.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(BrcError::InvalidConfig(format!(
                        "{HUGEPAGES_VAR}: expected a boolean, got {other:?}"
                    )));
                }
            };
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BrcResult {
        if self.chunk_size == 0 {
            return Err(BrcError::InvalidConfig(
                "chunk size must be at least one byte".to_owned(),
            ));
        }
        if self.workers == 0 {
            return Err(BrcError::InvalidConfig(
                "worker pool needs at least one thread".to_owned(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> BrcResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| BrcError::InvalidConfig(format!("{name}={value:?}: {err}")))
}
