use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrcError {
  #[error("failed to open {}: {source}", .path.display())]
  FileAccess {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed record at byte {offset}: {reason}")]
  MalformedRecord { offset: usize, reason: &'static str },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("failed to start worker pool: {0}")]
  ThreadPool(String),
}

impl BrcError {
  pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    BrcError::FileAccess {
      path: path.into(),
      source,
    }
  }

  pub fn malformed(offset: usize, reason: &'static str) -> Self {
    BrcError::MalformedRecord { offset, reason }
  }
}

pub type BrcResult<T = ()> = Result<T, BrcError>;
