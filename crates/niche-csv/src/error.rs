//! Error types for the niche-csv adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{export} export is missing the {column:?} column")]
  MissingColumn {
    export: &'static str,
    column: &'static str,
  },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
