use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Embedding matrix has {rows} rows but the catalog has {entries} entries")]
    MatrixShape { rows: usize, entries: usize },

    #[error("Invalid encoder state: {0}")]
    InvalidEncoder(String),
}
