use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Incomplete artifact: {0}")]
    IncompleteArtifact(String),

    #[error("Similarity error: {0}")]
    Similarity(#[from] fitlife_similarity::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
