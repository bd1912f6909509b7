use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
