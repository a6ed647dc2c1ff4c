use thiserror::Error;

/// Errors from the parts of the crate that touch the outside world: configuration files and
/// presentation surfaces. Painting itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("surface error: {0}")]
    Surface(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
