use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind endpoint {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove stale endpoint {path}: {source}")]
    StaleEndpoint {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to spawn server thread: {0}")]
    Spawn(std::io::Error),
}
