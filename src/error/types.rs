use thiserror::Error;

/// Unified result type for the Hellasort crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the visualizer runtime and sort engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
