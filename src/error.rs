use thiserror::Error;

pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Caller contract violations. Panels that merely do not fit the stock are
/// reported in the result instead.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid panel #{index}: {reason}")]
    InvalidPanel { index: usize, reason: String },
}
