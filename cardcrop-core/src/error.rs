use thiserror::Error;

/// Contract violations reported by the suppression and extraction steps.
///
/// An empty detection set is not an error; it produces an empty result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
