/**
 * Error type for every fallible operation on boxes, geometries, variables,
 * blocks, levels, and meshes. Messages name the offending argument and the
 * constraint it violated, e.g. `'level_numbers' should not be empty`.
 */
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}




// ============================================================================
impl Error {

    pub(crate) fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_state<S: Into<String>>(message: S) -> Self {
        Error::InvalidState(message.into())
    }

    pub(crate) fn not_found<S: Into<String>>(message: S) -> Self {
        Error::NotFound(message.into())
    }

    pub(crate) fn checkpoint<S: Into<String>>(message: S) -> Self {
        Error::Checkpoint(message.into())
    }

    /**
     * Return the message carried by the error, without the kind prefix.
     */
    pub fn message(&self) -> &str {
        use Error::*;

        match self {
            InvalidArgument(m) | InvalidState(m) | NotFound(m) | Checkpoint(m) => m,
        }
    }
}




/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
