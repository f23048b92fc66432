//! Unified error handling for the datagate runtime.
//!
//! Every fallible path in the crate funnels into [`RuntimeError`] so the
//! dispatcher can map any outcome to a stable wire-level error code. Nothing
//! below the dispatcher is expected to format errors for callers.

use thiserror::Error;

/// Error type covering every failure the runtime can surface to a caller.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No function is registered under the requested method name.
    #[error("no corresponding function found for '{0}'")]
    MethodNotFound(String),

    /// The request was denied, either explicitly by the function body or by
    /// the built-in permission rules. The transaction never commits on this
    /// path.
    #[error("not permitted to access '{0}'")]
    NotPermitted(String),

    /// The function completed and the permission outcome was resolved, but
    /// no usable result was produced.
    #[error("no result returned from function '{0}'")]
    NoResult(String),

    /// An error raised by function-body logic itself, including failures of
    /// the data access it performed.
    #[error("function error: {0}")]
    Function(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Catch-all for non-domain failures; carries a stringified cause.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Stable JSON-RPC error codes surfaced to callers.
///
/// `-32601` is the code the JSON-RPC 2.0 spec reserves for method-not-found;
/// the remaining codes live in the implementation-defined `-32000..=-32099`
/// server error range.
pub mod codes {
    pub const UNKNOWN_ERROR: i64 = -32001;
    pub const NO_RESULT: i64 = -32002;
    pub const NOT_PERMITTED: i64 = -32003;
    pub const FUNCTION_ERROR: i64 = -32004;
    pub const DATABASE_ERROR: i64 = -32005;
    pub const METHOD_NOT_FOUND: i64 = -32601;
}

impl RuntimeError {
    /// The wire-level error code for this error.
    pub fn code(&self) -> i64 {
        match self {
            RuntimeError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            RuntimeError::NotPermitted(_) => codes::NOT_PERMITTED,
            RuntimeError::NoResult(_) => codes::NO_RESULT,
            RuntimeError::Function(_) => codes::FUNCTION_ERROR,
            RuntimeError::Database(_) | RuntimeError::Storage(_) => codes::DATABASE_ERROR,
            RuntimeError::Serde(_) | RuntimeError::Config(_) | RuntimeError::Unknown(_) => {
                codes::UNKNOWN_ERROR
            }
        }
    }

    /// Whether this error is an authorization denial rather than a fault.
    pub fn is_denial(&self) -> bool {
        matches!(self, RuntimeError::NotPermitted(_))
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            RuntimeError::MethodNotFound("x".into()).code(),
            codes::METHOD_NOT_FOUND
        );
        assert_eq!(
            RuntimeError::NotPermitted("x".into()).code(),
            codes::NOT_PERMITTED
        );
        assert_eq!(RuntimeError::NoResult("x".into()).code(), codes::NO_RESULT);
        assert_eq!(
            RuntimeError::Function("boom".into()).code(),
            codes::FUNCTION_ERROR
        );
        assert_eq!(
            RuntimeError::Unknown("?".into()).code(),
            codes::UNKNOWN_ERROR
        );
    }

    #[test]
    fn test_denial_classification() {
        assert!(RuntimeError::NotPermitted("createPost".into()).is_denial());
        assert!(!RuntimeError::Function("boom".into()).is_denial());
    }
}
