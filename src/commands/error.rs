use thiserror::Error;

/// Failures a query can end in. All of them exit with status 1.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum QueryError {
    #[error("package '{0}' was not found in any search root")]
    NotFound(String),

    #[error("malformed invocation: {0}")]
    MalformedInvocation(String),
}
