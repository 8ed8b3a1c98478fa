use thiserror::Error;

/// Raised by a user-supplied function (reducer, predicate, project, tap) invoked while
/// pushing a value through an operator graph.
#[derive(Debug, Error, Clone)]
#[error("operator error in `{operator}`: {message}")]
pub struct OperatorError {
    pub operator: &'static str,
    pub message: String,
}

impl OperatorError {
    pub fn new(operator: &'static str, message: impl Into<String>) -> Self { Self { operator, message: message.into() } }
}

/// Raised by a source adapter (`fromPromise`, `fromEvent`, `fromWebSocket`) when the
/// underlying producer fails.
#[derive(Debug, Error, Clone)]
pub enum AdapterError {
    #[error("promise rejected: {0}")]
    Rejected(String),
    #[error("socket error: {0}")]
    Socket(String),
    #[error("event source error: {0}")]
    Event(String),
}
