//! Errors in the library.
use thiserror::Error;

/// Errors raised by the metric accumulation and dispatch engine.
///
/// All of them are returned synchronously to the caller of the operation
/// that produced them. Nothing in the engine logs-and-continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlogError {
    /// An explicit accumulation targeted a metric that is not registered.
    #[error("Unknown metric: {0}")]
    UnknownMetricError(String),

    /// An expression referenced a field that is absent from the event.
    #[error("Missing field: {0}")]
    MissingFieldError(String),

    /// An expression named a transform function outside the fixed registry.
    #[error("Unknown transform '{0}', expected one of: clip, int")]
    UnknownTransformError(String),

    /// An expression could not be parsed.
    #[error("Invalid expression: '{0}'")]
    InvalidExpressionError(String),

    /// Static configuration of a metric is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfigurationError(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// An aggregation method was called on a logger without metrics.
    #[error("Logger '{0}' has no metrics. Hint: call `add_metrics(...)` first")]
    NoMetricsError(String),
}
