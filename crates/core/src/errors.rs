//! Errors raised while resolving or evaluating a filter.

use thiserror::Error;

/// Hard failures of a filter call.
///
/// Ordinary non-matches are never errors: a value comparison across
/// mismatched domains, a missing tag, or a malformed search token simply
/// evaluates to `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A date, time, or duration operand could not be understood.
    #[error("invalid time expression: {0}")]
    InvalidTimeExpression(String),

    /// A value query did not follow `[!]field <op> value`.
    #[error("invalid value query: {0}")]
    InvalidValueQuery(String),

    /// A raw filter option could not be resolved.
    #[error("invalid option '{option}': {message}")]
    InvalidOption { option: String, message: String },
}
