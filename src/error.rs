use std::fmt;

use thiserror::Error;

/// A filter specification that does not have the documented shape.
///
/// This is the only condition that aborts a query; everything else degrades
/// into a [`Diagnostic`].
#[derive(Debug, Error, PartialEq)]
pub enum FilterSpecError {
    #[error("filter specification must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("filter '{key}': unsupported operator {op:?}")]
    UnknownOperator { key: String, op: String },

    #[error("filter '{key}': structured clause is missing \"value\"")]
    MissingValue { key: String },

    #[error("filter '{key}': value must be a string, number or boolean, got {kind}")]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("zip_radius: {0}")]
    InvalidZipRadius(String),
}

/// A recoverable condition reported alongside query results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Diagnostic {
    /// A filter key with no entry in the data dictionary; the key was skipped.
    UnrecognizedFilterKey(String),
    /// No terms and no radius clause remained; the result is empty.
    EmptyPredicate,
    /// A postal code with no gazetteer entry within ±2; rows with it were
    /// excluded from the radius match.
    UnresolvableLocation(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedFilterKey(key) => {
                write!(f, "\"{key}\" not found in the data dictionary")
            }
            Diagnostic::EmptyPredicate => f.write_str("query is empty"),
            Diagnostic::UnresolvableLocation(zip) => {
                write!(f, "postal code \"{zip}\" not found in the gazetteer")
            }
        }
    }
}
