//! Error types for PMML document handling
//!
//! Every failure surfaced to callers is a [`PmmlError`]. Regression-model
//! validation failures are grouped under [`ValidationError`] so callers can
//! tell "the document is fine but the model is unsupported" apart from I/O
//! and parse failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::ModelCategory;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PmmlError>;

#[derive(Debug, Error)]
pub enum PmmlError {
    #[error("could not open file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to find {category} named '{name}', models found are: {available:?}")]
    ModelNotFound {
        category: ModelCategory,
        name: String,
        available: Vec<String>,
    },

    #[error("unable to parse XML document at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("could not write document to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid query pattern '{pattern}': {reason}")]
    InvalidQuery { pattern: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Reasons a `RegressionModel` element is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("RegressionModel found with modelType='{0}', but only 'linearRegression' is supported")]
    UnsupportedModelType(String),

    #[error("RegressionModel found with functionName='{0}', but only 'regression' is supported")]
    UnsupportedFunctionName(String),

    #[error("RegressionModel found with normalizationMethod='{0}', but only 'none' is supported")]
    UnsupportedNormalization(String),

    #[error("no <RegressionTable> element found")]
    MissingRegressionTable,

    #[error("{0} <RegressionTable> elements found, but there must be only one")]
    MultipleRegressionTables(usize),

    #[error("element <{0}> found, but only <NumericPredictor> is supported")]
    UnsupportedPredictor(String),

    #[error("no exponent attribute found on any <NumericPredictor>")]
    MissingExponents,

    #[error("exponent {0} found, but only exponent=1 is supported")]
    UnsupportedExponent(String),
}

impl From<quick_xml::Error> for PmmlError {
    fn from(err: quick_xml::Error) -> Self {
        PmmlError::Xml(err.to_string())
    }
}
