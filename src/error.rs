use thiserror::Error;

/// Errors that stop a scoring call.
///
/// Prior rejections and recoverable numerical problems in a likelihood
/// back end are not errors. Both are reported as a score of `-inf`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PidError {
    /// Static misconfiguration of the interface, the prior or the back-end options.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The observed data and initial conditions do not fit together.
    #[error("Data shape error: {0}")]
    DataShape(String),
    /// The likelihood back end refused to evaluate the request.
    #[error("Likelihood back end returned unrecoverable error")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PidError>;

pub(crate) fn config_err<T>(msg: impl Into<String>) -> Result<T> {
    Err(PidError::Configuration(msg.into()))
}

pub(crate) fn shape_err<T>(msg: impl Into<String>) -> Result<T> {
    Err(PidError::DataShape(msg.into()))
}
