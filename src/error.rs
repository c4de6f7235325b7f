/// Error handling shared by every layer of the binding
use std::ffi::NulError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    /// The plotting library could not be initialized for this process
    #[error("PLplot library unavailable: {0}")]
    LibraryUnavailable(String),

    /// A string argument cannot cross the C boundary
    #[error("String argument contains an interior NUL byte: {0}")]
    InvalidString(#[from] NulError),

    /// A point count larger than one of the coordinate slices
    #[error("Point count {requested} exceeds coordinate data (x: {x_len}, y: {y_len})")]
    LengthMismatch {
        requested: usize,
        x_len: usize,
        y_len: usize,
    },

    /// More points than a native call can describe
    #[error("Point count {0} does not fit in a native PLINT")]
    TooManyPoints(usize),

    #[error("Invalid value for option -{option}: {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Unrecognized option {0}")]
    UnknownOption(String),

    #[error("Argument missing for -{0} option")]
    MissingArgument(String),

    /// A command-line error with the usage text to show alongside it
    #[error("{error}")]
    Usage {
        error: Box<PlotError>,
        usage: String,
    },

    /// Failure reported by a backend, passed through untouched
    #[error("{0}")]
    Backend(String),
}

pub type PlotResult<T> = Result<T, PlotError>;

impl PlotError {
    pub(crate) fn invalid_option(option: &str, reason: impl Into<String>) -> Self {
        PlotError::InvalidOption {
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    /// Usage text attached by the option parser, if any
    pub fn usage_text(&self) -> Option<&str> {
        match self {
            PlotError::Usage { usage, .. } => Some(usage),
            _ => None,
        }
    }

    /// The error with any usage text stripped off
    pub fn into_inner(self) -> PlotError {
        match self {
            PlotError::Usage { error, .. } => *error,
            other => other,
        }
    }
}

/// Log error and continue execution without panicking
pub fn log_error(error: &PlotError) {
    tracing::error!("{}", error);
}

/// Handle recoverable errors gracefully
pub fn handle_recoverable<T>(result: PlotResult<T>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log_error(&e);
            default
        }
    }
}
