// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the application
//!
//! Errors fall into two groups: fatal ones that stop the run before or
//! instead of touching any display, and per-display ones that are reported
//! while the dispatch loop carries on with the next display.

use std::path::PathBuf;

use thiserror::Error;

use crate::invocation::Feature;

/// Malformed, missing or unrecognized command line tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A token that is not part of the grammar
    #[error("invalid argument `{token}`: {reason}")]
    InvalidArgument { token: String, reason: String },

    /// A required token was not supplied
    #[error("no {what} provided for `{after}`")]
    MissingArgument { what: &'static str, after: String },

    /// A numeric token outside its accepted bounds
    #[error("{what} {value} out of range ({min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Failure affecting a single display; never aborts the dispatch loop
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("failed to open display: {0:#}")]
    Open(#[source] anyhow::Error),

    #[error("failed to close display: {0:#}")]
    Close(#[source] anyhow::Error),

    #[error("failed to read {feature}: {source:#}")]
    Read {
        feature: Feature,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write {feature}: {source:#}")]
    Write {
        feature: Feature,
        #[source]
        source: anyhow::Error,
    },

    /// The display accepted the write but reads back a different value
    #[error("{feature} verification failed: wrote {expected}, display reports {actual}")]
    Verification {
        feature: Feature,
        expected: u16,
        actual: u16,
    },

    /// A relative adjustment left 0..=100 under the reject policy
    #[error("adjusting {feature} from {current} by {delta:+} leaves 0..=100")]
    AdjustmentOutOfRange {
        feature: Feature,
        current: u16,
        delta: i32,
    },
}

/// Fatal application error; ends the run with exit status 1
#[derive(Error, Debug)]
pub enum AppError {
    #[error("no displays found")]
    NoDisplaysFound,

    /// Explicit target beyond the displays present at runtime
    #[error("display {index} requested but only {available} display(s) found")]
    TargetOutOfRange { index: usize, available: usize },

    #[error("failed to enumerate displays: {0:#}")]
    Enumerate(#[source] anyhow::Error),

    #[error("configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
