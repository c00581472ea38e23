//! Error types for tocspy operations.
//!
//! The scroll spy itself never fails: a page that does not meet its
//! preconditions simply leaves it inactive (see [`crate::spy::Inactive`]).
//! These errors cover the surfaces around it: loading pages and
//! configuration, and wiring up the browser binding.

use thiserror::Error;

/// Errors that can occur while configuring or hosting the scroll spy.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JavaScript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, Error>;
