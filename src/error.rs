// SPDX-License-Identifier: MPL-2.0
//! Crate-wide error type.
//!
//! API calls never surface these directly: a failed request always resolves to
//! [`ApiError`], which carries nothing but a human-readable message. The
//! variants below cover everything around the calls (configuration, local
//! storage, client construction, command-line usage) and let the CLI fold an
//! `ApiError` into the same `Result`.

use thiserror::Error;

/// The single, uniform failure shape returned by every API call.
///
/// Transport failures, timeouts, server-reported errors and authorization
/// failures all collapse into this type. The message is already resolved
/// (server `error` field, transport description, or localized fallback).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The resolved, human-readable failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("HTTP Error: {0}")]
    Http(String),

    #[error("Usage Error: {0}")]
    Usage(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(err: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<pico_args::Error> for Error {
    fn from(err: pico_args::Error) -> Self {
        Error::Usage(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
