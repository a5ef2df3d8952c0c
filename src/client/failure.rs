// SPDX-License-Identifier: MPL-2.0
//! Classification of failed calls into a single message.

use reqwest::StatusCode;
use serde::Deserialize;

/// Catalog key of the generic failure message.
pub const REQUEST_FAILED_KEY: &str = "common-request-failed";

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

/// Everything known about a failed call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    /// Response status, when a response arrived at all.
    pub status: Option<StatusCode>,
    /// The `error` string of a JSON response body.
    pub server_message: Option<String>,
    /// Description of a transport-level failure (connect, timeout, decode).
    pub transport_message: Option<String>,
}

impl Failure {
    /// A response arrived with a non-success status.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self {
            status: Some(status),
            server_message: server_error_message(body),
            transport_message: None,
        }
    }

    /// No usable response arrived.
    pub fn transport(description: impl Into<String>) -> Self {
        Self {
            status: None,
            server_message: None,
            transport_message: Some(description.into()),
        }
    }

    /// Server message, else transport description, else `fallback()`.
    pub fn message(&self, fallback: impl FnOnce() -> String) -> String {
        self.server_message
            .clone()
            .or_else(|| self.transport_message.clone())
            .unwrap_or_else(fallback)
    }

    /// Only `401 Unauthorized` asks for a new access key; `403` does not.
    pub fn requires_access_key(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Extracts a non-empty string `error` field from a JSON body.
fn server_error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.error? {
        serde_json::Value::String(message) if !message.is_empty() => Some(message),
        _ => None,
    }
}
