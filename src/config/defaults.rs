// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for the client configuration.

// ==========================================================================
// API Defaults
// ==========================================================================

/// Default API origin. The dashboard's dev server proxies `/api` here.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8089";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Minimum accepted request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;

/// Maximum accepted request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 300_000;
