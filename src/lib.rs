// SPDX-License-Identifier: MPL-2.0
//! `nginxpulse_client` is the client core of the NginxPulse log analytics
//! dashboard.
//!
//! It provides an access-key aware HTTP client for the NginxPulse API, a
//! two-locale message catalog with persisted language preference, and the
//! small storage and event plumbing both rely on.

#![doc(html_root_url = "https://docs.rs/nginxpulse_client/0.1.0")]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod i18n;
pub mod pages;
pub mod paths;
pub mod storage;
