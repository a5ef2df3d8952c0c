// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the dashboard client.
//!
//! This module provides localization capabilities using the Fluent localization system.
//! It handles locale normalization, initial locale resolution, runtime switching
//! and number formatting.
//!
//! # Features
//!
//! - A closed set of supported locales ([`Locale`]) with a default member
//! - Total normalization of free-form input ([`normalize_locale`])
//! - Startup resolution from query string, then storage, then default
//! - Runtime switching kept in sync with storage, catalog and document
//!   ([`LocaleManager`])
//! - Decimal and percent formatting in the active locale
//!   ([`LocaleManager::format_decimal`], [`LocaleManager::format_percent`])

pub mod fluent;
mod format;
pub mod manager;

pub use fluent::Catalog;
pub use manager::{
    locale_from_query, resolve_initial_locale, stored_locale, Document, DocumentHandle,
    DocumentState, LocaleManager, LocaleManagerBuilder,
};

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// A supported UI locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

/// Recognized spellings, already trimmed and lowercased.
const ALIASES: &[(&str, Locale)] = &[
    ("en", Locale::EnUs),
    ("en-us", Locale::EnUs),
    ("en_us", Locale::EnUs),
    ("zh", Locale::ZhCn),
    ("zh-cn", Locale::ZhCn),
    ("zh_cn", Locale::ZhCn),
    ("zh-hans", Locale::ZhCn),
    ("zh_hans", Locale::ZhCn),
];

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::ZhCn, Locale::EnUs];

    pub const DEFAULT: Locale = Locale::ZhCn;

    /// Canonical BCP 47 code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::EnUs => "en-US",
        }
    }

    pub fn language_identifier(self) -> LanguageIdentifier {
        self.code().parse().unwrap_or_default()
    }
}

/// Maps arbitrary input onto a supported locale.
///
/// Input is trimmed and lowercased before matching the alias table. Anything
/// unrecognized, empty or absent yields [`Locale::DEFAULT`].
pub fn normalize_locale(value: Option<&str>) -> Locale {
    let Some(value) = value else {
        return Locale::DEFAULT;
    };
    let normalized = value.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(Locale::DEFAULT, |(_, locale)| *locale)
}

impl FromStr for Locale {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(normalize_locale(Some(s)))
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        self.code()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_aliases_normalize_to_en_us() {
        for input in ["en", "EN-US", "en_us", "  En-Us  ", "en-US"] {
            assert_eq!(normalize_locale(Some(input)), Locale::EnUs, "input {input:?}");
        }
    }

    #[test]
    fn chinese_aliases_normalize_to_zh_cn() {
        for input in ["zh", "ZH-CN", "zh_cn", "zh-Hans", "zh_HANS"] {
            assert_eq!(normalize_locale(Some(input)), Locale::ZhCn, "input {input:?}");
        }
    }

    #[test]
    fn unknown_or_empty_input_yields_default() {
        for input in ["", "   ", "fr", "en-GB", "english", "zh-TW"] {
            assert_eq!(normalize_locale(Some(input)), Locale::DEFAULT, "input {input:?}");
        }
        assert_eq!(normalize_locale(None), Locale::ZhCn);
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["en", "EN_us", "zh-hans", "fr", "", "en-US", "zh-CN"] {
            let once = normalize_locale(Some(input));
            let twice = normalize_locale(Some(once.code()));
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn from_str_never_fails() {
        let locale: Locale = "whatever".parse().unwrap();
        assert_eq!(locale, Locale::DEFAULT);
        let locale: Locale = "en".parse().unwrap();
        assert_eq!(locale, Locale::EnUs);
    }

    #[test]
    fn display_uses_canonical_code() {
        assert_eq!(Locale::EnUs.to_string(), "en-US");
        assert_eq!(Locale::ZhCn.as_ref(), "zh-CN");
    }

    #[test]
    fn language_identifier_matches_code() {
        for locale in Locale::ALL {
            assert_eq!(locale.language_identifier().to_string(), locale.code());
        }
    }

    #[test]
    fn serde_uses_canonical_code() {
        let json = serde_json::to_string(&Locale::EnUs).unwrap();
        assert_eq!(json, "\"en-US\"");
        let parsed: Locale = serde_json::from_str("\"zh-CN\"").unwrap();
        assert_eq!(parsed, Locale::ZhCn);
    }
}
