// SPDX-License-Identifier: MPL-2.0
//! Active-locale state: resolution at startup and synchronized switching.
//!
//! # Resolution order
//!
//! 1. Query string (`lang`, then `locale`; first non-empty value wins)
//! 2. Persisted `nginxpulse_locale` slot
//! 3. [`Locale::DEFAULT`]
//!
//! An explicit query override always beats a stored preference.

use super::{format, normalize_locale, Catalog, Locale};
use crate::storage::{KeyValueStore, LOCALE_STORAGE};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Query parameters consulted for a locale override, in order.
const QUERY_KEYS: [&str; 2] = ["lang", "locale"];

/// Message rendered into the document title on every locale change.
const TITLE_KEY: &str = "app-title";

/// Document-level locale metadata sink (language attribute and title).
pub trait Document: Send {
    fn set_lang(&mut self, lang: &str);
    fn set_title(&mut self, title: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub lang: String,
    pub title: String,
}

/// Shared in-memory [`Document`]; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct DocumentHandle {
    state: Arc<Mutex<DocumentState>>,
}

impl DocumentHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DocumentState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Document for DocumentHandle {
    fn set_lang(&mut self, lang: &str) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lang = lang.to_string();
    }

    fn set_title(&mut self, title: &str) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .title = title.to_string();
    }
}

/// Extracts a locale override from a URL query string.
///
/// A leading `?` is accepted. Only the first occurrence of each key counts,
/// and an empty value is treated as absent.
pub fn locale_from_query(query: &str) -> Option<Locale> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs = url::form_urlencoded::parse(query.as_bytes());
    QUERY_KEYS.iter().find_map(|name| {
        pairs
            .clone()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
            .map(|value| normalize_locale(Some(&*value)))
    })
}

/// Reads the persisted locale preference, if any.
pub fn stored_locale(store: &dyn KeyValueStore) -> Option<Locale> {
    store
        .get(LOCALE_STORAGE)
        .filter(|value| !value.is_empty())
        .map(|value| normalize_locale(Some(value.as_str())))
}

/// Picks the startup locale: query override, then storage, then default.
pub fn resolve_initial_locale(query: Option<&str>, store: Option<&dyn KeyValueStore>) -> Locale {
    query
        .and_then(locale_from_query)
        .or_else(|| store.and_then(stored_locale))
        .unwrap_or(Locale::DEFAULT)
}

/// Owns the active locale and keeps storage, catalog and document in step.
pub struct LocaleManager {
    catalog: Catalog,
    current: RwLock<Locale>,
    store: Option<Arc<dyn KeyValueStore>>,
    document: Option<Mutex<Box<dyn Document>>>,
}

impl std::fmt::Debug for LocaleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleManager")
            .field("current", &self.current_locale())
            .field("has_store", &self.store.is_some())
            .field("has_document", &self.document.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LocaleManager {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LocaleManager {
    pub fn builder() -> LocaleManagerBuilder {
        LocaleManagerBuilder::default()
    }

    /// Switches the active locale.
    ///
    /// `next` is normalized first, so any input is accepted. The catalog
    /// selector changes immediately; the value is written to storage only when
    /// `persist` is set. Storage failures are logged and swallowed. Returns
    /// the locale actually applied.
    pub fn set_locale(&self, next: impl AsRef<str>, persist: bool) -> Locale {
        let normalized = normalize_locale(Some(next.as_ref()));

        // The document lock is held across the switch so `lang` and `title`
        // always describe the same locale as `current`.
        let mut document = self
            .document
            .as_ref()
            .map(|document| document.lock().unwrap_or_else(PoisonError::into_inner));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = normalized;
        if let Some(document) = document.as_mut() {
            document.set_lang(normalized.code());
            document.set_title(&self.catalog.tr(normalized, TITLE_KEY));
        }
        drop(document);

        if persist {
            if let Some(store) = &self.store {
                if let Err(error) = store.set(LOCALE_STORAGE, normalized.code()) {
                    tracing::warn!(locale = %normalized, %error, "failed to persist locale");
                }
            }
        }

        tracing::debug!(locale = %normalized, persist, "locale applied");
        normalized
    }

    pub fn current_locale(&self) -> Locale {
        let current = *self.current.read().unwrap_or_else(PoisonError::into_inner);
        normalize_locale(Some(current.code()))
    }

    /// Renders `key` in the active locale.
    pub fn tr(&self, key: &str) -> String {
        self.catalog.tr(self.current_locale(), key)
    }

    /// Renders `value` with at most two fraction digits in the active locale.
    pub fn format_decimal(&self, value: f64) -> String {
        format::format_decimal(self.current_locale(), value)
    }

    /// Renders a ratio (`0.1234`) as a percentage (`12.34%`) in the active
    /// locale.
    pub fn format_percent(&self, ratio: f64) -> String {
        format::format_percent(self.current_locale(), ratio)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[derive(Default)]
pub struct LocaleManagerBuilder {
    catalog: Option<Catalog>,
    store: Option<Arc<dyn KeyValueStore>>,
    document: Option<Box<dyn Document>>,
    query: Option<String>,
}

impl LocaleManagerBuilder {
    /// Uses `catalog` instead of the embedded translations.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn document(mut self, document: impl Document + 'static) -> Self {
        self.document = Some(Box::new(document));
        self
    }

    /// Query string inspected once for a `lang`/`locale` override.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Resolves the initial locale and applies it without persisting.
    pub fn build(self) -> LocaleManager {
        let initial = resolve_initial_locale(self.query.as_deref(), self.store.as_deref());
        let manager = LocaleManager {
            catalog: self.catalog.unwrap_or_default(),
            current: RwLock::new(initial),
            store: self.store,
            document: self.document.map(Mutex::new),
        };
        manager.set_locale(initial, false);
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::storage::MemoryStore;

    fn store_with(locale: &str) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([(LOCALE_STORAGE, locale)]))
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("read-only".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("read-only".into()))
        }
    }

    #[test]
    fn query_override_beats_stored_locale() {
        let store = store_with("zh-CN");
        let locale = resolve_initial_locale(Some("?lang=en"), Some(&*store));
        assert_eq!(locale, Locale::EnUs);
    }

    #[test]
    fn stored_locale_used_without_query() {
        let store = store_with("en-US");
        assert_eq!(resolve_initial_locale(None, Some(&*store)), Locale::EnUs);
        assert_eq!(resolve_initial_locale(Some(""), Some(&*store)), Locale::EnUs);
    }

    #[test]
    fn default_without_query_or_storage() {
        assert_eq!(resolve_initial_locale(None, None), Locale::ZhCn);
        let empty = MemoryStore::new();
        assert_eq!(resolve_initial_locale(Some("?page=2"), Some(&empty)), Locale::ZhCn);
    }

    #[test]
    fn lang_key_checked_before_locale_key() {
        assert_eq!(locale_from_query("locale=en&lang=zh"), Some(Locale::ZhCn));
        assert_eq!(locale_from_query("locale=en_US"), Some(Locale::EnUs));
    }

    #[test]
    fn empty_lang_falls_through_to_locale() {
        assert_eq!(locale_from_query("?lang=&locale=en"), Some(Locale::EnUs));
        assert_eq!(locale_from_query("?lang="), None);
    }

    #[test]
    fn unrecognized_query_value_still_overrides_storage() {
        let store = store_with("en-US");
        let locale = resolve_initial_locale(Some("lang=fr"), Some(&*store));
        assert_eq!(locale, Locale::DEFAULT);
    }

    #[test]
    fn percent_encoded_query_values_are_decoded() {
        assert_eq!(locale_from_query("lang=%20EN%2DUS%20"), Some(Locale::EnUs));
    }

    #[test]
    fn empty_stored_value_is_ignored() {
        let store = store_with("");
        assert_eq!(stored_locale(&*store), None);
    }

    #[test]
    fn build_does_not_persist_initial_locale() {
        let store = Arc::new(MemoryStore::new());
        let manager = LocaleManager::builder()
            .store(store.clone())
            .query("lang=en")
            .build();
        assert_eq!(manager.current_locale(), Locale::EnUs);
        assert_eq!(store.get(LOCALE_STORAGE), None);
    }

    #[test]
    fn set_locale_without_persist_leaves_storage_untouched() {
        let store = store_with("zh-CN");
        let manager = LocaleManager::builder().store(store.clone()).build();

        manager.set_locale(Locale::EnUs, false);

        assert_eq!(manager.current_locale(), Locale::EnUs);
        assert_eq!(manager.tr("common-request-failed"), "Request failed");
        assert_eq!(store.get(LOCALE_STORAGE).as_deref(), Some("zh-CN"));
    }

    #[test]
    fn set_locale_with_persist_writes_canonical_code() {
        let store = Arc::new(MemoryStore::new());
        let manager = LocaleManager::builder().store(store.clone()).build();

        let applied = manager.set_locale("EN_us", true);

        assert_eq!(applied, Locale::EnUs);
        assert_eq!(store.get(LOCALE_STORAGE).as_deref(), Some("en-US"));
    }

    #[test]
    fn set_locale_updates_document_lang_and_title() {
        let document = DocumentHandle::new();
        let manager = LocaleManager::builder().document(document.clone()).build();

        let initial = document.snapshot();
        assert_eq!(initial.lang, "zh-CN");
        assert_eq!(initial.title, "NginxPulse - Nginx 日志分析");

        manager.set_locale("en", false);

        let updated = document.snapshot();
        assert_eq!(updated.lang, "en-US");
        assert_eq!(updated.title, "NginxPulse - Nginx Log Analytics");
    }

    #[test]
    fn set_locale_without_store_or_document_is_fine() {
        let manager = LocaleManager::default();
        assert_eq!(manager.set_locale("en-US", true), Locale::EnUs);
        assert_eq!(manager.current_locale(), Locale::EnUs);
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let manager = LocaleManager::builder().store(Arc::new(FailingStore)).build();
        assert_eq!(manager.set_locale("en", true), Locale::EnUs);
        assert_eq!(manager.current_locale(), Locale::EnUs);
    }

    #[test]
    fn garbage_input_normalizes_to_default() {
        let manager = LocaleManager::builder().query("lang=en").build();
        assert_eq!(manager.set_locale("klingon", false), Locale::DEFAULT);
    }

    #[test]
    fn number_formatting_uses_active_locale() {
        let manager = LocaleManager::default();
        assert_eq!(manager.format_decimal(1234.567), "1,234.57");
        assert_eq!(manager.format_percent(0.0825), "8.25%");

        manager.set_locale("en", false);
        assert_eq!(manager.format_decimal(1_000_000.0), "1,000,000");
        assert_eq!(manager.format_percent(1.0), "100.00%");
    }

    #[test]
    fn concurrent_switches_keep_document_consistent() {
        let document = DocumentHandle::new();
        let manager = LocaleManager::builder().document(document.clone()).build();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let manager = &manager;
                scope.spawn(move || {
                    for round in 0..200 {
                        let next = if (worker + round) % 2 == 0 { "en-US" } else { "zh-CN" };
                        manager.set_locale(next, false);
                    }
                });
            }
        });

        let state = document.snapshot();
        let locale: Locale = state.lang.parse().unwrap();
        assert_eq!(manager.current_locale(), locale);
        assert_eq!(state.title, manager.catalog().tr(locale, TITLE_KEY));
    }
}
