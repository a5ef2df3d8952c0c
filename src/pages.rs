// SPDX-License-Identifier: MPL-2.0
//! The dashboard's page table.
//!
//! Each page has a route path, a route name, the catalog keys for its sidebar
//! label and hint, and the CSS class applied to the main container.

use crate::i18n::LocaleManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Daily,
    Realtime,
    Logs,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Daily, Page::Realtime, Page::Logs];

    pub fn path(self) -> &'static str {
        match self {
            Page::Overview => "/",
            Page::Daily => "/daily",
            Page::Realtime => "/realtime",
            Page::Logs => "/logs",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Daily => "daily",
            Page::Realtime => "realtime",
            Page::Logs => "logs",
        }
    }

    pub fn sidebar_label_key(self) -> &'static str {
        match self {
            Page::Overview => "app-sidebar-recent-active",
            Page::Daily => "app-menu-daily",
            Page::Realtime => "app-menu-realtime",
            Page::Logs => "app-menu-logs",
        }
    }

    pub fn sidebar_hint_key(self) -> &'static str {
        match self {
            Page::Overview => "app-sidebar-recent-active-hint",
            Page::Daily => "app-sidebar-daily-hint",
            Page::Realtime => "app-sidebar-realtime-hint",
            Page::Logs => "app-sidebar-logs-hint",
        }
    }

    /// Class for the main container; the overview uses none.
    pub fn main_class(self) -> &'static str {
        match self {
            Page::Overview => "",
            Page::Daily => "daily-page",
            Page::Realtime => "realtime-page",
            Page::Logs => "logs-page",
        }
    }

    /// Looks up a page by route path. A trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|page| page.path() == trimmed)
    }

    pub fn label(self, i18n: &LocaleManager) -> String {
        i18n.tr(self.sidebar_label_key())
    }

    pub fn hint(self, i18n: &LocaleManager) -> String {
        i18n.tr(self.sidebar_hint_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    #[test]
    fn from_path_matches_every_route() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
        assert_eq!(Page::from_path("/logs/"), Some(Page::Logs));
        assert_eq!(Page::from_path(""), Some(Page::Overview));
        assert_eq!(Page::from_path("/settings"), None);
    }

    #[test]
    fn only_overview_has_no_main_class() {
        let classless: Vec<_> = Page::ALL
            .into_iter()
            .filter(|page| page.main_class().is_empty())
            .collect();
        assert_eq!(classless, vec![Page::Overview]);
    }

    #[test]
    fn labels_follow_active_locale() {
        let i18n = LocaleManager::default();
        assert_eq!(Page::Daily.label(&i18n), "日报");

        i18n.set_locale(Locale::EnUs, false);
        assert_eq!(Page::Daily.label(&i18n), "Daily report");
    }

    #[test]
    fn every_page_has_translated_label_and_hint() {
        let i18n = LocaleManager::default();
        for locale in Locale::ALL {
            i18n.set_locale(locale, false);
            for page in Page::ALL {
                assert!(!page.label(&i18n).starts_with("MISSING"), "{page:?} {locale}");
                assert!(!page.hint(&i18n).starts_with("MISSING"), "{page:?} {locale}");
            }
        }
    }
}
