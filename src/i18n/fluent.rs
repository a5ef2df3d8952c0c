// SPDX-License-Identifier: MPL-2.0
use super::Locale;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use rust_embed::RustEmbed;
use std::collections::HashMap;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

/// Fluent message bundles for every supported locale.
///
/// Bundles are the thread-safe flavor so a catalog can sit behind an `Arc`
/// shared with the HTTP client.
pub struct Catalog {
    bundles: HashMap<Locale, FluentBundle<FluentResource>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("locales", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Catalog {
    /// Builds the catalog from the `.ftl` files embedded at compile time.
    pub fn embedded() -> Self {
        let mut catalog = Self {
            bundles: HashMap::new(),
        };
        for locale in Locale::ALL {
            let filename = format!("{}.ftl", locale.code());
            match Asset::get(&filename) {
                Some(content) => {
                    let source = String::from_utf8_lossy(content.data.as_ref()).to_string();
                    catalog.insert(locale, source);
                }
                None => tracing::warn!(%locale, "no embedded translations"),
            }
        }
        catalog
    }

    /// Builds a catalog from in-memory Fluent sources.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = (Locale, &'a str)>) -> Self {
        let mut catalog = Self {
            bundles: HashMap::new(),
        };
        for (locale, source) in sources {
            catalog.insert(locale, source.to_string());
        }
        catalog
    }

    fn insert(&mut self, locale: Locale, source: String) {
        // A resource with syntax errors still carries every entry that parsed.
        let resource = FluentResource::try_new(source).unwrap_or_else(|(resource, errors)| {
            tracing::warn!(%locale, ?errors, "translation file has syntax errors");
            resource
        });
        let mut bundle = FluentBundle::new_concurrent(vec![locale.language_identifier()]);
        bundle.set_use_isolating(false);
        if let Err(errors) = bundle.add_resource(resource) {
            tracing::warn!(%locale, ?errors, "duplicate translation entries");
        }
        self.bundles.insert(locale, bundle);
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.bundles.contains_key(&locale)
    }

    /// Renders `key` in `locale`, falling back to the default locale and
    /// finally to a visible `MISSING:` marker.
    pub fn tr(&self, locale: Locale, key: &str) -> String {
        self.format(locale, key)
            .or_else(|| self.format(Locale::DEFAULT, key))
            .unwrap_or_else(|| format!("MISSING: {}", key))
    }

    fn format(&self, locale: Locale, key: &str) -> Option<String> {
        let bundle = self.bundles.get(&locale)?;
        let pattern = bundle.get_message(key)?.value()?;
        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, None, &mut errors);
        errors.is_empty().then(|| value.into_owned())
    }
}
