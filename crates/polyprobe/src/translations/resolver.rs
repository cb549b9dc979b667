//! Localized string lookup with default-language fallback.
//!
//! A lookup first consults the requested language (or the default when
//! none is given or the store has no bundle for it). When that yields
//! nothing, the same getter is applied to the default bundle. Callers
//! cannot tell a missing language from a missing field: both end up with
//! the default value. Only a gap in the default bundle is an error.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{TranslationBundle, TranslationGroup, TranslationStore};
use crate::language::{Language, DEFAULT_LANGUAGE};
use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    NoBundle,
    MissingValue,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoBundle => "no bundle for language",
            Self::MissingValue => "value missing",
        })
    }
}

/// Shared, read-only view over a [`TranslationStore`]
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<TranslationStore>,
}

impl Resolver {
    /// Wrap a store
    #[must_use]
    pub fn new(store: TranslationStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Share an existing store
    #[must_use]
    pub const fn from_shared(store: Arc<TranslationStore>) -> Self {
        Self { store }
    }

    /// Resolver over the bundles shipped with the crate
    pub fn builtin() -> ProbeResult<Self> {
        Ok(Self::new(TranslationStore::builtin()?))
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &TranslationStore {
        &self.store
    }

    /// Two-step lookup: requested language first, then the default bundle.
    ///
    /// Returns `None` only when the default bundle has no value either.
    pub fn lookup<T, F>(&self, language: Option<Language>, getter: F) -> Option<T>
    where
        F: Fn(&TranslationBundle) -> Option<T>,
    {
        let requested = Language::or_default(language);
        let fallback = match self.store.bundle(requested) {
            Some(bundle) => match getter(bundle) {
                Some(value) => return Some(value),
                None => Fallback::MissingValue,
            },
            None => Fallback::NoBundle,
        };

        if requested == DEFAULT_LANGUAGE && fallback == Fallback::MissingValue {
            return None;
        }
        debug!(language = %requested, reason = %fallback, "falling back to {DEFAULT_LANGUAGE}");
        self.store.bundle(DEFAULT_LANGUAGE).and_then(getter)
    }

    /// Like [`lookup`](Self::lookup) but a gap in the default bundle is an error.
    ///
    /// `field` names the value for the error message.
    pub fn resolve<T, F>(&self, language: Option<Language>, field: &str, getter: F) -> ProbeResult<T>
    where
        F: Fn(&TranslationBundle) -> Option<T>,
    {
        self.lookup(language, getter)
            .ok_or_else(|| ProbeError::MalformedTranslations {
                language: DEFAULT_LANGUAGE.to_string(),
                field: field.to_string(),
            })
    }

    /// Resolve every key of a group, falling back key by key.
    ///
    /// Keys the default bundle lacks stay empty; asking for one through
    /// [`ResolvedGroup::require`] or iterating the whole group is an error.
    pub fn group<G, F>(&self, language: Option<Language>, getter: F) -> ProbeResult<ResolvedGroup>
    where
        G: TranslationGroup,
        F: Fn(&TranslationBundle) -> &G,
    {
        let entries = G::KEYS
            .iter()
            .map(|key| {
                let value = self.lookup(language, |bundle| getter(bundle).get(key).map(str::to_string));
                (*key, value)
            })
            .collect();

        Ok(ResolvedGroup { entries })
    }
}

/// A translation group after per-key fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    entries: Vec<(&'static str, Option<String>)>,
}

impl ResolvedGroup {
    /// Value for `key`, `None` when even the default bundle lacks it
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Value for `key`, or an error naming the key
    pub fn require(&self, key: &str) -> ProbeResult<&str> {
        self.get(key).ok_or_else(|| missing(key))
    }

    /// All values in key order; every key must have one
    pub fn values(&self) -> ProbeResult<Vec<String>> {
        self.values_except(&[])
    }

    /// All values except those under `excluded` keys; every other key must have one
    pub fn values_except(&self, excluded: &[&str]) -> ProbeResult<Vec<String>> {
        self.entries
            .iter()
            .filter(|(k, _)| !excluded.contains(k))
            .map(|(k, v)| v.clone().ok_or_else(|| missing(k)))
            .collect()
    }

    /// `(key, value)` pairs in key order
    #[must_use]
    pub fn entries(&self) -> &[(&'static str, Option<String>)] {
        &self.entries
    }
}

fn missing(key: &str) -> ProbeError {
    ProbeError::MalformedTranslations {
        language: DEFAULT_LANGUAGE.to_string(),
        field: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translations::{FooterTranslations, HomePageTranslations};

    fn english() -> TranslationBundle {
        TranslationBundle {
            home_page: HomePageTranslations {
                gmail: Some("Gmail".to_string()),
                images: Some("Images".to_string()),
                ..Default::default()
            },
            footer: FooterTranslations {
                about: Some("About".to_string()),
                advertising: Some("Advertising".to_string()),
                business: Some("Business".to_string()),
                how_search_works: Some("How Search works".to_string()),
                privacy: Some("Privacy".to_string()),
                terms: Some("Terms".to_string()),
                settings: Some("Settings".to_string()),
            },
            ..Default::default()
        }
    }

    fn polish_partial() -> TranslationBundle {
        TranslationBundle {
            home_page: HomePageTranslations {
                images: Some("Grafika".to_string()),
                ..Default::default()
            },
            footer: FooterTranslations {
                about: Some("O nas".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(
            TranslationStore::new()
                .with_bundle(Language::English, english())
                .with_bundle(Language::Polish, polish_partial()),
        )
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_present_field_uses_requested_language() {
            let r = resolver();
            let images = r.lookup(Some(Language::Polish), |t| t.home_page.images.clone());
            assert_eq!(images.as_deref(), Some("Grafika"));
        }

        #[test]
        fn test_missing_field_falls_back_to_default() {
            let r = resolver();
            let gmail = r.lookup(Some(Language::Polish), |t| t.home_page.gmail.clone());
            assert_eq!(gmail.as_deref(), Some("Gmail"));
        }

        #[test]
        fn test_no_language_uses_default() {
            let r = resolver();
            let images = r.lookup(None, |t| t.home_page.images.clone());
            assert_eq!(images.as_deref(), Some("Images"));
        }

        #[test]
        fn test_missing_bundle_uses_default() {
            let r = Resolver::new(TranslationStore::new().with_bundle(Language::English, english()));
            let images = r.lookup(Some(Language::Polish), |t| t.home_page.images.clone());
            assert_eq!(images.as_deref(), Some("Images"));
        }

        #[test]
        fn test_nested_path_missing_behaves_like_missing_field() {
            // Getter that only succeeds when a sibling value exists, standing in
            // for a lookup path that does not exist in one language.
            let r = resolver();
            let value = r.lookup(Some(Language::Polish), |t| {
                t.home_page.gmail.as_ref()?;
                t.home_page.images.clone()
            });
            assert_eq!(value.as_deref(), Some("Images"));
        }

        #[test]
        fn test_default_missing_is_none_and_resolve_errors() {
            let r = resolver();
            assert!(r
                .lookup(Some(Language::Polish), |t| t.home_page.google_offered_in.clone())
                .is_none());
            let err = r
                .resolve(None, "homePage.googleOfferedIn", |t| {
                    t.home_page.google_offered_in.clone()
                })
                .unwrap_err();
            assert!(err.to_string().contains("homePage.googleOfferedIn"));
        }
    }

    mod group_tests {
        use super::*;

        #[test]
        fn test_group_fills_each_key() {
            let r = resolver();
            let footer = r.group(Some(Language::Polish), |t| &t.footer).unwrap();
            assert_eq!(footer.get("about"), Some("O nas"));
            assert_eq!(footer.get("settings"), Some("Settings"));
            assert_eq!(footer.values().unwrap().len(), FooterTranslations::KEYS.len());
        }

        #[test]
        fn test_group_preserves_key_order() {
            let r = resolver();
            let footer = r.group(None, |t| &t.footer).unwrap();
            let keys: Vec<_> = footer.entries().iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, FooterTranslations::KEYS);
        }

        #[test]
        fn test_values_except() {
            let r = resolver();
            let footer = r.group(None, |t| &t.footer).unwrap();
            let values = footer.values_except(&["privacy", "terms"]).unwrap();
            assert_eq!(values.len(), 5);
            assert!(!values.contains(&"Privacy".to_string()));
        }

        #[test]
        fn test_gap_in_default_fails_only_for_that_key() {
            let r = resolver();
            let home = r.group(Some(Language::Polish), |t| &t.home_page).unwrap();
            assert_eq!(home.require("images").unwrap(), "Grafika");
            assert_eq!(home.require("gmail").unwrap(), "Gmail");
            assert!(home.get("googleOfferedIn").is_none());
            assert!(matches!(
                home.require("googleOfferedIn"),
                Err(ProbeError::MalformedTranslations { .. })
            ));
            let err = home.values().unwrap_err();
            assert!(err.to_string().contains("searchInputLabel"));
            assert!(home.values_except(&["searchInputLabel", "searchButtonAriaLabel"]).is_err());
        }

        #[test]
        fn test_require_unknown_key() {
            let r = resolver();
            let footer = r.group(None, |t| &t.footer).unwrap();
            assert_eq!(footer.require("about").unwrap(), "About");
            assert!(footer.require("careers").is_err());
        }
    }
}
