//! Translation store: one fixed-shape bundle per language.
//!
//! Bundles are YAML documents with camelCase keys. Every group is a flat
//! map from a stable key to a localized string; any value may be missing
//! for a non-default language and is then filled in by the [`Resolver`].

mod resolver;

pub use resolver::{ResolvedGroup, Resolver};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::language::{Language, DEFAULT_LANGUAGE};
use crate::result::{ProbeError, ProbeResult};

const ENGLISH_YAML: &str = include_str!("../../translations/english.yaml");
const POLISH_YAML: &str = include_str!("../../translations/polish.yaml");

/// A named group of localized strings with a fixed key order
pub trait TranslationGroup {
    /// Keys in declaration order
    const KEYS: &'static [&'static str];

    /// Value for `key`, if this language provides one
    fn get(&self, key: &str) -> Option<&str>;

    /// All keys with their (possibly missing) values, in declaration order
    fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        Self::KEYS.iter().map(|key| (*key, self.get(key))).collect()
    }
}

macro_rules! translation_group {
    (
        $(#[$meta:meta])*
        $name:ident { $( $field:ident => $key:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $(
                #[allow(missing_docs)]
                #[serde(rename = $key, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )+
        }

        impl TranslationGroup for $name {
            const KEYS: &'static [&'static str] = &[$($key),+];

            fn get(&self, key: &str) -> Option<&str> {
                match key {
                    $( $key => self.$field.as_deref(), )+
                    _ => None,
                }
            }
        }
    };
}

translation_group! {
    /// Search home page labels
    HomePageTranslations {
        search_input_label => "searchInputLabel",
        search_button_aria_label => "searchButtonAriaLabel",
        feeling_lucky_button_aria_label => "feelingLuckyButtonAriaLabel",
        google_apps_toggle_aria_label => "googleAppsToggleAriaLabel",
        gmail => "gmail",
        images => "images",
        google_offered_in => "googleOfferedIn",
    }
}

translation_group! {
    /// Webmail landing page
    MailPageTranslations {
        logo_alt => "logoAlt",
        sign_in => "signIn",
        create_account => "createAccount",
        for_work => "forWork",
        header_create_account => "headerCreateAccount",
        header_for_work => "headerForWork",
        heading => "heading",
        subheading => "subheading",
    }
}

translation_group! {
    /// Image search home page
    ImagesPageTranslations {
        logo_alt => "logoAlt",
        search_input_aria_label => "searchInputAriaLabel",
        images => "images",
    }
}

translation_group! {
    /// Cookie-consent modal shown on first visit
    CookiesModalTranslations {
        header => "header",
        description => "description",
        accept_all => "acceptAll",
        reject_all => "rejectAll",
        more_options => "moreOptions",
        privacy => "privacy",
        terms => "terms",
    }
}

translation_group! {
    /// Page footer links
    FooterTranslations {
        about => "about",
        advertising => "advertising",
        business => "business",
        how_search_works => "howSearchWorks",
        privacy => "privacy",
        terms => "terms",
        settings => "settings",
    }
}

translation_group! {
    /// Bot-check challenge page
    RecaptchaTranslations {
        unusual_traffic => "unusualTraffic",
        about_this_page => "aboutThisPage",
        not_a_robot => "notARobot",
    }
}

translation_group! {
    /// Entries of the app-switcher menu
    GoogleAppsTranslations {
        account => "account",
        search => "search",
        maps => "maps",
        youtube => "youtube",
        play => "play",
        news => "news",
        gmail => "gmail",
        meet => "meet",
        chat => "chat",
        contacts => "contacts",
        drive => "drive",
        calendar => "calendar",
        translate => "translate",
        photos => "photos",
    }
}

/// Every localized string the page objects need for one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TranslationBundle {
    /// Search home page
    pub home_page: HomePageTranslations,
    /// Webmail landing page
    pub gmail_page: MailPageTranslations,
    /// Image search page
    pub images_page: ImagesPageTranslations,
    /// Cookie-consent modal
    pub cookies_modal: CookiesModalTranslations,
    /// Footer links
    pub footer: FooterTranslations,
    /// Bot-check challenge
    pub recaptcha: RecaptchaTranslations,
    /// App-switcher menu
    pub google_apps: GoogleAppsTranslations,
}

impl TranslationBundle {
    /// Parse a bundle from a YAML document
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

/// Mapping from language to its bundle
#[derive(Debug, Clone, Default)]
pub struct TranslationStore {
    bundles: BTreeMap<Language, TranslationBundle>,
}

impl TranslationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the bundles shipped in `translations/`
    pub fn builtin() -> ProbeResult<Self> {
        let mut store = Self::new();
        store.insert(Language::English, TranslationBundle::from_yaml(ENGLISH_YAML)?);
        store.insert(Language::Polish, TranslationBundle::from_yaml(POLISH_YAML)?);
        store.validate()?;
        Ok(store)
    }

    /// Load `<language>.yaml` for every supported language found in `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> ProbeResult<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for language in Language::ALL {
            let path = dir.join(format!("{}.yaml", language.as_str()));
            if path.exists() {
                let yaml = std::fs::read_to_string(&path)?;
                store.insert(language, TranslationBundle::from_yaml(&yaml)?);
            }
        }
        store.validate()?;
        Ok(store)
    }

    /// Parse one YAML document keyed by language name (`english:`, `polish:`)
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let bundles: BTreeMap<Language, TranslationBundle> = serde_yaml_ng::from_str(yaml)?;
        let store = Self { bundles };
        store.validate()?;
        Ok(store)
    }

    /// Add or replace a bundle
    pub fn insert(&mut self, language: Language, bundle: TranslationBundle) {
        let _ = self.bundles.insert(language, bundle);
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_bundle(mut self, language: Language, bundle: TranslationBundle) -> Self {
        self.insert(language, bundle);
        self
    }

    /// Bundle for `language`, if present
    #[must_use]
    pub fn bundle(&self, language: Language) -> Option<&TranslationBundle> {
        self.bundles.get(&language)
    }

    /// Languages that have a bundle
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.bundles.keys().copied().collect()
    }

    /// The default bundle must be present; partial non-default bundles are fine.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.bundles.contains_key(&DEFAULT_LANGUAGE) {
            Ok(())
        } else {
            Err(ProbeError::MalformedTranslations {
                language: DEFAULT_LANGUAGE.to_string(),
                field: "<bundle>".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod group_tests {
        use super::*;

        #[test]
        fn test_entries_follow_declaration_order() {
            let group = CookiesModalTranslations {
                header: Some("Before you continue".to_string()),
                accept_all: Some("Accept all".to_string()),
                ..Default::default()
            };
            let keys: Vec<_> = group.entries().into_iter().map(|(k, _)| k).collect();
            assert_eq!(keys, CookiesModalTranslations::KEYS);
            assert_eq!(group.get("acceptAll"), Some("Accept all"));
            assert_eq!(group.get("rejectAll"), None);
            assert_eq!(group.get("noSuchKey"), None);
        }

        #[test]
        fn test_unknown_key_is_rejected() {
            let yaml = "footer:\n  abuot: About\n";
            assert!(TranslationBundle::from_yaml(yaml).is_err());
        }

        #[test]
        fn test_missing_keys_deserialize_as_none() {
            let yaml = "homePage:\n  gmail: Gmail\n";
            let bundle = TranslationBundle::from_yaml(yaml).unwrap();
            assert_eq!(bundle.home_page.gmail.as_deref(), Some("Gmail"));
            assert!(bundle.home_page.images.is_none());
            assert_eq!(bundle.footer, FooterTranslations::default());
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_builtin_has_all_languages() {
            let store = TranslationStore::builtin().unwrap();
            assert_eq!(store.languages(), Language::ALL.to_vec());
        }

        #[test]
        fn test_builtin_default_bundle_is_complete() {
            let store = TranslationStore::builtin().unwrap();
            let english = store.bundle(Language::English).unwrap();
            assert!(english.home_page.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.gmail_page.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.images_page.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.cookies_modal.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.footer.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.recaptcha.entries().iter().all(|(_, v)| v.is_some()));
            assert!(english.google_apps.entries().iter().all(|(_, v)| v.is_some()));
        }

        #[test]
        fn test_validate_requires_default_bundle() {
            let store = TranslationStore::new()
                .with_bundle(Language::Polish, TranslationBundle::default());
            assert!(matches!(
                store.validate(),
                Err(ProbeError::MalformedTranslations { .. })
            ));
        }

        #[test]
        fn test_from_dir_loads_present_languages() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("english.yaml"), ENGLISH_YAML).unwrap();
            let store = TranslationStore::from_dir(dir.path()).unwrap();
            assert_eq!(store.languages(), vec![Language::English]);
            assert!(store.bundle(Language::Polish).is_none());
        }

        #[test]
        fn test_from_yaml_keyed_by_language() {
            let yaml = "english:\n  footer:\n    about: About\npolish:\n  footer:\n    about: O nas\n";
            let store = TranslationStore::from_yaml(yaml).unwrap();
            assert_eq!(store.languages(), Language::ALL.to_vec());
            let polish = store.bundle(Language::Polish).unwrap();
            assert_eq!(polish.footer.about.as_deref(), Some("O nas"));
        }

        #[test]
        fn test_from_yaml_unknown_language_rejected() {
            assert!(TranslationStore::from_yaml("klingon:\n  footer: {}\n").is_err());
        }

        #[test]
        fn test_from_dir_without_default_fails() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("polish.yaml"), POLISH_YAML).unwrap();
            assert!(TranslationStore::from_dir(dir.path()).is_err());
        }
    }
}
