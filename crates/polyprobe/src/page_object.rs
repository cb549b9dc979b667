//! Page Object Model Support
//!
//! A page object is a stateless handle to one logical page. It owns a
//! URL template with a single `{langCode}` placeholder and derives its
//! selectors from the translations of whichever language a call passes.

use async_trait::async_trait;
use tracing::info;

use crate::host::Host;
use crate::language::Language;
use crate::result::ProbeResult;
use crate::translations::Resolver;
use crate::wait::DEFAULT_PAGE_LOAD_TIMEOUT_MS;

/// Placeholder substituted with a locale code
pub const LANG_CODE_PLACEHOLDER: &str = "{langCode}";

/// Fill the `{langCode}` placeholder of `template`.
///
/// `locale_override` wins; otherwise the locale code of `language`, or of
/// the default language when none is given. Only the first placeholder is
/// replaced.
///
/// ```
/// use polyprobe::{build_url, Language};
///
/// assert_eq!(build_url("/imghp?hl={langCode}", Some(Language::Polish), None), "/imghp?hl=pl");
/// assert_eq!(build_url("/intl/{langCode}/gmail/", None, Some("en-US")), "/intl/en-US/gmail/");
/// ```
#[must_use]
pub fn build_url(template: &str, language: Option<Language>, locale_override: Option<&str>) -> String {
    let code = locale_override.unwrap_or_else(|| Language::or_default(language).locale_code());
    template.replacen(LANG_CODE_PLACEHOLDER, code, 1)
}

/// Trait for page objects representing a page in the UI.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// URL template with one `{langCode}` placeholder
    fn url_template(&self) -> &str;

    /// Translation resolver selectors are derived from
    fn resolver(&self) -> &Resolver;

    /// Wait time for page load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        DEFAULT_PAGE_LOAD_TIMEOUT_MS
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// URL of this page for `language`
    fn page_url(&self, language: Option<Language>, locale_override: Option<&str>) -> String {
        build_url(self.url_template(), language, locale_override)
    }

    /// Navigate to this page in `language`
    async fn visit(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<()> {
        let url = self.page_url(language, None);
        info!(page = self.page_name(), %url, "visiting");
        host.visit(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHost, MockPage};

    struct Landing {
        resolver: Resolver,
    }

    impl PageObject for Landing {
        fn url_template(&self) -> &str {
            "/intl/{langCode}/landing/{langCode}"
        }

        fn resolver(&self) -> &Resolver {
            &self.resolver
        }
    }

    mod build_url_tests {
        use super::*;

        #[test]
        fn test_language_code() {
            assert_eq!(build_url("/imghp?hl={langCode}", Some(Language::Polish), None), "/imghp?hl=pl");
            assert_eq!(build_url("/?hl={langCode}", Some(Language::English), None), "/?hl=en");
        }

        #[test]
        fn test_default_language_when_absent() {
            assert_eq!(build_url("/?hl={langCode}", None, None), "/?hl=en");
        }

        #[test]
        fn test_override_wins() {
            assert_eq!(
                build_url(
                    "https://workspace.google.com/intl/{langCode}/gmail/",
                    Some(Language::Polish),
                    Some("en-US")
                ),
                "https://workspace.google.com/intl/en-US/gmail/"
            );
        }

        #[test]
        fn test_only_first_placeholder_replaced() {
            assert_eq!(build_url("/{langCode}/{langCode}", Some(Language::Polish), None), "/pl/{langCode}");
        }

        #[test]
        fn test_template_without_placeholder() {
            assert_eq!(build_url("/search", Some(Language::Polish), None), "/search");
        }
    }

    mod trait_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let page = Landing {
                resolver: Resolver::builtin().unwrap(),
            };
            assert_eq!(page.load_timeout_ms(), DEFAULT_PAGE_LOAD_TIMEOUT_MS);
            assert!(page.page_name().ends_with("Landing"));
            assert_eq!(page.page_url(Some(Language::Polish), None), "/intl/pl/landing/{langCode}");
        }

        #[tokio::test]
        async fn test_visit_uses_page_url() {
            let page = Landing {
                resolver: Resolver::builtin().unwrap(),
            };
            let host = MockHost::new().with_page(MockPage::new("/intl/pl/landing/{langCode}", "Landing"));
            page.visit(&host, Some(Language::Polish)).await.unwrap();
            assert!(host.was_called("visit:https://www.google.com/intl/pl/landing/"));
        }
    }
}
