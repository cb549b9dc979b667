//! Webmail landing page reached from the home page header.

use crate::assertion;
use crate::host::{Host, Scope};
use crate::language::Language;
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::translations::Resolver;

/// Locale the landing page redirects English visitors to
const ENGLISH_LOCALE_OVERRIDE: &str = "en-US";

/// Strings that are rendered as controls rather than visible copy
const NON_CONTENT_KEYS: [&str; 6] = [
    "logoAlt",
    "signIn",
    "createAccount",
    "forWork",
    "headerCreateAccount",
    "headerForWork",
];

/// Selectors of the webmail landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSelectors {
    /// Create-account dropdown
    pub create_account_button: Selector,
    /// Sign-in link
    pub sign_in_button: Selector,
    /// Create-account button in the header
    pub header_create_account: Selector,
    /// Cookie notification bar
    pub cookie_bar: Selector,
    /// Link labels
    pub link_label: Selector,
    /// Product logo
    pub logo: Selector,
}

impl MailSelectors {
    /// All selectors in declaration order
    #[must_use]
    pub fn all(&self) -> Vec<Selector> {
        vec![
            self.create_account_button.clone(),
            self.sign_in_button.clone(),
            self.header_create_account.clone(),
            self.cookie_bar.clone(),
            self.link_label.clone(),
            self.logo.clone(),
        ]
    }
}

/// Webmail landing page (`https://workspace.google.com/intl/{langCode}/gmail/`)
#[derive(Debug, Clone)]
pub struct MailPage {
    resolver: Resolver,
}

impl PageObject for MailPage {
    fn url_template(&self) -> &str {
        "https://workspace.google.com/intl/{langCode}/gmail/"
    }

    fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn page_name(&self) -> &str {
        "mail"
    }
}

impl MailPage {
    /// Create the page object
    #[must_use]
    pub const fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Selectors derived from `language`'s translations
    pub fn selectors(&self, language: Option<Language>) -> ProbeResult<MailSelectors> {
        let t = self.resolver.group(language, |b| &b.gmail_page)?;
        Ok(MailSelectors {
            create_account_button: Selector::css_with_text("gws-dropdown-button", t.require("createAccount")?),
            sign_in_button: Selector::css_with_text("a", t.require("signIn")?),
            header_create_account: Selector::attr("", "aria-label", t.require("headerCreateAccount")?),
            cookie_bar: Selector::css(".glue-cookie-notification-bar"),
            link_label: Selector::css(".link__label"),
            logo: Selector::attr("img", "alt", t.require("logoAlt")?),
        })
    }

    /// URL the landing page settles on; English visitors end up on `en-US`
    #[must_use]
    pub fn expected_url(&self, language: Option<Language>) -> String {
        let locale_override = matches!(language, None | Some(Language::English)).then_some(ENGLISH_LOCALE_OVERRIDE);
        self.page_url(language, locale_override)
    }

    /// Landed on the webmail page with its copy and controls visible
    pub async fn assert_gmail_navigation(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        assertion::url_includes(host, &self.expected_url(language)).await?;
        assertion::title_includes(host, "Gmail").await?;

        let contents = self
            .resolver
            .group(language, |b| &b.gmail_page)?
            .values_except(&NON_CONTENT_KEYS)?;
        assertion::is_visible_content_multiple(host, &Scope::Document, &contents).await?;
        assertion::is_visible_element_multiple(host, &Scope::Document, &self.selectors(language)?.all()).await?;
        Ok(self)
    }
}
