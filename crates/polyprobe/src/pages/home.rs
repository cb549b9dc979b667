//! Search home page: search controls, cookie modal, footer and app launcher.

use tracing::info;

use crate::assertion;
use crate::dom;
use crate::geo::{self, CountryLookup};
use crate::host::{ElementHandle, Host, Scope};
use crate::language::{Language, DEFAULT_LANGUAGE};
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::partition::{split_into_parts, SCROLL_PARTS};
use crate::result::ProbeResult;
use crate::translations::Resolver;
use crate::wait;

/// Pause before each app-menu part so the menu animation settles
const APPS_MENU_SETTLE_MS: u64 = 200;

/// Selectors of the search home page for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSelectors {
    /// Search textarea
    pub search_input: Selector,
    /// "Google Search" button
    pub search_button: Selector,
    /// "I'm Feeling Lucky" button
    pub feeling_lucky_button: Selector,
    /// App-switcher toggle
    pub google_apps_toggle: Selector,
    /// App-switcher frame
    pub google_apps_container: Selector,
}

/// Search home page (`/?hl={langCode}`)
#[derive(Debug, Clone)]
pub struct HomePage {
    resolver: Resolver,
}

impl PageObject for HomePage {
    fn url_template(&self) -> &str {
        "/?hl={langCode}"
    }

    fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn page_name(&self) -> &str {
        "home"
    }
}

impl HomePage {
    /// Indices of the `svg` elements that are rendered on first load
    pub const VISIBLE_SVG_INDICES: [usize; 5] = [0, 1, 3, 5, 6];

    /// Create the page object
    #[must_use]
    pub const fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Selectors derived from `language`'s translations
    pub fn selectors(&self, language: Option<Language>) -> ProbeResult<HomeSelectors> {
        let t = self.resolver.group(language, |b| &b.home_page)?;
        Ok(HomeSelectors {
            search_input: Selector::attr("textarea", "aria-label", t.require("searchInputLabel")?),
            search_button: Selector::attr("", "aria-label", t.require("searchButtonAriaLabel")?),
            feeling_lucky_button: Selector::attr("", "aria-label", t.require("feelingLuckyButtonAriaLabel")?),
            google_apps_toggle: Selector::attr("", "aria-label", t.require("googleAppsToggleAriaLabel")?),
            google_apps_container: Selector::css(r#"iframe[name="app"]"#),
        })
    }

    /// Search input elements
    pub async fn search_input(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<Vec<ElementHandle>> {
        dom::get_all(host, &Scope::Document, &self.selectors(language)?.search_input).await
    }

    /// Search button elements (the page renders more than one)
    pub async fn search_button(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<Vec<ElementHandle>> {
        dom::get_all(host, &Scope::Document, &self.selectors(language)?.search_button).await
    }

    /// "I'm Feeling Lucky" button elements
    pub async fn feeling_lucky_button(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<Vec<ElementHandle>> {
        dom::get_all(host, &Scope::Document, &self.selectors(language)?.feeling_lucky_button).await
    }

    /// App-switcher toggle elements
    pub async fn google_apps_toggle(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<Vec<ElementHandle>> {
        dom::get_all(host, &Scope::Document, &self.selectors(language)?.google_apps_toggle).await
    }

    /// App-switcher frame elements
    pub async fn google_apps_menu(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<Vec<ElementHandle>> {
        dom::get_all(host, &Scope::Document, &self.selectors(language)?.google_apps_container).await
    }

    /// Body of the app-switcher frame document, once populated
    pub async fn google_apps_menu_body(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<ElementHandle> {
        dom::frame_body(host, &self.selectors(language)?.google_apps_container).await
    }

    /// Click the consent button if one is showing; does nothing otherwise
    pub async fn accept_cookies_if_present(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        let accept_text = self
            .resolver
            .group(language, |b| &b.cookies_modal)?
            .require("acceptAll")?
            .to_string();

        for button in host.query_all(&Scope::Document, &Selector::css("button")).await? {
            if button.trimmed_text() == accept_text && host.is_visible(&button).await? {
                info!(text = %accept_text, "accepting cookies");
                host.click(&button).await?;
                return Ok(self);
            }
        }
        Ok(self)
    }

    /// Every consent-modal string is visible, scrolling the modal between parts
    pub async fn assert_cookie_modal_contents_are_visible(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<&Self> {
        let modal = self.resolver.group(language, |b| &b.cookies_modal)?;
        let header = modal.require("header")?;
        let contents = modal.values()?;

        for part in split_into_parts(&contents, SCROLL_PARTS) {
            assertion::is_visible_content_multiple(host, &Scope::Document, part).await?;
            let header_element = dom::contains(host, &Scope::Document, header).await?;
            if let Some(scrollable) = dom::find_scrollable_parent(host, &header_element).await? {
                host.scroll_to_bottom(&scrollable).await?;
            }
        }
        Ok(self)
    }

    /// Consent-modal strings are gone (footer links share the privacy and terms labels)
    pub async fn assert_cookie_modal_contents_are_not_visible(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<&Self> {
        let contents = self
            .resolver
            .group(language, |b| &b.cookies_modal)?
            .values_except(&["privacy", "terms"])?;
        assertion::is_not_visible_content_multiple(host, &Scope::Document, &contents).await?;
        Ok(self)
    }

    /// Icons rendered on first load, picked by index
    pub async fn assert_svgs_are_visible(&self, host: &dyn Host) -> ProbeResult<&Self> {
        let svg = Selector::css("svg");
        for index in Self::VISIBLE_SVG_INDICES {
            assertion::is_visible_nth(host, &Scope::Document, &svg, index).await?;
        }
        Ok(self)
    }

    /// Title, icons, footer, region-specific content and the search controls
    pub async fn assert_initial_load_expected_elements(
        &self,
        host: &dyn Host,
        geo: &dyn CountryLookup,
        language: Option<Language>,
    ) -> ProbeResult<&Self> {
        let country = geo.country().await?;
        let user_language = Language::or_default(language);
        let footer = self.resolver.group(Some(user_language), |b| &b.footer)?;
        let home = self.resolver.group(Some(user_language), |b| &b.home_page)?;

        assertion::title_equals(host, "Google").await?;
        self.assert_svgs_are_visible(host).await?;

        let mut visible_contents = footer.values()?;
        if geo::shows_language_promotion(&country, user_language) {
            visible_contents.push(format!(
                "{} {}",
                home.require("googleOfferedIn")?,
                geo::promoted_language_label(user_language)
            ));
        }
        visible_contents.push(geo::localized_country_name(&country, user_language));

        let selectors = self.selectors(Some(user_language))?;
        assertion::is_visible_element_multiple(
            host,
            &Scope::Document,
            &[selectors.search_input, selectors.search_button, selectors.feeling_lucky_button],
        )
        .await?;
        assertion::is_visible_content_multiple(host, &Scope::Document, &visible_contents).await?;
        Ok(self)
    }

    /// Click the app-switcher toggle
    pub async fn open_google_apps_menu(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        let toggle = dom::get_first(host, &Scope::Document, &self.selectors(language)?.google_apps_toggle).await?;
        host.click(&toggle).await?;
        Ok(self)
    }

    /// Close the app switcher by clicking outside of it
    pub async fn close_google_apps_menu(&self, host: &dyn Host) -> ProbeResult<&Self> {
        wait::settle(APPS_MENU_SETTLE_MS).await;
        let body = dom::get_first(host, &Scope::Document, &Selector::css("body")).await?;
        host.click(&body).await?;
        Ok(self)
    }

    /// Every app name is visible inside the menu frame, scrolling between parts
    pub async fn assert_google_apps_menu_is_visible(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<&Self> {
        let apps = self.resolver.group(language, |b| &b.google_apps)?.values()?;

        for (index, part) in split_into_parts(&apps, SCROLL_PARTS).into_iter().enumerate() {
            let Some(first) = part.first() else {
                continue;
            };
            wait::settle(APPS_MENU_SETTLE_MS).await;
            if index > 0 {
                let body = self.google_apps_menu_body(host, language).await?;
                let entry = dom::contains(host, &Scope::within(&body), first).await?;
                host.scroll_into_view(&entry).await?;
            }
            let body = self.google_apps_menu_body(host, language).await?;
            assertion::is_visible_content_multiple(host, &Scope::within(&body), part).await?;
        }
        Ok(self)
    }

    /// Toggle reports collapsed and the menu frame is hidden
    pub async fn assert_google_apps_menu_is_closed(
        &self,
        host: &dyn Host,
        language: Option<Language>,
    ) -> ProbeResult<&Self> {
        let selectors = self.selectors(language)?;
        assertion::attribute_equals(host, &Scope::Document, &selectors.google_apps_toggle, "aria-expanded", "false")
            .await?;
        assertion::is_not_visible_element(host, &Scope::Document, &selectors.google_apps_container).await?;
        Ok(self)
    }

    /// Follow the webmail link; its label is the same in every language
    pub async fn open_gmail(&self, host: &dyn Host) -> ProbeResult<&Self> {
        let label = self
            .resolver
            .group(Some(DEFAULT_LANGUAGE), |b| &b.home_page)?
            .require("gmail")?
            .to_string();
        let link = dom::contains(host, &Scope::Document, &label).await?;
        host.click(&link).await?;
        Ok(self)
    }

    /// Follow the image search link
    pub async fn open_images(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        let label = self
            .resolver
            .group(language, |b| &b.home_page)?
            .require("images")?
            .to_string();
        let link = dom::contains(host, &Scope::Document, &label).await?;
        host.click(&link).await?;
        Ok(self)
    }

    /// Type `query` into the search input, pressing Enter when `submit` is set
    pub async fn search(&self, host: &dyn Host, query: &str, submit: bool, language: Option<Language>) -> ProbeResult<&Self> {
        let input = dom::get_first(host, &Scope::Document, &self.selectors(language)?.search_input).await?;
        host.type_text(&input, query).await?;
        if submit {
            host.submit(&input).await?;
        }
        Ok(self)
    }

    /// Every suggestion is visible in the autocomplete list
    pub async fn assert_autocomplete_suggestions_are_visible<S: AsRef<str> + Sync>(
        &self,
        host: &dyn Host,
        suggestions: &[S],
    ) -> ProbeResult<&Self> {
        let listbox = dom::get_first(host, &Scope::Document, &Selector::css(r#"[role="listbox"]"#)).await?;
        assertion::is_visible_content_multiple(host, &Scope::within(&listbox), suggestions).await?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockEvent, MockHost, MockNode, MockPage};

    fn page() -> HomePage {
        HomePage::new(Resolver::builtin().unwrap())
    }

    #[test]
    fn test_selectors_follow_language() {
        let polish = page().selectors(Some(Language::Polish)).unwrap();
        assert_eq!(polish.search_input.css_part(), r#"textarea[aria-label="Szukaj"]"#);
        assert_eq!(polish.google_apps_toggle.css_part(), r#"[aria-label="Aplikacje Google"]"#);

        let english = page().selectors(None).unwrap();
        assert_eq!(english.feeling_lucky_button.css_part(), r#"[aria-label="I'm Feeling Lucky"]"#);
        assert_eq!(english.google_apps_container.css_part(), r#"iframe[name="app"]"#);
    }

    #[test]
    fn test_selectors_ignore_unrelated_gap_in_default() {
        use crate::translations::TranslationStore;

        let mut store = TranslationStore::builtin().unwrap();
        let mut english = store.bundle(Language::English).unwrap().clone();
        english.home_page.google_offered_in = None;
        store.insert(Language::English, english);
        let home = HomePage::new(Resolver::new(store));

        let polish = home.selectors(Some(Language::Polish)).unwrap();
        assert_eq!(polish.search_input.css_part(), r#"textarea[aria-label="Szukaj"]"#);
        assert!(home.selectors(None).is_ok());
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page().page_url(Some(Language::Polish), None), "/?hl=pl");
        assert_eq!(page().page_url(None, None), "/?hl=en");
    }

    #[tokio::test]
    async fn test_accept_cookies_only_clicks_visible_exact_match() {
        let mut fixture = MockPage::new("/?hl=en", "Google");
        let body = fixture.body();
        let modal = fixture.append(body, MockNode::new("div").id("modal"));
        let partial = fixture.append(modal, MockNode::new("button").text("Accept all cookies"));
        let hidden = fixture.append(modal, MockNode::new("button").text("Accept all").hidden());
        let shown = fixture.append(modal, MockNode::new("button").text(" Accept all "));
        fixture.on_set_attribute(partial, MockEvent::Click, modal, "data-clicked", "partial");
        fixture.on_set_attribute(hidden, MockEvent::Click, modal, "data-clicked", "hidden");
        fixture.on_set_attribute(shown, MockEvent::Click, modal, "data-clicked", "shown");
        let host = MockHost::new().with_page(fixture);

        let home = page();
        home.visit(&host, None).await.unwrap();
        let _ = home.accept_cookies_if_present(&host, None).await.unwrap();

        let modal = dom::get_first(&host, &Scope::Document, &Selector::css("#modal")).await.unwrap();
        assert_eq!(
            host.attribute(&modal, "data-clicked").await.unwrap().as_deref(),
            Some("shown")
        );
    }

    #[tokio::test]
    async fn test_accept_cookies_without_modal_is_noop() {
        let host = MockHost::new().with_page(MockPage::new("/?hl=pl", "Google"));
        let home = page();
        home.visit(&host, Some(Language::Polish)).await.unwrap();
        let _ = home.accept_cookies_if_present(&host, Some(Language::Polish)).await.unwrap();
        assert!(!host.was_called("click:"));
    }
}
