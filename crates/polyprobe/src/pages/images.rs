//! Image search page: logo, search input and navigation links.

use crate::assertion;
use crate::dom;
use crate::host::{Host, Scope};
use crate::language::Language;
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::translations::Resolver;

/// Selectors of the image search page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagesSelectors {
    /// Logo image
    pub logo: Selector,
    /// Search input
    pub search_input: Selector,
}

impl ImagesSelectors {
    /// All selectors in declaration order
    #[must_use]
    pub fn all(&self) -> Vec<Selector> {
        vec![self.logo.clone(), self.search_input.clone()]
    }
}

/// Image search page (`/imghp?hl={langCode}`)
#[derive(Debug, Clone)]
pub struct ImagesPage {
    resolver: Resolver,
}

impl PageObject for ImagesPage {
    fn url_template(&self) -> &str {
        "/imghp?hl={langCode}"
    }

    fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn page_name(&self) -> &str {
        "images"
    }
}

impl ImagesPage {
    /// Indices of the `svg` elements that are rendered on load
    pub const VISIBLE_SVG_INDICES: [usize; 4] = [0, 2, 4, 5];

    /// Create the page object
    #[must_use]
    pub const fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Selectors derived from `language`'s translations
    pub fn selectors(&self, language: Option<Language>) -> ProbeResult<ImagesSelectors> {
        let t = self.resolver.group(language, |b| &b.images_page)?;
        Ok(ImagesSelectors {
            logo: Selector::attr("img", "alt", t.require("logoAlt")?),
            search_input: Selector::attr("input", "aria-label", t.require("searchInputAriaLabel")?),
        })
    }

    /// Icons rendered on load, picked by index
    pub async fn assert_svgs_are_visible(&self, host: &dyn Host) -> ProbeResult<&Self> {
        let svg = Selector::css("svg");
        for index in Self::VISIBLE_SVG_INDICES {
            assertion::is_visible_nth(host, &Scope::Document, &svg, index).await?;
        }
        Ok(self)
    }

    /// Landed on image search with footer, logo label and search input visible
    pub async fn assert_images_navigation(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        let footer = self.resolver.group(language, |b| &b.footer)?;
        let images = self.resolver.group(language, |b| &b.images_page)?;
        let selectors = self.selectors(language)?;

        assertion::url_includes(host, &self.page_url(language, None)).await?;
        assertion::title_includes(host, "Google Images").await?;
        self.assert_svgs_are_visible(host).await?;
        assertion::is_visible_content_multiple(host, &Scope::Document, &footer.values()?).await?;

        let logo = dom::get_first(host, &Scope::Document, &selectors.logo).await?;
        let logo_container = host
            .parent_element(&logo)
            .await?
            .ok_or_else(|| ProbeError::PageError {
                message: format!("{} has no parent element", selectors.logo),
            })?;
        assertion::is_visible_content(host, &Scope::within(&logo_container), images.require("images")?).await?;

        assertion::is_visible_element_multiple(host, &Scope::Document, &selectors.all()).await?;
        Ok(self)
    }
}
