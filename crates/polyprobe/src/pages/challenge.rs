//! Bot-check challenge page shown instead of search results.

use crate::assertion;
use crate::dom;
use crate::host::{Host, Scope};
use crate::language::Language;
use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::translations::Resolver;

/// Bot-check challenge shown in place of search results.
///
/// It has no URL of its own, so it is not a [`PageObject`](crate::PageObject).
#[derive(Debug, Clone)]
pub struct ChallengePage {
    resolver: Resolver,
}

impl ChallengePage {
    /// Frame hosting the checkbox widget
    pub const FRAME: &'static str = r#"iframe[title="reCAPTCHA"]"#;
    /// Checkbox label inside the frame
    pub const ANCHOR_LABEL: &'static str = "#recaptcha-anchor-label";
    /// Checkbox border inside the frame
    pub const CHECKBOX_BORDER: &'static str = ".recaptcha-checkbox-border";

    /// Create the page object
    #[must_use]
    pub const fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Checkbox visible in its frame, explanatory copy visible around it
    pub async fn assert_recaptcha_is_visible(&self, host: &dyn Host, language: Option<Language>) -> ProbeResult<&Self> {
        let body = dom::frame_body(host, &Selector::css(Self::FRAME)).await?;
        assertion::is_visible_element_multiple(
            host,
            &Scope::within(&body),
            &[Selector::css(Self::ANCHOR_LABEL), Selector::css(Self::CHECKBOX_BORDER)],
        )
        .await?;

        // the checkbox label is rendered inside the frame
        let outside_frame = self
            .resolver
            .group(language, |b| &b.recaptcha)?
            .values_except(&["notARobot"])?;
        assertion::is_visible_content_multiple(host, &Scope::Document, &outside_frame).await?;
        Ok(self)
    }
}
