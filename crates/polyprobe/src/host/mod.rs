//! Host environment abstraction.
//!
//! Page objects never talk to a browser directly. Everything they need
//! from the live page goes through the [`Host`] trait, which a CDP
//! browser ([`ChromiumHost`]) or the in-memory [`MockHost`] implements.
//! Each call is awaited before the next one is issued, so host
//! operations execute strictly in program order.

mod mock;

#[cfg(feature = "browser")]
mod chromium;

#[cfg(feature = "browser")]
pub use chromium::ChromiumHost;
pub use mock::{MockEvent, MockHost, MockNode, MockPage, NodeId};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::viewport::Viewport;
use crate::wait::WaitOptions;

/// Handle to a DOM element owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementHandle {
    /// Host-assigned identifier
    pub id: String,
    /// Lowercase tag name
    pub tag_name: String,
    /// Text content at the time of the query
    #[serde(default)]
    pub text_content: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: None,
        }
    }

    /// Set the captured text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Captured text with surrounding whitespace removed
    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text_content.as_deref().map_or("", str::trim)
    }
}

/// Subtree a query is restricted to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The top-level document
    #[default]
    Document,
    /// Descendants of an element (including a frame's body)
    Within(ElementHandle),
}

impl Scope {
    /// Scope to an element
    #[must_use]
    pub fn within(element: &ElementHandle) -> Self {
        Self::Within(element.clone())
    }
}

/// Computed `overflow-y` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Content is not clipped
    #[default]
    Visible,
    /// Clipped, no scrollbars
    Hidden,
    /// Clipped, scrolling forbidden
    Clip,
    /// Scrollbars always shown
    Scroll,
    /// Scrollbars shown when needed
    Auto,
}

impl Overflow {
    /// Parse a computed style value; unknown values are treated as `visible`
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "hidden" => Self::Hidden,
            "clip" => Self::Clip,
            "scroll" => Self::Scroll,
            "auto" => Self::Auto,
            _ => Self::Visible,
        }
    }

    /// Whether the value lets the user scroll
    #[must_use]
    pub const fn allows_scrolling(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

/// Vertical scroll geometry of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// Computed `overflow-y`
    pub overflow_y: Overflow,
    /// Full content height
    pub scroll_height: f64,
    /// Visible height
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Scrollable styling and content taller than the box
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.overflow_y.allows_scrolling() && self.scroll_height > self.client_height
    }
}

/// Join a relative URL to `base`; absolute URLs are returned unchanged
pub(crate) fn join_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("about:") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{url}", base.trim_end_matches('/'))
    } else {
        format!("{}/{url}", base.trim_end_matches('/'))
    }
}

/// Operations a page object may request from the live page.
///
/// Queries do not wait; waiting is layered on top by [`crate::dom`] and
/// [`crate::assertion`] using [`Host::wait_options`].
#[async_trait]
pub trait Host: Send + Sync {
    /// Timeout and polling interval for element queries
    fn wait_options(&self) -> WaitOptions;

    /// Navigate to `url`; relative URLs are joined to the host's base URL
    async fn visit(&self, url: &str) -> ProbeResult<()>;

    /// Reload the current page
    async fn reload(&self) -> ProbeResult<()>;

    /// Delete all cookies
    async fn clear_cookies(&self) -> ProbeResult<()>;

    /// Clear local storage for the current origin
    async fn clear_local_storage(&self) -> ProbeResult<()>;

    /// Resize the viewport
    async fn set_viewport(&self, viewport: &Viewport) -> ProbeResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Current document title
    async fn title(&self) -> ProbeResult<String>;

    /// Every element in `scope` matching `selector`, in document order
    async fn query_all(&self, scope: &Scope, selector: &Selector) -> ProbeResult<Vec<ElementHandle>>;

    /// Deepest element in `scope` whose text content includes `text`
    async fn find_text(&self, scope: &Scope, text: &str) -> ProbeResult<Option<ElementHandle>>;

    /// Whether the element is rendered and visible
    async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Attribute value
    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Click the element
    async fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type into the element
    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Press Enter in the element (form submit)
    async fn submit(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Scroll the element's content to its bottom
    async fn scroll_to_bottom(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Scroll the element into view
    async fn scroll_into_view(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Parent element, `None` at the top of a document
    async fn parent_element(&self, element: &ElementHandle) -> ProbeResult<Option<ElementHandle>>;

    /// Whether the element is its document's body or root element
    async fn is_document_root(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Vertical scroll geometry
    async fn scroll_metrics(&self, element: &ElementHandle) -> ProbeResult<ScrollMetrics>;

    /// Body of a frame element's content document, if accessible yet
    async fn frame_content_root(&self, frame: &ElementHandle) -> ProbeResult<Option<ElementHandle>>;

    /// Number of child nodes
    async fn child_count(&self, element: &ElementHandle) -> ProbeResult<usize>;

    /// Wait for the next response tagged with `alias`
    async fn wait_for_alias(&self, alias: &str) -> ProbeResult<()>;

    /// Clear cookies and local storage, then reload
    async fn clean_state_reload(&self) -> ProbeResult<()> {
        self.clear_cookies().await?;
        self.clear_local_storage().await?;
        self.reload().await
    }
}
