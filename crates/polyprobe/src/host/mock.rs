//! In-memory host for unit testing page objects without a browser.
//!
//! A [`MockPage`] is a small DOM arena registered under a URL. Visiting
//! the URL loads a fresh copy; event handlers attached to nodes mutate
//! the copy (show/hide nodes, set attributes, navigate) the way the real
//! page would react to clicks, typing and scrolling.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{join_url, ElementHandle, Host, Overflow, Scope, ScrollMetrics};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::viewport::Viewport;
use crate::wait::{self, WaitOptions};

/// Tags whose text never renders
const SKIPPED_TEXT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Index of a node inside a [`MockPage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A DOM element in a mock page
#[derive(Debug, Clone)]
pub struct MockNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
    scroll: ScrollMetrics,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    frame_body: Option<NodeId>,
    frame_owner: Option<NodeId>,
}

impl MockNode {
    /// Create an element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            visible: true,
            scroll: ScrollMetrics::default(),
            parent: None,
            children: Vec::new(),
            frame_body: None,
            frame_owner: None,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attrs.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Start hidden (`display: none` or off-screen)
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Give the element vertical scroll geometry
    #[must_use]
    pub const fn scrollable(mut self, overflow_y: Overflow, scroll_height: f64, client_height: f64) -> Self {
        self.scroll = ScrollMetrics {
            overflow_y,
            scroll_height,
            client_height,
        };
        self
    }
}

/// Event a mock page reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockEvent {
    /// Element clicked
    Click,
    /// Text typed into the element
    Type,
    /// Enter pressed in the element
    Submit,
    /// Element scrolled to its bottom
    ScrollToBottom,
    /// Element scrolled into view
    ScrollIntoView,
}

#[derive(Debug, Clone)]
enum MockAction {
    Show(NodeId),
    Hide(NodeId),
    SetAttribute(NodeId, String, String),
    Navigate(String),
    FireAlias(String),
}

/// A page fixture: URL, title, DOM and event handlers
#[derive(Debug, Clone)]
pub struct MockPage {
    url: String,
    title: String,
    nodes: Vec<MockNode>,
    handlers: Vec<(NodeId, MockEvent, MockAction)>,
    aliases_on_load: Vec<String>,
    frame_delays: BTreeMap<NodeId, u32>,
}

impl MockPage {
    /// Create an empty page with a `<body>`
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            nodes: vec![MockNode::new("body")],
            handlers: Vec::new(),
            aliases_on_load: Vec::new(),
            frame_delays: BTreeMap::new(),
        }
    }

    /// The document body
    #[must_use]
    pub const fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Page URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Append `node` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, mut node: MockNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an `<iframe>`; returns the frame element and its content body
    pub fn append_frame(&mut self, parent: NodeId, frame: MockNode) -> (NodeId, NodeId) {
        let frame_id = self.append(parent, frame);
        let body_id = NodeId(self.nodes.len());
        let mut body = MockNode::new("body");
        body.frame_owner = Some(frame_id);
        self.nodes.push(body);
        self.nodes[frame_id.0].frame_body = Some(body_id);
        (frame_id, body_id)
    }

    /// The frame document stays unavailable for the first `polls` accesses
    pub fn frame_loads_after(&mut self, frame: NodeId, polls: u32) {
        let _ = self.frame_delays.insert(frame, polls);
    }

    /// Show `target` when `event` happens on `node`
    pub fn on_show(&mut self, node: NodeId, event: MockEvent, target: NodeId) {
        self.handlers.push((node, event, MockAction::Show(target)));
    }

    /// Hide `target` when `event` happens on `node`
    pub fn on_hide(&mut self, node: NodeId, event: MockEvent, target: NodeId) {
        self.handlers.push((node, event, MockAction::Hide(target)));
    }

    /// Set an attribute on `target` when `event` happens on `node`
    pub fn on_set_attribute(
        &mut self,
        node: NodeId,
        event: MockEvent,
        target: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.handlers.push((
            node,
            event,
            MockAction::SetAttribute(target, name.into(), value.into()),
        ));
    }

    /// Navigate to `url` when `event` happens on `node`
    pub fn on_navigate(&mut self, node: NodeId, event: MockEvent, url: impl Into<String>) {
        self.handlers.push((node, event, MockAction::Navigate(url.into())));
    }

    /// Tag a response with `alias` when `event` happens on `node`
    pub fn on_alias(&mut self, node: NodeId, event: MockEvent, alias: impl Into<String>) {
        self.handlers.push((node, event, MockAction::FireAlias(alias.into())));
    }

    /// Tag a response with `alias` every time the page loads
    #[must_use]
    pub fn with_alias_on_load(mut self, alias: impl Into<String>) -> Self {
        self.aliases_on_load.push(alias.into());
        self
    }

    fn node(&self, id: NodeId) -> &MockNode {
        &self.nodes[id.0]
    }

    fn text_content(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }

    /// Text that renders, leaving out script and style subtrees
    fn rendered_text(&self, id: NodeId) -> String {
        let node = self.node(id);
        if SKIPPED_TEXT_TAGS.contains(&node.tag.as_str()) {
            return String::new();
        }
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.rendered_text(*child));
        }
        text
    }

    fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if !node.visible {
                return false;
            }
            current = node.parent.or(node.frame_owner);
        }
        true
    }

    fn subtree(&self, root: NodeId, include_root: bool, out: &mut Vec<NodeId>) {
        if include_root {
            out.push(root);
        }
        for child in &self.node(root).children {
            self.subtree(*child, true, out);
        }
    }
}

#[derive(Debug)]
struct MockState {
    pages: HashMap<String, MockPage>,
    current: Option<MockPage>,
    generation: u64,
    history: Vec<String>,
    pending_aliases: HashMap<String, usize>,
    viewport: Viewport,
}

impl MockState {
    fn load(&mut self, url: &str) -> ProbeResult<()> {
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ProbeError::NavigationError {
                url: url.to_string(),
                message: "no page registered for URL".to_string(),
            })?;
        for alias in &page.aliases_on_load {
            *self.pending_aliases.entry(alias.clone()).or_default() += 1;
        }
        self.current = Some(page);
        self.generation += 1;
        Ok(())
    }

    fn page(&self) -> ProbeResult<&MockPage> {
        self.current.as_ref().ok_or_else(|| ProbeError::PageError {
            message: "no page loaded".to_string(),
        })
    }

    fn page_mut(&mut self) -> ProbeResult<&mut MockPage> {
        self.current.as_mut().ok_or_else(|| ProbeError::PageError {
            message: "no page loaded".to_string(),
        })
    }

    fn handle(&self, id: NodeId) -> ProbeResult<ElementHandle> {
        let page = self.page()?;
        let node = page.node(id);
        Ok(ElementHandle::new(format!("{}:{}", self.generation, id.0), node.tag.clone())
            .with_text(page.text_content(id)))
    }

    fn resolve(&self, element: &ElementHandle) -> ProbeResult<NodeId> {
        let detached = || ProbeError::PageError {
            message: format!("element {} is detached from the page", element.id),
        };
        let (generation, index) = element.id.split_once(':').ok_or_else(detached)?;
        let generation: u64 = generation.parse().map_err(|_| detached())?;
        let index: usize = index.parse().map_err(|_| detached())?;
        if generation != self.generation || index >= self.page()?.nodes.len() {
            return Err(detached());
        }
        Ok(NodeId(index))
    }

    fn scope_nodes(&self, scope: &Scope) -> ProbeResult<Vec<NodeId>> {
        let page = self.page()?;
        let mut nodes = Vec::new();
        match scope {
            Scope::Document => page.subtree(page.body(), true, &mut nodes),
            Scope::Within(element) => page.subtree(self.resolve(element)?, false, &mut nodes),
        }
        Ok(nodes)
    }

    fn dispatch(&mut self, node: NodeId, event: MockEvent, base_url: &str) -> ProbeResult<()> {
        let actions: Vec<MockAction> = self
            .page()?
            .handlers
            .iter()
            .filter(|(n, e, _)| *n == node && *e == event)
            .map(|(_, _, action)| action.clone())
            .collect();

        for action in actions {
            match action {
                MockAction::Show(target) => self.page_mut()?.nodes[target.0].visible = true,
                MockAction::Hide(target) => self.page_mut()?.nodes[target.0].visible = false,
                MockAction::SetAttribute(target, name, value) => {
                    let _ = self.page_mut()?.nodes[target.0].attrs.insert(name, value);
                }
                MockAction::FireAlias(alias) => {
                    *self.pending_aliases.entry(alias).or_default() += 1;
                }
                MockAction::Navigate(url) => {
                    let url = join_url(base_url, &url);
                    self.history.push(format!("navigate:{url}"));
                    return self.load(&url);
                }
            }
        }
        Ok(())
    }
}

/// Host backed by registered [`MockPage`] fixtures
#[derive(Debug)]
pub struct MockHost {
    base_url: String,
    options: WaitOptions,
    state: Mutex<MockState>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a mock host with no pages and short waits
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: "https://www.google.com".to_string(),
            options: WaitOptions::new().with_timeout(200).with_poll_interval(5),
            state: Mutex::new(MockState {
                pages: HashMap::new(),
                current: None,
                generation: 0,
                history: Vec::new(),
                pending_aliases: HashMap::new(),
                viewport: Viewport::default(),
            }),
        }
    }

    /// Base URL relative visits are joined to
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override query timeouts
    #[must_use]
    pub const fn with_wait_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a page under its URL
    pub fn register(&self, page: MockPage) {
        let url = join_url(&self.base_url, page.url());
        let _ = self.lock().pages.insert(url, page);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_page(self, page: MockPage) -> Self {
        self.register(page);
        self
    }

    /// Tag one response with `alias`
    pub fn fire_alias(&self, alias: &str) {
        *self.lock().pending_aliases.entry(alias.to_string()).or_default() += 1;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if an operation was recorded
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(method))
    }

    /// Viewport last set
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.lock().viewport.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, entry: String) {
        self.lock().history.push(entry);
    }

    fn fire(&self, element: &ElementHandle, event: MockEvent, entry: String) -> ProbeResult<()> {
        let mut state = self.lock();
        let node = state.resolve(element)?;
        state.history.push(entry);
        state.dispatch(node, event, &self.base_url)
    }
}

#[async_trait]
impl Host for MockHost {
    fn wait_options(&self) -> WaitOptions {
        self.options
    }

    async fn visit(&self, url: &str) -> ProbeResult<()> {
        let absolute = join_url(&self.base_url, url);
        let mut state = self.lock();
        state.history.push(format!("visit:{absolute}"));
        state.load(&absolute)
    }

    async fn reload(&self) -> ProbeResult<()> {
        let mut state = self.lock();
        let url = state.page()?.url.clone();
        let url = join_url(&self.base_url, &url);
        state.history.push("reload".to_string());
        state.load(&url)
    }

    async fn clear_cookies(&self) -> ProbeResult<()> {
        self.record("clear_cookies".to_string());
        Ok(())
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        self.record("clear_local_storage".to_string());
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> ProbeResult<()> {
        let mut state = self.lock();
        state
            .history
            .push(format!("viewport:{}x{}", viewport.width, viewport.height));
        state.viewport = viewport.clone();
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let state = self.lock();
        Ok(state
            .current
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |p| join_url(&self.base_url, &p.url)))
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self.lock().current.as_ref().map(|p| p.title.clone()).unwrap_or_default())
    }

    async fn query_all(&self, scope: &Scope, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        let compound = Compound::parse(selector.css_part())?;
        let state = self.lock();
        let page = state.page()?;
        state
            .scope_nodes(scope)?
            .into_iter()
            .filter(|id| compound.matches(page.node(*id)))
            .filter(|id| {
                selector
                    .text_filter()
                    .map_or(true, |text| page.text_content(*id).contains(text))
            })
            .map(|id| state.handle(id))
            .collect()
    }

    async fn find_text(&self, scope: &Scope, text: &str) -> ProbeResult<Option<ElementHandle>> {
        let state = self.lock();
        let page = state.page()?;
        let deepest = state.scope_nodes(scope)?.into_iter().find(|id| {
            page.rendered_text(*id).contains(text)
                && !page
                    .node(*id)
                    .children
                    .iter()
                    .any(|child| page.rendered_text(*child).contains(text))
        });
        deepest.map(|id| state.handle(id)).transpose()
    }

    async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let state = self.lock();
        let node = state.resolve(element)?;
        Ok(state.page()?.is_visible(node))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        let state = self.lock();
        let node = state.resolve(element)?;
        Ok(state.page()?.node(node).attrs.get(name).cloned())
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.fire(element, MockEvent::Click, format!("click:{}", element.id))
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        {
            let mut state = self.lock();
            let node = state.resolve(element)?;
            let value = state.page_mut()?.nodes[node.0]
                .attrs
                .entry("value".to_string())
                .or_default();
            value.push_str(text);
        }
        self.fire(element, MockEvent::Type, format!("type:{}:{text}", element.id))
    }

    async fn submit(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.fire(element, MockEvent::Submit, format!("submit:{}", element.id))
    }

    async fn scroll_to_bottom(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.fire(
            element,
            MockEvent::ScrollToBottom,
            format!("scroll_to_bottom:{}", element.id),
        )
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.fire(
            element,
            MockEvent::ScrollIntoView,
            format!("scroll_into_view:{}", element.id),
        )
    }

    async fn parent_element(&self, element: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
        let state = self.lock();
        let node = state.resolve(element)?;
        state.page()?.node(node).parent.map(|p| state.handle(p)).transpose()
    }

    async fn is_document_root(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let state = self.lock();
        let node = state.resolve(element)?;
        Ok(state.page()?.node(node).parent.is_none())
    }

    async fn scroll_metrics(&self, element: &ElementHandle) -> ProbeResult<ScrollMetrics> {
        let state = self.lock();
        let node = state.resolve(element)?;
        Ok(state.page()?.node(node).scroll)
    }

    async fn frame_content_root(&self, frame: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
        let mut state = self.lock();
        let node = state.resolve(frame)?;
        let page = state.page_mut()?;
        if let Some(remaining) = page.frame_delays.get_mut(&node) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(None);
            }
        }
        let body = page.node(node).frame_body;
        body.map(|b| state.handle(b)).transpose()
    }

    async fn child_count(&self, element: &ElementHandle) -> ProbeResult<usize> {
        let state = self.lock();
        let node = state.page()?.node(state.resolve(element)?);
        Ok(node.children.len() + usize::from(!node.text.is_empty()))
    }

    async fn wait_for_alias(&self, alias: &str) -> ProbeResult<()> {
        let waited_for = format!("alias @{alias}");
        wait::poll_until(&self.options, &waited_for, || {
            let hit = {
                let mut state = self.lock();
                match state.pending_aliases.get_mut(alias) {
                    Some(count) if *count > 0 => {
                        *count -= 1;
                        true
                    }
                    _ => false,
                }
            };
            async move { Ok(hit.then_some(())) }
        })
        .await
    }
}

/// A single compound CSS selector: `tag#id.class[attr="value"]`
#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(css: &str) -> ProbeResult<Self> {
        let invalid = |reason: &str| ProbeError::PageError {
            message: format!("unsupported selector '{css}': {reason}"),
        };
        let mut chars = css.trim().chars().peekable();
        let mut compound = Self::default();

        let tag = take_ident(&mut chars);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some(c) = chars.next() {
            match c {
                '#' => compound.id = Some(take_ident(&mut chars)),
                '.' => compound.classes.push(take_ident(&mut chars)),
                '[' => {
                    let name = take_ident(&mut chars);
                    match chars.next() {
                        Some(']') => compound.attrs.push((name, None)),
                        Some('=') => {
                            let value = if chars.peek() == Some(&'"') {
                                let _ = chars.next();
                                take_quoted(&mut chars).ok_or_else(|| invalid("unterminated string"))?
                            } else {
                                chars.by_ref().take_while(|c| *c != ']').collect::<String>()
                            };
                            if chars.peek() == Some(&']') {
                                let _ = chars.next();
                            }
                            compound.attrs.push((name, Some(value)));
                        }
                        _ => return Err(invalid("malformed attribute")),
                    }
                }
                _ => return Err(invalid("only single compound selectors are supported")),
            }
        }
        Ok(compound)
    }

    fn matches(&self, node: &MockNode) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != node.tag) {
            return false;
        }
        if self
            .id
            .as_ref()
            .is_some_and(|id| node.attrs.get("id") != Some(id))
        {
            return false;
        }
        let classes: Vec<&str> = node
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(value) => node.attrs.get(name) == Some(value),
            None => node.attrs.contains_key(name),
        })
    }
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    ident
}

fn take_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(value),
            '\\' => match chars.next()? {
                'a' if chars.peek() == Some(&' ') => {
                    let _ = chars.next();
                    value.push('\n');
                }
                escaped => value.push(escaped),
            },
            _ => value.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MockPage, NodeId, NodeId) {
        let mut page = MockPage::new("/", "Google");
        let body = page.body();
        let form = page.append(body, MockNode::new("form").class("search"));
        let input = page.append(
            form,
            MockNode::new("textarea").attr("aria-label", "Search").id("q"),
        );
        let button = page.append(
            form,
            MockNode::new("input").attr("aria-label", "Google Search"),
        );
        let _ = page.append(body, MockNode::new("a").text("Gmail"));
        (page, input, button)
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_parse_compound() {
            let c = Compound::parse(r#"textarea#q.big[aria-label="Search"][disabled]"#).unwrap();
            assert_eq!(c.tag.as_deref(), Some("textarea"));
            assert_eq!(c.id.as_deref(), Some("q"));
            assert_eq!(c.classes, vec!["big"]);
            assert_eq!(
                c.attrs,
                vec![
                    ("aria-label".to_string(), Some("Search".to_string())),
                    ("disabled".to_string(), None)
                ]
            );
        }

        #[test]
        fn test_parse_escaped_value() {
            let sel = Selector::attr("img", "alt", r#"say "hi""#);
            let c = Compound::parse(sel.css_part()).unwrap();
            assert_eq!(c.attrs[0].1.as_deref(), Some(r#"say "hi""#));
        }

        #[test]
        fn test_descendant_combinator_rejected() {
            assert!(Compound::parse("form textarea").is_err());
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_query_by_attribute() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            let found = host
                .query_all(&Scope::Document, &Selector::attr("", "aria-label", "Google Search"))
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].tag_name, "input");
        }

        #[tokio::test]
        async fn test_query_with_text_filter() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            let found = host
                .query_all(&Scope::Document, &Selector::css_with_text("a", "Gmail"))
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
            let none = host
                .query_all(&Scope::Document, &Selector::css_with_text("a", "Images"))
                .await
                .unwrap();
            assert!(none.is_empty());
        }

        #[tokio::test]
        async fn test_find_text_returns_deepest() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            let el = host.find_text(&Scope::Document, "Gmail").await.unwrap().unwrap();
            assert_eq!(el.tag_name, "a");
        }

        #[tokio::test]
        async fn test_find_text_ignores_script_and_style() {
            let mut page = MockPage::new("/", "Google");
            let body = page.body();
            let panel = page.append(body, MockNode::new("div").id("panel"));
            let _ = page.append(panel, MockNode::new("script").text("var label = 'Gmail';"));
            let _ = page.append(panel, MockNode::new("style").text(".Gmail { color: red }"));
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            assert!(host.find_text(&Scope::Document, "Gmail").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_within_scope_excludes_outside() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            let form = host
                .query_all(&Scope::Document, &Selector::css("form.search"))
                .await
                .unwrap()
                .remove(0);
            let inside = host.find_text(&Scope::within(&form), "Gmail").await.unwrap();
            assert!(inside.is_none());
        }

        #[tokio::test]
        async fn test_stale_handle_after_navigation() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();
            let el = host.find_text(&Scope::Document, "Gmail").await.unwrap().unwrap();
            host.reload().await.unwrap();
            assert!(host.is_visible(&el).await.is_err());
        }

        #[tokio::test]
        async fn test_unknown_url_fails() {
            let host = MockHost::new();
            let err = host.visit("/nowhere").await.unwrap_err();
            assert!(matches!(err, ProbeError::NavigationError { .. }));
        }
    }

    mod event_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_hides_target() {
            let (mut page, _, button) = page();
            let banner = page.append(page.body(), MockNode::new("div").text("Banner"));
            page.on_hide(button, MockEvent::Click, banner);
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();

            let banner = host.find_text(&Scope::Document, "Banner").await.unwrap().unwrap();
            assert!(host.is_visible(&banner).await.unwrap());
            let button = host
                .query_all(&Scope::Document, &Selector::attr("input", "aria-label", "Google Search"))
                .await
                .unwrap()
                .remove(0);
            host.click(&button).await.unwrap();
            assert!(!host.is_visible(&banner).await.unwrap());
        }

        #[tokio::test]
        async fn test_type_sets_value() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();
            let input = host
                .query_all(&Scope::Document, &Selector::css("#q"))
                .await
                .unwrap()
                .remove(0);
            host.type_text(&input, "test search").await.unwrap();
            assert_eq!(
                host.attribute(&input, "value").await.unwrap().as_deref(),
                Some("test search")
            );
            assert!(host.was_called("type:"));
        }

        #[tokio::test]
        async fn test_alias_wait() {
            let page = MockPage::new("/", "Google").with_alias_on_load("loadFinishedRequest");
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();
            host.wait_for_alias("loadFinishedRequest").await.unwrap();
            let err = host.wait_for_alias("loadFinishedRequest").await.unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_clean_state_reload_order() {
            let (page, _, _) = page();
            let host = MockHost::new().with_page(page);
            host.visit("/").await.unwrap();
            host.clean_state_reload().await.unwrap();
            let history = host.history();
            assert_eq!(
                &history[1..],
                ["clear_cookies", "clear_local_storage", "reload"]
            );
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://www.google.com/", "/imghp?hl=pl"), "https://www.google.com/imghp?hl=pl");
        assert_eq!(join_url("https://www.google.com", "https://workspace.google.com/"), "https://workspace.google.com/");
    }
}
