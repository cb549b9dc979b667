//! CDP-backed host.
//!
//! Element handles refer to entries in a registry the host installs in
//! the page's top-level window. Each document gets a fresh registry with
//! its own generation tag, so handles captured before a navigation fail
//! instead of silently pointing at nodes of the new document.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCookiesParams, EnableParams as NetworkEnableParams, EventResponseReceived,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{join_url, ElementHandle, Host, Overflow, Scope, ScrollMetrics};
use crate::config::ProbeConfig;
use crate::locator::Selector;
use crate::network::Intercept;
use crate::result::{ProbeError, ProbeResult};
use crate::viewport::Viewport;
use crate::wait::{self, WaitOptions, DEFAULT_PAGE_LOAD_TIMEOUT_MS};

/// Installs `window.__polyprobe` and binds it to `r`
const REGISTRY_JS: &str = r#"
const r = window.__polyprobe || (window.__polyprobe = (() => {
  const gen = Math.random().toString(36).slice(2);
  const nodes = [];
  const register = (el) => {
    let i = nodes.indexOf(el);
    if (i < 0) { i = nodes.length; nodes.push(el); }
    return { id: gen + ':' + i, tagName: el.tagName.toLowerCase(), textContent: el.textContent };
  };
  const get = (id) => {
    const [g, i] = id.split(':');
    const el = g === gen ? nodes[Number(i)] : undefined;
    if (!el || !el.isConnected) throw new Error('element ' + id + ' is detached from the page');
    return el;
  };
  const visible = (el) => {
    if (!el || !el.isConnected) return false;
    const rect = el.getBoundingClientRect();
    if (rect.width === 0 && rect.height === 0) return false;
    if (typeof el.checkVisibility === 'function'
        && !el.checkVisibility({ checkOpacity: true, checkVisibilityCSS: true })) return false;
    const frame = el.ownerDocument.defaultView.frameElement;
    return frame ? visible(frame) : true;
  };
  return { register, get, visible };
})());
"#;

/// Tags whose text never renders
const SKIPPED_TEXT_TAGS: &str = "['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']";

/// Deepest element under `root` whose rendered text contains `text`
///
/// Only text nodes count, so a script or style inside a parent never
/// makes the parent a hit.
fn find_text_script(root: &str, include_root: bool, text: &str) -> String {
    format!(
        "const root = {root};
const skipped = {SKIPPED_TEXT_TAGS};
const textOf = (el) => skipped.includes(el.tagName) ? '' : Array.from(el.childNodes)
  .map((n) => n.nodeType === Node.TEXT_NODE ? n.nodeValue
    : n.nodeType === Node.ELEMENT_NODE ? textOf(n) : '')
  .join('');
const has = (el) => textOf(el).includes({text});
const all = Array.from(root ? root.querySelectorAll('*') : []);
if ({include_root} && root) all.unshift(root);
const hit = all.find((el) => has(el) && !Array.from(el.children).some(has));
return {{ value: hit ? r.register(hit) : null }};"
    )
}

#[derive(Debug, Deserialize)]
struct Reply<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScrollMetrics {
    overflow_y: String,
    scroll_height: f64,
    client_height: f64,
}

#[derive(Debug, Default)]
struct AliasState {
    intercepts: Vec<Intercept>,
    pending: HashMap<String, usize>,
}

impl AliasState {
    fn record(&mut self, url: &str) {
        for intercept in &self.intercepts {
            if intercept.matches(url) {
                debug!(alias = %intercept.alias, url, "Response matched alias");
                *self.pending.entry(intercept.alias.clone()).or_default() += 1;
            }
        }
    }

    fn take(&mut self, alias: &str) -> bool {
        match self.pending.get_mut(alias) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

fn page_error(e: impl Display) -> ProbeError {
    ProbeError::PageError { message: e.to_string() }
}

fn launch_error(e: impl Display) -> ProbeError {
    ProbeError::BrowserLaunchError { message: e.to_string() }
}

fn js_string(value: &str) -> ProbeResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Chromium controlled over the DevTools protocol
#[derive(Debug)]
pub struct ChromiumHost {
    config: ProbeConfig,
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    aliases: Arc<StdMutex<AliasState>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
    #[allow(dead_code)]
    listener: tokio::task::JoinHandle<()>,
}

impl ChromiumHost {
    /// Launch a browser and open a blank page sized to the configured viewport
    pub async fn launch(config: ProbeConfig) -> ProbeResult<Self> {
        config.validate()?;
        let viewport = &config.default_viewport;
        let mut builder = CdpConfig::builder().window_size(viewport.width, viewport.height);

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        if config.disable_web_security {
            builder = builder
                .arg("--disable-web-security")
                .arg("--disable-site-isolation-trials")
                .arg("--disable-features=IsolateOrigins,site-per-process");
        }

        let cdp_config = builder.build().map_err(launch_error)?;
        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(launch_error)?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    warn!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(page_error)?;
        page.execute(NetworkEnableParams::default()).await.map_err(page_error)?;

        let aliases = Arc::new(StdMutex::new(AliasState::default()));
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(page_error)?;
        let listener_aliases = Arc::clone(&aliases);
        let listener = tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                listener_aliases
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record(&event.response.url);
            }
        });

        info!(headless = config.headless, "Launched chromium");
        let host = Self {
            config,
            browser: Arc::new(Mutex::new(browser)),
            page,
            aliases,
            handle,
            listener,
        };
        host.set_viewport(&host.config.default_viewport.clone()).await?;
        Ok(host)
    }

    /// Configuration the browser was launched with
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Tag responses matching `intercept` with its alias
    pub fn intercept(&self, intercept: Intercept) {
        info!(alias = %intercept.alias, pattern = %intercept.pattern, "Intercepting");
        self.aliases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .intercepts
            .push(intercept);
    }

    /// Register several interceptors
    pub fn intercept_all(&self, intercepts: impl IntoIterator<Item = Intercept>) {
        for intercept in intercepts {
            self.intercept(intercept);
        }
    }

    /// Close the browser
    pub async fn close(self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(launch_error)?;
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, body: &str) -> ProbeResult<T> {
        let script = format!("(() => {{ {REGISTRY_JS}\n{body} }})()");
        let result = self.page.evaluate(script).await.map_err(page_error)?;
        let reply: Reply<T> = result.into_value().map_err(page_error)?;
        Ok(reply.value)
    }

    /// Run `body` with the element bound to `el`
    async fn eval_on<T: DeserializeOwned>(&self, element: &ElementHandle, body: &str) -> ProbeResult<T> {
        let id = js_string(&element.id)?;
        self.eval(&format!("const el = r.get({id});\n{body}")).await
    }

    fn root_expr(scope: &Scope) -> ProbeResult<String> {
        match scope {
            Scope::Document => Ok("document".to_string()),
            Scope::Within(el) => Ok(format!("r.get({})", js_string(&el.id)?)),
        }
    }

    async fn press_enter(&self) -> ProbeResult<()> {
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind.clone())
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13);
            if kind == DispatchKeyEventType::KeyDown {
                builder = builder.text("\r");
            }
            let params = builder.build().map_err(page_error)?;
            self.page.execute(params).await.map_err(page_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Host for ChromiumHost {
    fn wait_options(&self) -> WaitOptions {
        self.config.wait_options()
    }

    async fn visit(&self, url: &str) -> ProbeResult<()> {
        let absolute = join_url(&self.config.base_url, url);
        info!(url = %absolute, "Visiting");
        self.page
            .goto(absolute.as_str())
            .await
            .map_err(|e| ProbeError::NavigationError {
                url: absolute.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        self.page.reload().await.map_err(page_error)?;
        Ok(())
    }

    async fn clear_cookies(&self) -> ProbeResult<()> {
        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(page_error)?;
        Ok(())
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        self.eval::<bool>("try { localStorage.clear(); } catch (e) {}\nreturn { value: true };")
            .await?;
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> ProbeResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(page_error)?;
        self.page.execute(params).await.map_err(page_error)?;
        debug!(viewport = %viewport.name, "Viewport set");
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self.page.url().await.map_err(page_error)?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> ProbeResult<String> {
        let title = self.page.get_title().await.map_err(page_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn query_all(&self, scope: &Scope, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        let root = Self::root_expr(scope)?;
        let query = selector.to_query_all("root");
        self.eval(&format!(
            "const root = {root};\nreturn {{ value: {query}.map(r.register) }};"
        ))
        .await
    }

    async fn find_text(&self, scope: &Scope, text: &str) -> ProbeResult<Option<ElementHandle>> {
        let (root, include_root) = match scope {
            Scope::Document => ("document.body".to_string(), true),
            Scope::Within(_) => (Self::root_expr(scope)?, false),
        };
        let text = js_string(text)?;
        self.eval(&find_text_script(&root, include_root, &text)).await
    }

    async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.eval_on(element, "return { value: r.visible(el) };").await
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        let name = js_string(name)?;
        self.eval_on(element, &format!("return {{ value: el.getAttribute({name}) }};"))
            .await
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        debug!(element = %element.id, "Click");
        self.eval_on::<bool>(element, "el.click();\nreturn { value: true };")
            .await?;
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.eval_on::<bool>(element, "el.focus();\nreturn { value: document.activeElement === el };")
            .await?;
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(page_error)?;
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.eval_on::<bool>(element, "el.focus();\nreturn { value: true };")
            .await?;
        self.press_enter().await
    }

    async fn scroll_to_bottom(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.eval_on::<bool>(element, "el.scrollTop = el.scrollHeight;\nreturn { value: true };")
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.eval_on::<bool>(
            element,
            "el.scrollIntoView({ block: 'center', inline: 'nearest' });\nreturn { value: true };",
        )
        .await?;
        Ok(())
    }

    async fn parent_element(&self, element: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
        self.eval_on(
            element,
            "return { value: el.parentElement ? r.register(el.parentElement) : null };",
        )
        .await
    }

    async fn is_document_root(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.eval_on(
            element,
            "const d = el.ownerDocument;\nreturn { value: el === d.body || el === d.documentElement };",
        )
        .await
    }

    async fn scroll_metrics(&self, element: &ElementHandle) -> ProbeResult<ScrollMetrics> {
        let raw: RawScrollMetrics = self
            .eval_on(
                element,
                "const s = el.ownerDocument.defaultView.getComputedStyle(el);
return { value: { overflowY: s.overflowY, scrollHeight: el.scrollHeight, clientHeight: el.clientHeight } };",
            )
            .await?;
        Ok(ScrollMetrics {
            overflow_y: Overflow::parse(&raw.overflow_y),
            scroll_height: raw.scroll_height,
            client_height: raw.client_height,
        })
    }

    async fn frame_content_root(&self, frame: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
        self.eval_on(
            frame,
            "let body = null;
try { body = el.contentDocument && el.contentDocument.body; } catch (e) { body = null; }
return { value: body ? r.register(body) : null };",
        )
        .await
    }

    async fn child_count(&self, element: &ElementHandle) -> ProbeResult<usize> {
        self.eval_on(element, "return { value: el.childNodes.length };").await
    }

    async fn wait_for_alias(&self, alias: &str) -> ProbeResult<()> {
        let options = WaitOptions::new()
            .with_timeout(DEFAULT_PAGE_LOAD_TIMEOUT_MS)
            .with_poll_interval(self.config.poll_interval_ms);
        let aliases = Arc::clone(&self.aliases);
        wait::wait_for(&options, &format!("@{alias}"), || {
            let aliases = Arc::clone(&aliases);
            async move { Ok(aliases.lock().unwrap_or_else(PoisonError::into_inner).take(alias)) }
        })
        .await?;
        info!(alias, "Alias satisfied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::UrlPattern;

    #[test]
    fn test_find_text_script_walks_text_nodes() {
        let script = find_text_script("document.body", true, "\"Gmail\"");
        assert!(script.contains("Node.TEXT_NODE ? n.nodeValue"));
        assert!(script.contains("skipped.includes(el.tagName) ? ''"));
        assert!(script.contains("textOf(el).includes(\"Gmail\")"));
        assert!(!script.contains("textContent"));
        assert!(script.contains("if (true && root)"));
    }

    #[test]
    fn test_alias_state_counts_each_response_once() {
        let mut state = AliasState::default();
        state
            .intercepts
            .push(Intercept::new("load", UrlPattern::Contains("gen_204".into())));
        state.record("https://www.google.com/gen_204?atyp=csi");
        state.record("https://www.google.com/favicon.ico");
        assert!(state.take("load"));
        assert!(!state.take("load"));
        assert!(!state.take("other"));
    }

    #[test]
    fn test_reply_unwraps_null_value() {
        let reply: Reply<Option<ElementHandle>> = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert!(reply.value.is_none());
    }
}
