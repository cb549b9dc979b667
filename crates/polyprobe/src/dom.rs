//! Auto-waiting DOM helpers built on [`Host`].

use tracing::{debug, info};

use crate::host::{ElementHandle, Host, Scope};
use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::wait;

/// Every element matching `selector`, waiting until there is at least one
pub async fn get_all(host: &dyn Host, scope: &Scope, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
    let options = host.wait_options();
    wait::poll_until(&options, &format!("element {selector}"), || async move {
        let found = host.query_all(scope, selector).await?;
        Ok((!found.is_empty()).then_some(found))
    })
    .await
}

/// First element matching `selector`
pub async fn get_first(host: &dyn Host, scope: &Scope, selector: &Selector) -> ProbeResult<ElementHandle> {
    let mut found = get_all(host, scope, selector).await?;
    Ok(found.swap_remove(0))
}

/// Deepest element containing `text`, waiting for it to appear
pub async fn contains(host: &dyn Host, scope: &Scope, text: &str) -> ProbeResult<ElementHandle> {
    let options = host.wait_options();
    wait::poll_until(&options, &format!("content \"{text}\""), || host.find_text(scope, text)).await
}

/// Nearest scrollable element, starting from `start` itself and walking up.
///
/// The document body/root ends the walk and is never returned.
pub async fn find_scrollable_parent(host: &dyn Host, start: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
    let mut node = Some(start.clone());
    while let Some(current) = node {
        if host.is_document_root(&current).await? {
            break;
        }
        let metrics = host.scroll_metrics(&current).await?;
        if metrics.is_scrollable() {
            debug!(tag = %current.tag_name, scroll_height = metrics.scroll_height, "found scrollable parent");
            return Ok(Some(current));
        }
        node = host.parent_element(&current).await?;
    }

    info!("No scrollable parent found");
    Ok(None)
}

/// Body of the frame matching `selector`, once it has content.
///
/// Polls until the frame element exists, its document is reachable and
/// the body has at least one child node.
pub async fn frame_body(host: &dyn Host, selector: &Selector) -> ProbeResult<ElementHandle> {
    let options = host.wait_options();
    wait::poll_until(&options, &format!("frame {selector} body"), || async move {
        let Some(frame) = host.query_all(&Scope::Document, selector).await?.into_iter().next() else {
            return Ok(None);
        };
        let Some(body) = host.frame_content_root(&frame).await? else {
            return Ok(None);
        };
        Ok((host.child_count(&body).await? > 0).then_some(body))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHost, MockNode, MockPage, Overflow};

    async fn load(page: MockPage) -> MockHost {
        let host = MockHost::new().with_page(page);
        host.visit("/").await.unwrap();
        host
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_get_all_times_out_when_missing() {
            let host = load(MockPage::new("/", "Google")).await;
            let err = get_all(&host, &Scope::Document, &Selector::css("svg"))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("element svg"));
        }

        #[tokio::test]
        async fn test_contains_finds_text() {
            let mut page = MockPage::new("/", "Google");
            let div = page.append(page.body(), MockNode::new("div"));
            let _ = page.append(div, MockNode::new("span").text("Accept all"));
            let host = load(page).await;
            let el = contains(&host, &Scope::Document, "Accept").await.unwrap();
            assert_eq!(el.tag_name, "span");
        }
    }

    mod scroll_tests {
        use super::*;

        #[tokio::test]
        async fn test_none_without_overflow_styling() {
            let mut page = MockPage::new("/", "Google");
            let modal = page.append(page.body(), MockNode::new("div").scrollable(Overflow::Visible, 900.0, 300.0));
            let _ = page.append(modal, MockNode::new("h1").text("Before you continue"));
            let host = load(page).await;

            let header = contains(&host, &Scope::Document, "Before you continue").await.unwrap();
            assert!(find_scrollable_parent(&host, &header).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_nearest_qualifying_ancestor() {
            let mut page = MockPage::new("/", "Google");
            let outer = page.append(
                page.body(),
                MockNode::new("div").id("outer").scrollable(Overflow::Scroll, 2000.0, 500.0),
            );
            let inner = page.append(
                outer,
                MockNode::new("div").id("inner").scrollable(Overflow::Auto, 900.0, 300.0),
            );
            let _ = page.append(inner, MockNode::new("h1").text("Header"));
            let host = load(page).await;

            let header = contains(&host, &Scope::Document, "Header").await.unwrap();
            let found = find_scrollable_parent(&host, &header).await.unwrap().unwrap();
            assert_eq!(host.attribute(&found, "id").await.unwrap().as_deref(), Some("inner"));
        }

        #[tokio::test]
        async fn test_start_node_itself_qualifies() {
            let mut page = MockPage::new("/", "Google");
            let _ = page.append(
                page.body(),
                MockNode::new("div").text("Scroll me").scrollable(Overflow::Auto, 900.0, 300.0),
            );
            let host = load(page).await;
            let el = contains(&host, &Scope::Document, "Scroll me").await.unwrap();
            assert_eq!(find_scrollable_parent(&host, &el).await.unwrap(), Some(el.clone()));
        }

        #[tokio::test]
        async fn test_content_that_fits_is_skipped() {
            let mut page = MockPage::new("/", "Google");
            let fits = page.append(page.body(), MockNode::new("div").scrollable(Overflow::Auto, 300.0, 300.0));
            let _ = page.append(fits, MockNode::new("p").text("Short"));
            let host = load(page).await;
            let el = contains(&host, &Scope::Document, "Short").await.unwrap();
            assert!(find_scrollable_parent(&host, &el).await.unwrap().is_none());
        }
    }

    mod frame_tests {
        use super::*;

        #[tokio::test]
        async fn test_waits_for_frame_document() {
            let mut page = MockPage::new("/", "Google");
            let (frame, body) = page.append_frame(page.body(), MockNode::new("iframe").attr("name", "app"));
            let _ = page.append(body, MockNode::new("a").text("Maps"));
            page.frame_loads_after(frame, 3);
            let host = load(page).await;

            let body = frame_body(&host, &Selector::css(r#"iframe[name="app"]"#)).await.unwrap();
            assert_eq!(body.tag_name, "body");
            let maps = contains(&host, &Scope::within(&body), "Maps").await.unwrap();
            assert_eq!(maps.tag_name, "a");
        }

        #[tokio::test]
        async fn test_empty_frame_body_times_out() {
            let mut page = MockPage::new("/", "Google");
            let _ = page.append_frame(page.body(), MockNode::new("iframe").attr("title", "reCAPTCHA"));
            let host = load(page).await;

            let err = frame_body(&host, &Selector::css(r#"iframe[title="reCAPTCHA"]"#))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_frame_text_not_in_document_scope() {
            let mut page = MockPage::new("/", "Google");
            let (_, body) = page.append_frame(page.body(), MockNode::new("iframe").attr("name", "app"));
            let _ = page.append(body, MockNode::new("a").text("Maps"));
            let host = load(page).await;
            assert!(host.find_text(&Scope::Document, "Maps").await.unwrap().is_none());
        }
    }
}
