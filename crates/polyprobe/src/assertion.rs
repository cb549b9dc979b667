//! Visibility and content assertions.
//!
//! Every item auto-waits up to the host's command timeout for its
//! expected state. Batch variants check items in order and stop at the
//! first failure. Hidden and absent both count as "not visible".

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::host::{Host, Scope};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::wait;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into an error on failure
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Expected visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Present and rendered
    Visible,
    /// Absent or hidden
    NotVisible,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("be visible"),
            Self::NotVisible => f.write_str("not be visible"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Content(&'a str),
    Element(&'a Selector),
    Nth(&'a Selector, usize),
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(text) => write!(f, "content \"{text}\""),
            Self::Element(selector) => write!(f, "element {selector}"),
            Self::Nth(selector, index) => write!(f, "element {selector} at index {index}"),
        }
    }
}

async fn currently_visible(host: &dyn Host, scope: &Scope, target: Target<'_>) -> ProbeResult<bool> {
    match target {
        Target::Content(text) => match host.find_text(scope, text).await? {
            Some(element) => host.is_visible(&element).await,
            None => Ok(false),
        },
        Target::Element(selector) => {
            for element in host.query_all(scope, selector).await? {
                if host.is_visible(&element).await? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Target::Nth(selector, index) => match host.query_all(scope, selector).await?.get(index) {
            Some(element) => host.is_visible(element).await,
            None => Ok(false),
        },
    }
}

async fn check(host: &dyn Host, scope: &Scope, target: Target<'_>, expected: Visibility) -> ProbeResult<AssertionResult> {
    let options = host.wait_options();
    let waited_for = format!("{target} to {expected}");
    let outcome = wait::wait_for(&options, &waited_for, || async move {
        let visible = currently_visible(host, scope, target).await?;
        Ok(visible == (expected == Visibility::Visible))
    })
    .await;

    match outcome {
        Ok(()) => Ok(AssertionResult::pass()),
        Err(err) if err.is_timeout() => Ok(AssertionResult::fail(format!(
            "expected {target} to {expected} within {}ms",
            options.timeout_ms
        ))),
        Err(err) => Err(err),
    }
}

/// Assert the deepest element containing `text` is visible
pub async fn is_visible_content(host: &dyn Host, scope: &Scope, text: &str) -> ProbeResult<()> {
    check(host, scope, Target::Content(text), Visibility::Visible)
        .await?
        .into_result()
}

/// Assert every text is visible
pub async fn is_visible_content_multiple<S: AsRef<str>>(host: &dyn Host, scope: &Scope, texts: &[S]) -> ProbeResult<()> {
    for text in texts {
        is_visible_content(host, scope, text.as_ref()).await?;
    }
    Ok(())
}

/// Assert `text` is absent or hidden
pub async fn is_not_visible_content(host: &dyn Host, scope: &Scope, text: &str) -> ProbeResult<()> {
    check(host, scope, Target::Content(text), Visibility::NotVisible)
        .await?
        .into_result()
}

/// Assert every text is absent or hidden
pub async fn is_not_visible_content_multiple<S: AsRef<str>>(
    host: &dyn Host,
    scope: &Scope,
    texts: &[S],
) -> ProbeResult<()> {
    for text in texts {
        is_not_visible_content(host, scope, text.as_ref()).await?;
    }
    Ok(())
}

/// Assert an element matching `selector` is visible
pub async fn is_visible_element(host: &dyn Host, scope: &Scope, selector: &Selector) -> ProbeResult<()> {
    check(host, scope, Target::Element(selector), Visibility::Visible)
        .await?
        .into_result()
}

/// Assert every selector matches a visible element
pub async fn is_visible_element_multiple(host: &dyn Host, scope: &Scope, selectors: &[Selector]) -> ProbeResult<()> {
    for selector in selectors {
        is_visible_element(host, scope, selector).await?;
    }
    Ok(())
}

/// Assert the `index`-th element matching `selector` is visible
pub async fn is_visible_nth(host: &dyn Host, scope: &Scope, selector: &Selector, index: usize) -> ProbeResult<()> {
    check(host, scope, Target::Nth(selector, index), Visibility::Visible)
        .await?
        .into_result()
}

/// Assert no element matching `selector` is visible
pub async fn is_not_visible_element(host: &dyn Host, scope: &Scope, selector: &Selector) -> ProbeResult<()> {
    check(host, scope, Target::Element(selector), Visibility::NotVisible)
        .await?
        .into_result()
}

/// Assert no selector matches a visible element
pub async fn is_not_visible_element_multiple(
    host: &dyn Host,
    scope: &Scope,
    selectors: &[Selector],
) -> ProbeResult<()> {
    for selector in selectors {
        is_not_visible_element(host, scope, selector).await?;
    }
    Ok(())
}

/// Retry a string property until `accept` holds, failing with its last value
async fn eventually<F, Fut, P>(host: &dyn Host, description: &str, mut read: F, accept: P) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ProbeResult<String>>,
    P: Fn(&str) -> bool + Sync,
{
    let options = host.wait_options();
    let last = Mutex::new(String::new());
    let outcome = wait::wait_for(&options, description, || {
        let fut = read();
        let last = &last;
        let accept = &accept;
        async move {
            let value = fut.await?;
            let accepted = accept(&value);
            *last.lock().unwrap_or_else(PoisonError::into_inner) = value;
            Ok(accepted)
        }
    })
    .await;

    match outcome {
        Err(err) if err.is_timeout() => {
            let last = last.into_inner().unwrap_or_else(PoisonError::into_inner);
            Err(ProbeError::assertion(format!("expected {description}, got \"{last}\"")))
        }
        other => other,
    }
}

/// Assert the current URL includes `fragment`
pub async fn url_includes(host: &dyn Host, fragment: &str) -> ProbeResult<()> {
    eventually(
        host,
        &format!("url to include \"{fragment}\""),
        || host.current_url(),
        |url| url.contains(fragment),
    )
    .await
}

/// Assert the document title equals `expected`
pub async fn title_equals(host: &dyn Host, expected: &str) -> ProbeResult<()> {
    eventually(
        host,
        &format!("title to equal \"{expected}\""),
        || host.title(),
        |title| title == expected,
    )
    .await
}

/// Assert the document title includes `fragment`
pub async fn title_includes(host: &dyn Host, fragment: &str) -> ProbeResult<()> {
    eventually(
        host,
        &format!("title to include \"{fragment}\""),
        || host.title(),
        |title| title.contains(fragment),
    )
    .await
}

/// Assert the first element matching `selector` has `name="expected"`
pub async fn attribute_equals(
    host: &dyn Host,
    scope: &Scope,
    selector: &Selector,
    name: &str,
    expected: &str,
) -> ProbeResult<()> {
    eventually(
        host,
        &format!("{selector} to have {name}=\"{expected}\""),
        || async move {
            let Some(element) = host.query_all(scope, selector).await?.into_iter().next() else {
                return Ok(String::new());
            };
            Ok(host.attribute(&element, name).await?.unwrap_or_default())
        },
        |value| value == expected,
    )
    .await
}
