//! Polyprobe: Translation-Aware Page Objects for Multi-Language UI Tests
//!
//! Page objects derive every selector and expected string from a
//! per-language translation bundle, falling back to English for anything
//! a language leaves out. All page interaction goes through the [`Host`]
//! trait, so the same page objects run against a real browser
//! ([`ChromiumHost`], feature `browser`) or the in-memory [`MockHost`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   POLYPROBE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Translation│    │ Page       │    │ Host       │            │
//! │   │ Resolver   │───►│ Objects    │───►│ (CDP/Mock) │            │
//! │   │ (YAML)     │    │ + asserts  │    │            │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use polyprobe::{HomePage, Language, MockHost, MockNode, MockPage, PageObject, Resolver};
//!
//! # tokio_test(async {
//! let mut page = MockPage::new("/?hl=pl", "Google");
//! let body = page.body();
//! page.append(body, MockNode::new("button").text("Zaakceptuj wszystko"));
//! let host = MockHost::new().with_page(page);
//!
//! let home = HomePage::new(Resolver::builtin()?);
//! home.visit(&host, Some(Language::Polish)).await?;
//! home.accept_cookies_if_present(&host, Some(Language::Polish)).await?;
//! assert!(host.was_called("click:"));
//! # Ok::<(), polyprobe::ProbeError>(())
//! # });
//! # fn tokio_test<F: std::future::Future<Output = Result<(), polyprobe::ProbeError>>>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f).unwrap();
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod assertion;
mod config;
pub mod dom;
pub mod geo;
pub mod host;
mod language;
mod locator;
pub mod logging;
pub mod network;
mod page_object;
mod pages;
mod partition;
mod result;
pub mod translations;
mod viewport;
pub mod wait;

pub use assertion::{AssertionResult, Visibility};
pub use config::{ProbeConfig, DEFAULT_BASE_URL};
pub use geo::{CountryLookup, FixedCountry};
#[cfg(feature = "browser")]
pub use geo::IpWhoIsLookup;
#[cfg(feature = "browser")]
pub use host::ChromiumHost;
pub use host::{ElementHandle, Host, MockEvent, MockHost, MockNode, MockPage, NodeId, Overflow, Scope, ScrollMetrics};
pub use language::{Language, DEFAULT_LANGUAGE};
pub use locator::{escape_css_string, Selector};
pub use network::{Intercept, UrlPattern, LOAD_FINISHED_ALIAS};
pub use page_object::{build_url, PageObject, LANG_CODE_PLACEHOLDER};
pub use pages::{
    ChallengePage, HomePage, HomeSelectors, ImagesPage, ImagesSelectors, MailPage, MailSelectors, Pages,
};
pub use partition::{split_into_parts, SCROLL_PARTS};
pub use result::{ProbeError, ProbeResult};
pub use translations::{ResolvedGroup, Resolver, TranslationBundle, TranslationGroup, TranslationStore};
pub use viewport::{Viewport, VIEWPORTS};
pub use wait::WaitOptions;
