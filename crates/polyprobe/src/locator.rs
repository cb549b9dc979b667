//! Selectors for locating elements.
//!
//! Page objects build selectors out of translated strings, so attribute
//! values are escaped and text filters are kept apart from the CSS part
//! (plain CSS has no `:contains`).

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., `textarea[aria-label="Search"]`)
    Css(String),
    /// Elements matching `css` whose text content includes `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector with a text filter
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// `tag[attr="value"]` with `value` escaped; an empty `tag` matches any element
    #[must_use]
    pub fn attr(tag: &str, attr: &str, value: &str) -> Self {
        Self::Css(format!("{tag}[{attr}=\"{}\"]", escape_css_string(value)))
    }

    /// The CSS part of the selector
    #[must_use]
    pub fn css_part(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// The text filter, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::Css(_) => None,
            Self::CssWithText { text, .. } => Some(text),
        }
    }

    /// JavaScript expression returning every match under `root`
    #[must_use]
    pub fn to_query_all(&self, root: &str) -> String {
        match self {
            Self::Css(s) => format!("Array.from({root}.querySelectorAll({s:?}))"),
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({css:?})).filter(el => (el.textContent || '').includes({text:?}))"
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::CssWithText { css, text } => write!(f, "{css}:contains(\"{text}\")"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::Css(css.to_string())
    }
}

impl From<String> for Selector {
    fn from(css: String) -> Self {
        Self::Css(css)
    }
}

/// Escape a value for use inside a double-quoted CSS string
#[must_use]
pub fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_selector() {
        let sel = Selector::attr("textarea", "aria-label", "Search");
        assert_eq!(sel, Selector::css(r#"textarea[aria-label="Search"]"#));
    }

    #[test]
    fn test_attr_selector_without_tag() {
        let sel = Selector::attr("", "aria-label", "I'm Feeling Lucky");
        assert_eq!(sel.css_part(), r#"[aria-label="I'm Feeling Lucky"]"#);
    }

    #[test]
    fn test_attr_value_is_escaped() {
        let sel = Selector::attr("img", "alt", r#"The "best" \ logo"#);
        assert_eq!(sel.css_part(), r#"img[alt="The \"best\" \\ logo"]"#);
    }

    #[test]
    fn test_css_with_text_parts() {
        let sel = Selector::css_with_text("a", "Sign in");
        assert_eq!(sel.css_part(), "a");
        assert_eq!(sel.text_filter(), Some("Sign in"));
        assert_eq!(sel.to_string(), r#"a:contains("Sign in")"#);
        assert!(Selector::css("a").text_filter().is_none());
    }

    #[test]
    fn test_query_all_script() {
        let js = Selector::css_with_text("a", "Sign in").to_query_all("document");
        assert!(js.contains("querySelectorAll(\"a\")"));
        assert!(js.contains("includes(\"Sign in\")"));
    }
}
