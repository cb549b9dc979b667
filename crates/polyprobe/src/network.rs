//! Network aliases.
//!
//! A test registers interceptors that tag matching responses with an
//! alias, then waits on the alias with [`Host::wait_for_alias`]. Each
//! matching response satisfies exactly one wait.
//!
//! [`Host::wait_for_alias`]: crate::host::Host::wait_for_alias

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias tagged on the response that marks a page as fully loaded
pub const LOAD_FINISHED_ALIAS: &str = "loadFinishedRequest";

/// Pattern for matching response URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "*google.com/gen_204*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) | Self::Prefix(s) | Self::Contains(s) | Self::Regex(s) | Self::Glob(s) => {
                f.write_str(s)
            }
            Self::Any => f.write_str("*"),
        }
    }
}

/// `*` matches any run of characters; everything else is literal
fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return url.is_empty(),
    };
    let Some(mut tail) = url.strip_prefix(*first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return tail.is_empty();
    };
    for part in middle {
        match tail.find(part) {
            Some(found) => tail = &tail[found + part.len()..],
            None => return false,
        }
    }
    // last literal is anchored at the end of the URL
    tail.ends_with(*last)
}

/// Tag responses whose URL matches `pattern` with `alias`
///
/// A [`UrlPattern::Regex`] is compiled once here; an invalid regex
/// matches nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "InterceptDef", into = "InterceptDef")]
pub struct Intercept {
    /// Name waited on with `wait_for_alias`
    pub alias: String,
    /// Response URLs to tag
    pub pattern: UrlPattern,
    regex: Option<regex::Regex>,
}

impl Intercept {
    /// Create an interceptor
    #[must_use]
    pub fn new(alias: impl Into<String>, pattern: UrlPattern) -> Self {
        let regex = match &pattern {
            UrlPattern::Regex(source) => regex::Regex::new(source).ok(),
            _ => None,
        };
        Self {
            alias: alias.into(),
            pattern,
            regex,
        }
    }

    /// Check a response URL against the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match &self.pattern {
            UrlPattern::Regex(_) => self.regex.as_ref().is_some_and(|re| re.is_match(url)),
            pattern => pattern.matches(url),
        }
    }
}

impl PartialEq for Intercept {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias && self.pattern == other.pattern
    }
}

impl Eq for Intercept {}

#[derive(Serialize, Deserialize)]
struct InterceptDef {
    alias: String,
    pattern: UrlPattern,
}

impl From<InterceptDef> for Intercept {
    fn from(def: InterceptDef) -> Self {
        Self::new(def.alias, def.pattern)
    }
}

impl From<Intercept> for InterceptDef {
    fn from(intercept: Intercept) -> Self {
        Self {
            alias: intercept.alias,
            pattern: intercept.pattern,
        }
    }
}

/// Load-finished ping of the search home page
#[must_use]
pub fn home_interceptors() -> Vec<Intercept> {
    vec![Intercept::new(
        LOAD_FINISHED_ALIAS,
        UrlPattern::Glob("*google.com/gen_204?*".to_string()),
    )]
}

/// Load-finished request of the webmail landing page
#[must_use]
pub fn mail_interceptors() -> Vec<Intercept> {
    vec![Intercept::new(
        LOAD_FINISHED_ALIAS,
        UrlPattern::Glob("*workspace.google.com/*/gmail/*".to_string()),
    )]
}

/// Load-finished ping of the image search page
#[must_use]
pub fn images_interceptors() -> Vec<Intercept> {
    vec![Intercept::new(
        LOAD_FINISHED_ALIAS,
        UrlPattern::Regex(r"google\.com/(gen_204|client_204)\?.*imghp".to_string()),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_kinds() {
        let url = "https://www.google.com/gen_204?atyp=csi&hl=pl";
        assert!(UrlPattern::Exact(url.to_string()).matches(url));
        assert!(UrlPattern::Prefix("https://www.google.com/".to_string()).matches(url));
        assert!(UrlPattern::Contains("gen_204".to_string()).matches(url));
        assert!(UrlPattern::Regex(r"hl=\w+$".to_string()).matches(url));
        assert!(UrlPattern::Any.matches(url));
        assert!(!UrlPattern::Regex("(".to_string()).matches(url));
    }

    #[test]
    fn test_glob() {
        assert!(glob_matches("*google.com/gen_204?*", "https://www.google.com/gen_204?a=1"));
        assert!(!glob_matches("*google.com/gen_204?*", "https://www.google.com/search?q=x"));
        assert!(glob_matches("https://*/gmail/", "https://workspace.google.com/intl/pl/gmail/"));
        assert!(!glob_matches("https://*/gmail/", "https://workspace.google.com/gmail/x"));
    }

    #[test]
    fn test_glob_trailing_literal_may_recur() {
        assert!(UrlPattern::Glob("*.js".to_string()).matches("https://x/a.js.js"));
        assert!(UrlPattern::Glob("*gen_204".to_string())
            .matches("https://www.google.com/gen_204/gen_204"));
        assert!(!UrlPattern::Glob("*.js".to_string()).matches("https://x/a.js.map"));
        assert!(!UrlPattern::Glob("*gen_204".to_string()).matches("https://www.google.com/gen_204?a=1"));
        assert!(glob_matches("a*a", "aa"));
        assert!(!glob_matches("a*a", "a"));
        assert!(glob_matches("exact", "exact"));
        assert!(!glob_matches("exact", "exact/"));
    }

    #[test]
    fn test_intercept_compiles_regex_once() {
        let intercept = Intercept::new("ping", UrlPattern::Regex(r"gen_204\?.*hl=pl".to_string()));
        assert!(intercept.regex.is_some());
        assert!(intercept.matches("https://www.google.com/gen_204?atyp=csi&hl=pl"));
        assert!(!intercept.matches("https://www.google.com/gen_204?hl=en"));

        let invalid = Intercept::new("broken", UrlPattern::Regex("(".to_string()));
        assert!(invalid.regex.is_none());
        assert!(!invalid.matches("anything"));

        let glob = Intercept::new("load", UrlPattern::Glob("*gen_204?*".to_string()));
        assert!(glob.regex.is_none());
        assert!(glob.matches("https://www.google.com/gen_204?a=1"));
    }

    #[test]
    fn test_intercept_deserialize_recompiles_regex() {
        let json = serde_json::to_string(&images_interceptors()[0]).unwrap();
        let intercept: Intercept = serde_json::from_str(&json).unwrap();
        assert_eq!(intercept, images_interceptors()[0]);
        assert!(intercept.regex.is_some());
        assert!(intercept.matches("https://www.google.com/gen_204?s=imghp&t=1"));
    }

    #[test]
    fn test_presets_use_load_finished_alias() {
        for intercept in home_interceptors()
            .into_iter()
            .chain(mail_interceptors())
            .chain(images_interceptors())
        {
            assert_eq!(intercept.alias, LOAD_FINISHED_ALIAS);
        }
        assert!(mail_interceptors()[0]
            .pattern
            .matches("https://workspace.google.com/intl/en-US/gmail/"));
        assert!(images_interceptors()[0]
            .pattern
            .matches("https://www.google.com/gen_204?s=imghp&t=1"));
    }
}
