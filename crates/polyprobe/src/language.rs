//! Supported languages and their URL-facing locale codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::ProbeError;

/// Language every lookup falls back to
pub const DEFAULT_LANGUAGE: Language = Language::English;

/// A language the suite can run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default)
    English,
    /// Polish
    Polish,
}

impl Language {
    /// Every supported language in a stable order
    pub const ALL: [Self; 2] = [Self::English, Self::Polish];

    /// Locale code used in page URLs (`hl=`, `/intl/{code}/`)
    #[must_use]
    pub const fn locale_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Polish => "pl",
        }
    }

    /// Identifier used in translation resources and test names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Polish => "polish",
        }
    }

    /// Resolve an optional language to a concrete one
    #[must_use]
    pub fn or_default(language: Option<Self>) -> Self {
        language.unwrap_or(DEFAULT_LANGUAGE)
    }
}

impl Default for Language {
    fn default() -> Self {
        DEFAULT_LANGUAGE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProbeError::Config {
                message: format!("unknown language '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_codes() {
        assert_eq!(Language::English.locale_code(), "en");
        assert_eq!(Language::Polish.locale_code(), "pl");
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::or_default(None), DEFAULT_LANGUAGE);
        assert_eq!(Language::or_default(Some(Language::Polish)), Language::Polish);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("polish".parse::<Language>().unwrap(), Language::Polish);
        assert_eq!(" English ".parse::<Language>().unwrap(), Language::English);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Language::Polish).unwrap();
        assert_eq!(json, "\"polish\"");
        let back: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(back, Language::English);
    }
}
