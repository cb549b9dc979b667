//! Country of the current network origin.
//!
//! The home page shows a language promotion and a country name in its
//! footer that depend on where the request comes from.

use async_trait::async_trait;
use serde::Deserialize;

use crate::language::Language;
use crate::result::{ProbeError, ProbeResult};

/// Endpoint queried by [`IpWhoIsLookup`]
pub const IPWHOIS_URL: &str = "https://ipwho.is/";

/// Source of the current country name (English, as reported by the lookup service)
#[async_trait]
pub trait CountryLookup: Send + Sync {
    /// Country name for the current public IP
    async fn country(&self) -> ProbeResult<String>;
}

/// Always reports the same country
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCountry(pub String);

impl FixedCountry {
    /// Create a fixed lookup
    #[must_use]
    pub fn new(country: impl Into<String>) -> Self {
        Self(country.into())
    }
}

#[async_trait]
impl CountryLookup for FixedCountry {
    async fn country(&self) -> ProbeResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct IpWhoIsResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Extract the country from an ipwho.is response; anything but HTTP 200 is an error
pub fn country_from_response(status: u16, body: &str) -> ProbeResult<String> {
    if status != 200 {
        return Err(ProbeError::GeolocationError {
            message: format!("{IPWHOIS_URL} returned HTTP {status}"),
        });
    }
    let response: IpWhoIsResponse = serde_json::from_str(body)?;
    if response.success == Some(false) {
        return Err(ProbeError::GeolocationError {
            message: response.message.unwrap_or_else(|| "lookup unsuccessful".to_string()),
        });
    }
    response.country.ok_or_else(|| ProbeError::GeolocationError {
        message: "response has no country field".to_string(),
    })
}

/// Lookup through the public ipwho.is service
#[cfg(feature = "browser")]
#[derive(Debug, Clone, Default)]
pub struct IpWhoIsLookup {
    client: reqwest::Client,
}

#[cfg(feature = "browser")]
impl IpWhoIsLookup {
    /// Create a lookup with a default HTTP client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup with a custom reqwest client (for custom timeouts, etc.)
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl CountryLookup for IpWhoIsLookup {
    async fn country(&self) -> ProbeResult<String> {
        let response = self
            .client
            .get(IPWHOIS_URL)
            .send()
            .await
            .map_err(|e| ProbeError::GeolocationError { message: e.to_string() })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::GeolocationError { message: e.to_string() })?;
        let country = country_from_response(status, &body)?;
        tracing::info!(%country, "resolved country from current IP");
        Ok(country)
    }
}

/// Country name as the home page footer shows it in `language`.
///
/// Countries without an entry are shown with the name the lookup returned.
#[must_use]
pub fn localized_country_name(country: &str, language: Language) -> String {
    match (country, language) {
        ("Poland", Language::English) => "Poland".to_string(),
        ("Poland", Language::Polish) => "Polska".to_string(),
        _ => country.to_string(),
    }
}

/// Endonym of the language the home page promotes to visitors using `language`
#[must_use]
pub const fn promoted_language_label(language: Language) -> &'static str {
    match language {
        Language::English => "polski",
        Language::Polish => "English",
    }
}

/// Whether the "offered in" promotion appears for this country and language
#[must_use]
pub fn shows_language_promotion(country: &str, language: Language) -> bool {
    country == "Poland" && language == Language::English
}
