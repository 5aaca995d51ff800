//! Site HTTP client (the markup accessor)
//!
//! Features:
//! - Browser-like identity on every request (see [`crate::fingerprint`])
//! - Bounded per-request and connect timeouts
//! - Non-2xx statuses surface as errors, never as bodies
//! - No internal retries: retry policy belongs to the caller

use anyhow::Result;
use reqwest::{Client, Response};
use scraper::Html;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{self, ResolveError};
use crate::fingerprint::{random_profile, BrowserProfile};

/// A fetched HTML page plus the URL it came from.
///
/// Kept as raw text so it can live across `.await` points; call
/// [`Document::parse`] to get a DOM.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    html: String,
}

impl Document {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parse into a DOM. Parsing never fails; malformed markup is repaired.
    #[must_use]
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Resolve a link found on this page against the page URL.
    #[must_use]
    pub fn absolutize(&self, href: &str) -> Option<String> {
        let base = url::Url::parse(&self.url).ok()?;
        base.join(href).ok().map(String::from)
    }
}

/// HTTP client bound to the content site.
#[derive(Clone)]
pub struct SiteClient {
    client: Client,
    base_url: String,
}

impl SiteClient {
    /// Create a client with a random browser profile.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_profile(config, &random_profile())
    }

    /// Create a client with a specific browser profile.
    pub fn with_profile(config: &Config, profile: &BrowserProfile) -> Result<Self> {
        let client = Client::builder()
            .default_headers(profile.to_headers())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .cookie_store(true)
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Origin of the content site, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> error::Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::network(url, &e))?;

        debug!(status = %response.status(), "Response received");

        response
            .error_for_status()
            .map_err(|e| ResolveError::network(url, &e))
    }

    /// Fetch an HTML page.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_document(&self, url: &str) -> error::Result<Document> {
        let html = self.fetch_text(url).await?;
        Ok(Document::new(url, html))
    }

    /// Fetch a body as text (player scripts, listing pages).
    pub async fn fetch_text(&self, url: &str) -> error::Result<String> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| ResolveError::network(url, &e))
    }

    /// Fetch and decode a JSON body.
    ///
    /// A body that isn't valid JSON for `T` is [`ResolveError::MalformedUpstream`].
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> error::Result<T> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::network(url, &e))?;
        serde_json::from_slice(&bytes).map_err(|e| ResolveError::malformed(url, e.to_string()))
    }
}
