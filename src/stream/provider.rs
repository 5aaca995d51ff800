//! Stream descriptor types and the redirect-resolution seam.
//!
//! A [`StreamDescriptor`] is the unit handed to the media player: a
//! directly playable URL plus display labels. Redirect-style backends need
//! one extra HTTP round trip before that URL is known; the
//! [`RedirectResolver`] trait is that round trip.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::http_client::SiteClient;

/// Subtitle track attached to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub url: String,
    /// Language tag (e.g. `"eng"`).
    pub lang: String,
}

/// A playable stream, normalized across backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Short label shown in the player's source list.
    pub name: String,
    /// Longer description line.
    pub title: String,
    /// Directly fetchable playable resource.
    pub url: String,
    pub subtitles: Vec<Subtitle>,
    /// Streams sharing a key belong to the same binge sequence.
    pub group_key: String,
}

/// Body returned by a redirect-style backend URL.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RedirectTarget {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Resolves a redirect-style backend URL to its real target.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    async fn resolve_redirect(&self, url: &str) -> Result<RedirectTarget>;
}

#[async_trait]
impl RedirectResolver for SiteClient {
    async fn resolve_redirect(&self, url: &str) -> Result<RedirectTarget> {
        self.fetch_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_target_tolerates_missing_fields() {
        let t: RedirectTarget = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(t, RedirectTarget::default());

        let t: RedirectTarget =
            serde_json::from_str(r#"{"url": "https://cdn/f.m3u8", "subtitle": null}"#).unwrap();
        assert_eq!(t.url.as_deref(), Some("https://cdn/f.m3u8"));
        assert!(t.subtitle.is_none());
    }
}
