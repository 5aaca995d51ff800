//! Content id → streams.
//!
//! This is the only entry point the addon layer calls. It never fails:
//! total failure looks exactly like "no streams right now".

use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::ResolveError;
use crate::http_client::SiteClient;
use crate::stream::diagnostics::{Diagnostics, Stage};
use crate::stream::links::resolve_candidates;
use crate::stream::pipeline::StreamPipeline;
use crate::stream::provider::StreamDescriptor;

/// Resolves content ids to playable streams under an overall deadline.
#[derive(Clone)]
pub struct StreamResolver {
    client: SiteClient,
    pipeline: StreamPipeline,
    diagnostics: Diagnostics,
    id_prefix: String,
    max_candidates: usize,
    deadline: Duration,
}

impl StreamResolver {
    /// Build a resolver with its own site client.
    pub fn new(config: &Config, diagnostics: Diagnostics) -> Result<Self> {
        Ok(Self::with_client(SiteClient::new(config)?, config, diagnostics))
    }

    #[must_use]
    pub fn with_client(client: SiteClient, config: &Config, diagnostics: Diagnostics) -> Self {
        Self {
            pipeline: StreamPipeline::new(client.clone(), config, diagnostics.clone()),
            client,
            diagnostics,
            id_prefix: config.id_prefix.clone(),
            max_candidates: config.max_candidates.max(1),
            deadline: config.deadline(),
        }
    }

    /// Strip the namespace prefix; `None` for ids this addon doesn't own.
    #[must_use]
    pub fn slug<'a>(&self, content_id: &'a str) -> Option<&'a str> {
        content_id
            .strip_prefix(self.id_prefix.as_str())
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }

    /// `<origin>/anime/<slug>`
    #[must_use]
    pub fn landing_url(&self, slug: &str) -> String {
        format!("{}/anime/{slug}", self.client.base_url())
    }

    /// Resolve a content id to streams, best first.
    #[instrument(skip(self))]
    pub async fn resolve_streams(&self, content_id: &str) -> Vec<StreamDescriptor> {
        let Some(slug) = self.slug(content_id) else {
            debug!("Content id outside this addon's namespace");
            return Vec::new();
        };
        let url = self.landing_url(slug);
        let (progress, _) = watch::channel(Stage::Start);

        if let Ok(streams) =
            tokio::time::timeout(self.deadline, self.resolve_title(&url, &progress)).await
        {
            streams
        } else {
            self.diagnostics.report(
                *progress.borrow(),
                &url,
                &ResolveError::DeadlineExceeded(self.deadline),
            );
            Vec::new()
        }
    }

    async fn resolve_title(&self, url: &str, progress: &watch::Sender<Stage>) -> Vec<StreamDescriptor> {
        let page = match self.client.fetch_document(url).await {
            Ok(page) => page,
            Err(err) => {
                self.diagnostics.report(Stage::Start, url, &err);
                return Vec::new();
            }
        };

        let candidates = resolve_candidates(&page);
        debug!(
            is_movie = candidates.is_movie,
            candidates = candidates.urls.len(),
            "Title classified"
        );
        if candidates.urls.is_empty() {
            self.diagnostics.report(
                Stage::Fetched,
                url,
                &ResolveError::NotFound("episode or release link".into()),
            );
            return Vec::new();
        }

        let attempts = if candidates.is_movie {
            self.max_candidates
        } else {
            1
        };
        for candidate in candidates.urls.iter().take(attempts) {
            let streams = self.pipeline.resolve_page_tracked(candidate, progress).await;
            if !streams.is_empty() {
                return streams;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> StreamResolver {
        let config = Config::from_toml("base_url = \"https://animeowl.me/\"").unwrap();
        StreamResolver::new(&config, Diagnostics::default()).unwrap()
    }

    #[test]
    fn slug_requires_prefix() {
        let r = resolver();
        assert_eq!(r.slug("animeowl:frieren"), Some("frieren"));
        assert_eq!(r.slug("tt0111161"), None);
        assert_eq!(r.slug("animeowl:"), None);
        assert_eq!(r.slug("kitsu:animeowl:x"), None);
    }

    #[test]
    fn landing_url_uses_origin() {
        assert_eq!(
            resolver().landing_url("one-piece"),
            "https://animeowl.me/anime/one-piece"
        );
    }

    #[tokio::test]
    async fn foreign_ids_resolve_to_nothing_without_network() {
        assert!(resolver().resolve_streams("tt0111161").await.is_empty());
    }
}
