//! Per-landing-page stream resolution.
//!
//! `start → fetched → descriptor-located → script-fetched → token-extracted
//! → servers-fetched → normalized → done`. Any failure or absence aborts the
//! run with an empty result; the stage reached is reported with it. Each
//! step needs the previous step's output, so the four requests (page,
//! player script, backend manifest, optional redirect) run strictly in
//! sequence and nothing is retried.

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::http_client::SiteClient;
use crate::stream::backend::BackendServerSet;
use crate::stream::descriptor::locate_descriptor;
use crate::stream::diagnostics::{Diagnostics, Stage};
use crate::stream::normalize::Normalizer;
use crate::stream::provider::StreamDescriptor;
use crate::stream::token::extract_token;

/// Runs the resolution state machine over landing-page URLs.
#[derive(Clone)]
pub struct StreamPipeline {
    client: SiteClient,
    normalizer: Normalizer,
    diagnostics: Diagnostics,
    player_version: String,
    max_multi_resolution: usize,
}

impl StreamPipeline {
    #[must_use]
    pub fn new(client: SiteClient, config: &Config, diagnostics: Diagnostics) -> Self {
        Self {
            client,
            normalizer: Normalizer::from_config(config, diagnostics.clone()),
            diagnostics,
            player_version: config.player_version.clone(),
            max_multi_resolution: config.max_multi_resolution,
        }
    }

    /// Resolve one landing page. Never fails; problems become `[]`.
    pub async fn resolve_page(&self, url: &str) -> Vec<StreamDescriptor> {
        let (progress, _) = watch::channel(Stage::Start);
        self.resolve_page_tracked(url, &progress).await
    }

    /// Like [`resolve_page`](Self::resolve_page), publishing each stage
    /// reached on `progress` so a caller that abandons the run can still
    /// tell how far it got.
    #[instrument(skip(self, progress))]
    pub async fn resolve_page_tracked(
        &self,
        url: &str,
        progress: &watch::Sender<Stage>,
    ) -> Vec<StreamDescriptor> {
        progress.send_replace(Stage::Start);
        match self.run(url, progress).await {
            Ok(streams) => {
                info!(count = streams.len(), "Streams resolved");
                streams
            }
            Err(err) => {
                self.diagnostics.report(*progress.borrow(), url, &err);
                Vec::new()
            }
        }
    }

    async fn run(&self, url: &str, progress: &watch::Sender<Stage>) -> Result<Vec<StreamDescriptor>> {
        let origin = self.client.base_url();

        let page = self.client.fetch_document(url).await?;
        progress.send_replace(Stage::Fetched);

        let descriptor = locate_descriptor(&page)
            .ok_or_else(|| ResolveError::NotFound("backend descriptor on landing page".into()))?;
        progress.send_replace(Stage::DescriptorLocated);

        let script = self
            .client
            .fetch_text(&descriptor.script_url(origin, &self.player_version))
            .await?;
        progress.send_replace(Stage::ScriptFetched);

        let token = extract_token(&script)
            .ok_or_else(|| ResolveError::NotFound("access token in player script".into()))?;
        progress.send_replace(Stage::TokenExtracted);

        let manifest_url = descriptor.manifest_url(origin);
        let manifest: Value = self.client.fetch_json(&manifest_url).await?;
        let mut servers = BackendServerSet::from_manifest(&manifest_url, &manifest)?;
        if servers.is_empty() {
            return Err(ResolveError::NotFound("known backend in manifest".into()));
        }
        servers.cap_multi_resolution(self.max_multi_resolution);
        progress.send_replace(Stage::ServersFetched);

        let streams = self
            .normalizer
            .normalize(&servers, &token, &self.client)
            .await;
        progress.send_replace(Stage::Normalized);

        if streams.is_empty() {
            return Err(ResolveError::NotFound("playable stream after normalization".into()));
        }
        progress.send_replace(Stage::Done);
        Ok(streams)
    }
}
