//! Backend set → stream descriptors.
//!
//! Output order follows [`BackendServerSet`] preference order (single-source,
//! multi-resolution, redirect-style), each backend keeping its own entry
//! order. Tokens are concatenated onto entry URLs byte for byte: the origin
//! expects no separator and no encoding.

use crate::config::Config;
use crate::error::ResolveError;
use crate::stream::backend::{Backend, BackendServerSet, ResolutionEntry, SourceEntry};
use crate::stream::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Stage};
use crate::stream::provider::{RedirectResolver, StreamDescriptor, Subtitle};
use crate::stream::token::AccessToken;

/// Builds stream descriptors from backend entries.
#[derive(Debug, Clone)]
pub struct Normalizer {
    group_key: String,
    subtitle_lang: String,
    diagnostics: Diagnostics,
}

impl Normalizer {
    pub fn new(
        group_key: impl Into<String>,
        subtitle_lang: impl Into<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            group_key: group_key.into(),
            subtitle_lang: subtitle_lang.into(),
            diagnostics,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config, diagnostics: Diagnostics) -> Self {
        Self::new(&config.group_key, &config.subtitle_lang, diagnostics)
    }

    /// Normalize every backend in `servers`.
    ///
    /// Never fails. A redirect-style backend whose secondary fetch fails (or
    /// yields no `url`) contributes nothing; the failure is reported on the
    /// diagnostic channel.
    pub async fn normalize(
        &self,
        servers: &BackendServerSet,
        token: &AccessToken,
        resolver: &dyn RedirectResolver,
    ) -> Vec<StreamDescriptor> {
        let mut streams = Vec::new();

        for backend in servers.backends() {
            match backend {
                Backend::SingleSource(entry) => streams.push(self.single_source(entry, token)),
                Backend::MultiResolution(entries) => {
                    streams.extend(entries.iter().map(|e| self.multi_resolution(e, token)));
                }
                Backend::RedirectStyle(entry) => {
                    if let Some(stream) = self.redirect_style(entry, token, resolver).await {
                        streams.push(stream);
                    }
                }
            }
        }

        streams
    }

    fn descriptor(&self, name: String, title: String, url: String) -> StreamDescriptor {
        StreamDescriptor {
            name,
            title,
            url,
            subtitles: Vec::new(),
            group_key: self.group_key.clone(),
        }
    }

    fn single_source(&self, entry: &SourceEntry, token: &AccessToken) -> StreamDescriptor {
        self.descriptor(
            "AnimeOwl Kaido".to_string(),
            "Kaido Server".to_string(),
            with_token(&entry.url, token),
        )
    }

    fn multi_resolution(&self, entry: &ResolutionEntry, token: &AccessToken) -> StreamDescriptor {
        self.descriptor(
            format!("AnimeOwl Luffy {}", entry.resolution),
            format!("Luffy {}", entry.resolution),
            with_token(&entry.url, token),
        )
    }

    async fn redirect_style(
        &self,
        entry: &SourceEntry,
        token: &AccessToken,
        resolver: &dyn RedirectResolver,
    ) -> Option<StreamDescriptor> {
        let redirect_url = with_token(&entry.url, token);

        let target = match resolver.resolve_redirect(&redirect_url).await {
            Ok(target) => target,
            Err(err) => {
                self.skip_redirect(&redirect_url, &err);
                return None;
            }
        };

        let Some(url) = target.url.filter(|u| !u.trim().is_empty()) else {
            self.skip_redirect(
                &redirect_url,
                &ResolveError::NotFound("redirect body carries no `url`".into()),
            );
            return None;
        };

        let mut stream = self.descriptor("AnimeOwl Zoro".to_string(), "Zoro Server".to_string(), url);
        if let Some(subtitle) = target.subtitle.filter(|s| !s.trim().is_empty()) {
            stream.subtitles.push(Subtitle {
                url: subtitle,
                lang: self.subtitle_lang.clone(),
            });
        }
        Some(stream)
    }

    fn skip_redirect(&self, url: &str, err: &ResolveError) {
        self.diagnostics.publish(Diagnostic {
            kind: DiagnosticKind::BackendSkipped,
            stage: Stage::ServersFetched,
            url: url.to_string(),
            message: format!("redirect-style backend skipped: {err}"),
        });
    }
}

fn with_token(url: &str, token: &AccessToken) -> String {
    let mut out = String::with_capacity(url.len() + token.as_str().len());
    out.push_str(url);
    out.push_str(token.as_str());
    out
}
