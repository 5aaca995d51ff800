//! Diagnostic channel for the resolution pipeline.
//!
//! Every pipeline outcome worth telling an operator about is published as
//! a [`Diagnostic`]. Each publish is mirrored to `tracing` (`debug` for the
//! normal "not found" branch, `warn` for failures) and fanned out to any
//! subscribers, so tests can assert on what the pipeline reported.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::ResolveError;

/// Pipeline progress over one landing-page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetched,
    DescriptorLocated,
    ScriptFetched,
    TokenExtracted,
    ServersFetched,
    Normalized,
    Done,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Fetched => "fetched",
            Stage::DescriptorLocated => "descriptor-located",
            Stage::ScriptFetched => "script-fetched",
            Stage::TokenExtracted => "token-extracted",
            Stage::ServersFetched => "servers-fetched",
            Stage::Normalized => "normalized",
            Stage::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Expected absence; a normal branch.
    NotFound,
    Network,
    MalformedUpstream,
    DeadlineExceeded,
    /// A backend was skipped but the others went on.
    BackendSkipped,
}

impl From<&ResolveError> for DiagnosticKind {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::NotFound(_) => DiagnosticKind::NotFound,
            ResolveError::Network { .. } => DiagnosticKind::Network,
            ResolveError::MalformedUpstream { .. } => DiagnosticKind::MalformedUpstream,
            ResolveError::DeadlineExceeded(_) => DiagnosticKind::DeadlineExceeded,
        }
    }
}

/// One reported pipeline event.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Last stage reached before the event.
    pub stage: Stage,
    /// URL the pipeline was working on.
    pub url: String,
    pub message: String,
}

/// Cloneable diagnostic publisher.
///
/// Publishing is sync and never blocks; with no subscribers the event only
/// goes to `tracing`.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    tx: broadcast::Sender<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.tx.subscribe()
    }

    pub fn publish(&self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::NotFound => debug!(
                stage = diagnostic.stage.as_str(),
                url = %diagnostic.url,
                "{}",
                diagnostic.message
            ),
            _ => warn!(
                kind = ?diagnostic.kind,
                stage = diagnostic.stage.as_str(),
                url = %diagnostic.url,
                "{}",
                diagnostic.message
            ),
        }
        let _ = self.tx.send(diagnostic);
    }

    /// Publish an error observed at `stage` while working on `url`.
    pub fn report(&self, stage: Stage, url: &str, err: &ResolveError) {
        self.publish(Diagnostic {
            kind: err.into(),
            stage,
            url: url.to_string(),
            message: err.to_string(),
        });
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(64)
    }
}
