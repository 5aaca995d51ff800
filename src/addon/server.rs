//! HTTP addon server
//!
//! Routes:
//! - `GET /manifest.json`
//! - `GET /catalog/{type}/{id}.json`
//! - `GET /catalog/{type}/{id}/{extra}.json` (`extra` is `skip=<n>`)
//! - `GET /stream/{type}/{id}.json`
//! - `GET /health`

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::{CatalogResponse, Manifest, MetaPreview, StreamResponse, WireStream};
use crate::catalog::{Catalog, CatalogSection};
use crate::config::Config;
use crate::http_client::SiteClient;
use crate::stream::{Diagnostics, StreamResolver};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub manifest: Arc<Manifest>,
    pub catalog: Arc<Catalog>,
    pub resolver: Arc<StreamResolver>,
}

impl AppState {
    /// Wire up catalog and resolver over one shared site client.
    pub fn new(config: &Config, diagnostics: Diagnostics) -> Result<Self> {
        let client = SiteClient::new(config)?;
        Ok(Self {
            manifest: Arc::new(Manifest::new(config)),
            catalog: Arc::new(Catalog::new(client.clone(), config)),
            resolver: Arc::new(StreamResolver::with_client(client, config, diagnostics)),
        })
    }
}

/// Build the addon router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/manifest.json", get(manifest))
        .route("/catalog/{kind}/{file}", get(catalog))
        .route("/catalog/{kind}/{id}/{extra}", get(catalog_with_extra))
        .route("/stream/{kind}/{file}", get(streams))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &Config, diagnostics: Diagnostics) -> Result<()> {
    let state = AppState::new(config, diagnostics)?;
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!(
        addr = %listener.local_addr()?,
        "Addon listening; install from /manifest.json"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")
}

async fn manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(state.manifest.as_ref().clone())
}

async fn health() -> &'static str {
    "ok"
}

async fn catalog(
    State(state): State<AppState>,
    Path((kind, file)): Path<(String, String)>,
) -> Json<CatalogResponse> {
    list_catalog(&state, &kind, strip_json(&file), 0).await
}

async fn catalog_with_extra(
    State(state): State<AppState>,
    Path((kind, id, extra)): Path<(String, String, String)>,
) -> Json<CatalogResponse> {
    let skip = parse_skip(strip_json(&extra));
    list_catalog(&state, &kind, &id, skip).await
}

async fn list_catalog(state: &AppState, kind: &str, id: &str, skip: usize) -> Json<CatalogResponse> {
    let Some(section) = CatalogSection::from_catalog_id(id).filter(|s| s.content_type() == kind) else {
        debug!(kind, id, "Unknown catalog");
        return Json(CatalogResponse { metas: Vec::new() });
    };

    let metas = state
        .catalog
        .list_entries(section, skip)
        .await
        .into_iter()
        .map(|entry| MetaPreview::from_entry(entry, section))
        .collect();
    Json(CatalogResponse { metas })
}

async fn streams(
    State(state): State<AppState>,
    Path((_kind, file)): Path<(String, String)>,
) -> Json<StreamResponse> {
    let streams = state
        .resolver
        .resolve_streams(strip_json(&file))
        .await
        .into_iter()
        .map(WireStream::from)
        .collect();
    Json(StreamResponse { streams })
}

fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

/// `skip=48&genre=x` → 48; anything unparsable is 0.
fn parse_skip(extra: &str) -> usize {
    url::form_urlencoded::parse(extra.as_bytes())
        .find(|(key, _)| key == "skip")
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
