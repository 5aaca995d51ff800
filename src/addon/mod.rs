//! Media-center addon surface
//!
//! The manifest, the JSON shapes the media center expects, and an axum
//! server exposing the catalog and stream resolvers over HTTP.

pub mod server;

use serde::Serialize;

use crate::catalog::{CatalogEntry, CatalogSection};
use crate::config::Config;
use crate::stream::StreamDescriptor;

pub use server::{router, serve, AppState};

pub const ADDON_ID: &str = "animeowl.stremio.addon";
pub const ADDON_NAME: &str = "AnimeOwl";
const ADDON_DESCRIPTION: &str = "Watch anime and movies from AnimeOwl";
const ADDON_LOGO: &str = "https://animeowl.me/assets/owl-logo-white-long.webp";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<ManifestCatalog>,
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
    pub extra: Vec<ManifestExtra>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestExtra {
    pub name: String,
}

impl Manifest {
    /// Build the manifest advertised by this addon.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let catalogs = CatalogSection::ALL
            .into_iter()
            .map(|section| ManifestCatalog {
                kind: section.content_type().to_string(),
                id: section.catalog_id(),
                name: section.display_name().to_string(),
                extra: vec![ManifestExtra {
                    name: "skip".to_string(),
                }],
            })
            .collect();

        Self {
            id: ADDON_ID.to_string(),
            version: crate::VERSION.to_string(),
            name: ADDON_NAME.to_string(),
            description: ADDON_DESCRIPTION.to_string(),
            logo: ADDON_LOGO.to_string(),
            resources: vec!["catalog".to_string(), "stream".to_string()],
            types: vec!["movie".to_string(), "series".to_string()],
            catalogs,
            id_prefixes: vec![config.id_prefix.clone()],
        }
    }
}

/// Catalog item as the media center renders it.
#[derive(Debug, Clone, Serialize)]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub description: String,
}

impl MetaPreview {
    #[must_use]
    pub fn from_entry(entry: CatalogEntry, section: CatalogSection) -> Self {
        Self {
            id: entry.id,
            kind: section.content_type().to_string(),
            description: entry.title.clone(),
            name: entry.title,
            poster: entry.poster,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub binge_group: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireSubtitle {
    pub url: String,
    pub lang: String,
}

/// Stream entry on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStream {
    pub name: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtitles: Vec<WireSubtitle>,
    pub behavior_hints: BehaviorHints,
}

impl From<StreamDescriptor> for WireStream {
    fn from(stream: StreamDescriptor) -> Self {
        Self {
            name: stream.name,
            title: stream.title,
            url: stream.url,
            subtitles: stream
                .subtitles
                .into_iter()
                .map(|s| WireSubtitle {
                    url: s.url,
                    lang: s.lang,
                })
                .collect(),
            behavior_hints: BehaviorHints {
                binge_group: stream.group_key,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamResponse {
    pub streams: Vec<WireStream>,
}
