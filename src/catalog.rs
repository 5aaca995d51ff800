//! Listing-page scraping for the addon catalogs.
//!
//! Each catalog section maps to one paginated listing on the content site.
//! Cards are `.recent-anime` blocks carrying a poster image (title in `alt`)
//! and a link to the title page.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::http_client::{Document, SiteClient};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static CARD: LazyLock<Selector> = LazyLock::new(|| selector(".recent-anime"));
static CARD_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static CARD_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// One listing on the content site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSection {
    Trending,
    RecentSub,
    RecentDub,
    Movies,
}

impl CatalogSection {
    pub const ALL: [Self; 4] = [Self::Trending, Self::RecentSub, Self::RecentDub, Self::Movies];

    /// Short key used on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::RecentSub => "recent-sub",
            Self::RecentDub => "recent-dub",
            Self::Movies => "movies",
        }
    }

    /// Catalog id as advertised in the addon manifest.
    #[must_use]
    pub fn catalog_id(self) -> String {
        format!("animeowl-{}", self.key())
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Trending => "Trending Anime",
            Self::RecentSub => "Recent Episodes (SUB)",
            Self::RecentDub => "Recent Episodes (DUB)",
            Self::Movies => "Anime Movies",
        }
    }

    /// Addon content type of the section's entries.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Movies => "movie",
            _ => "series",
        }
    }

    /// Listing path on the content site, without leading slash.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::RecentSub => "recent-episode/sub",
            Self::RecentDub => "recent-episode/dub",
            Self::Movies => "type/movie",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Accepts either `trending` or `animeowl-trending`.
    #[must_use]
    pub fn from_catalog_id(id: &str) -> Option<Self> {
        Self::from_key(id.strip_prefix("animeowl-").unwrap_or(id))
    }
}

impl std::fmt::Display for CatalogSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A title card from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Prefixed content id, e.g. `animeowl:frieren`.
    pub id: String,
    pub title: String,
    pub poster: Option<String>,
}

/// 1-based listing page holding item `skip`.
#[must_use]
pub fn page_for_skip(skip: usize, page_size: usize) -> usize {
    skip / page_size.max(1) + 1
}

/// Parse every usable card on a listing page.
///
/// Cards without a title or a link are skipped.
#[must_use]
pub fn parse_catalog(doc: &Document, origin: &str, id_prefix: &str) -> Vec<CatalogEntry> {
    let html = doc.parse();
    html.select(&CARD)
        .filter_map(|card| parse_card(card, doc, origin, id_prefix))
        .collect()
}

fn parse_card(card: ElementRef<'_>, doc: &Document, origin: &str, prefix: &str) -> Option<CatalogEntry> {
    let image = card.select(&CARD_IMAGE).next();

    let title = image
        .and_then(|img| img.value().attr("alt"))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let href = card
        .select(&CARD_LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|h| !h.is_empty())?;

    let slug = href.strip_prefix(origin).unwrap_or(href);
    let slug = slug.replacen("/anime/", "", 1);
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return None;
    }

    let poster = image
        .and_then(|img| {
            let attrs = img.value();
            attrs
                .attr("data-src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| attrs.attr("src"))
        })
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .and_then(|src| doc.absolutize(src));

    Some(CatalogEntry {
        id: format!("{prefix}{slug}"),
        title: title.to_string(),
        poster,
    })
}

/// Fetches and parses catalog listings.
#[derive(Clone)]
pub struct Catalog {
    client: SiteClient,
    id_prefix: String,
    page_size: usize,
}

impl Catalog {
    #[must_use]
    pub fn new(client: SiteClient, config: &Config) -> Self {
        Self {
            client,
            id_prefix: config.id_prefix.clone(),
            page_size: config.page_size,
        }
    }

    #[must_use]
    pub fn listing_url(&self, section: CatalogSection, skip: usize) -> String {
        format!(
            "{}/{}?page={}",
            self.client.base_url(),
            section.path(),
            page_for_skip(skip, self.page_size)
        )
    }

    /// List the entries of `section` starting around item `skip`.
    ///
    /// Degrades to an empty list on any fetch failure.
    #[instrument(skip(self))]
    pub async fn list_entries(&self, section: CatalogSection, skip: usize) -> Vec<CatalogEntry> {
        let url = self.listing_url(section, skip);
        match self.client.fetch_document(&url).await {
            Ok(doc) => {
                let entries = parse_catalog(&doc, self.client.base_url(), &self.id_prefix);
                debug!(count = entries.len(), "Catalog page parsed");
                entries
            }
            Err(err) => {
                warn!(%url, error = %err, "Catalog listing failed");
                Vec::new()
            }
        }
    }
}
