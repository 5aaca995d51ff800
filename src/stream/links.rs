//! Movie/series classification and candidate landing pages.
//!
//! A title page says what it is in a small type badge. Series pages list
//! episodes in a subtitled and a dubbed container; movie pages list one
//! `.episode-node` link per release.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::http_client::Document;

/// Badge text that marks a multi-episode title.
pub const SERIES_MARKER: &str = "TV";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static TYPE_INDICATOR: LazyLock<Selector> = LazyLock::new(|| selector("div.type.d-flex a"));
static MOVIE_RELEASES: LazyLock<Selector> = LazyLock::new(|| selector(".episode-node[href]"));
static SUB_EPISODES: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"#anime-cover-sub-content a[href*="/episode/"]"#));
static DUB_EPISODES: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"#anime-cover-dub-content a[href*="/episode/"]"#));
static ANY_EPISODE: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="/episode/"]"#));

/// Landing pages worth feeding to the pipeline, in try order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub is_movie: bool,
    pub urls: Vec<String>,
}

/// Classify a title page and pick its candidate landing pages.
///
/// Series yield at most one URL (the first episode). Movies yield every
/// release link in document order; the caller bounds how many are tried.
#[must_use]
pub fn resolve_candidates(doc: &Document) -> Candidates {
    let html = doc.parse();
    let is_movie = !is_series(&html);

    let urls = if is_movie {
        hrefs(&html, &MOVIE_RELEASES)
            .filter_map(|href| doc.absolutize(href))
            .fold(Vec::new(), |mut acc, url| {
                if !acc.contains(&url) {
                    acc.push(url);
                }
                acc
            })
    } else {
        [&*SUB_EPISODES, &*DUB_EPISODES, &*ANY_EPISODE]
            .into_iter()
            .find_map(|sel| hrefs(&html, sel).find_map(|href| doc.absolutize(href)))
            .into_iter()
            .collect()
    };

    Candidates { is_movie, urls }
}

/// Exact match on the badge text; whitespace or case variants are movies.
fn is_series(html: &Html) -> bool {
    html.select(&TYPE_INDICATOR)
        .next()
        .is_some_and(|badge| badge.text().collect::<String>() == SERIES_MARKER)
}

fn hrefs<'a>(html: &'a Html, sel: &'a Selector) -> impl Iterator<Item = &'a str> + 'a {
    html.select(sel)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
}
