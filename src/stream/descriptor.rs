//! Backend descriptor lookup on episode/movie landing pages.
//!
//! The landing page carries an anchor whose `data-source` attribute points
//! at the backend manifest, e.g. `/api/watch/kaido/12345`. The trailing
//! segment doubles as the id of the companion player script.

use std::sync::LazyLock;

use scraper::Selector;

use crate::http_client::Document;

static DESCRIPTOR_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#hot-anime-tab[data-source]").expect("valid selector"));

/// Where a landing page's backend manifest lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    /// Site-relative manifest path, as found in the page.
    pub path: String,
    /// Final `/`-delimited segment of `path`.
    pub numeric_id: String,
}

impl BackendDescriptor {
    /// Build a descriptor from a `data-source` value.
    ///
    /// Returns `None` for blank paths or paths with no usable segment.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim();
        let numeric_id = path.rsplit('/').find(|s| !s.is_empty())?;
        Some(Self {
            path: path.to_string(),
            numeric_id: numeric_id.to_string(),
        })
    }

    /// `<origin>/players/<numeric_id>.<version>.js`
    #[must_use]
    pub fn script_url(&self, origin: &str, version: &str) -> String {
        format!("{origin}/players/{}.{version}.js", self.numeric_id)
    }

    /// `<origin><path>`; absolute paths are returned untouched.
    #[must_use]
    pub fn manifest_url(&self, origin: &str) -> String {
        if self.path.starts_with("http://") || self.path.starts_with("https://") {
            self.path.clone()
        } else if self.path.starts_with('/') {
            format!("{origin}{}", self.path)
        } else {
            format!("{origin}/{}", self.path)
        }
    }
}

/// Find the backend descriptor on a landing page.
///
/// `None` means the page offers no resolvable backend.
#[must_use]
pub fn locate_descriptor(doc: &Document) -> Option<BackendDescriptor> {
    let html = doc.parse();
    let anchor = html.select(&DESCRIPTOR_ANCHOR).next()?;
    BackendDescriptor::from_path(anchor.value().attr("data-source")?)
}
