//! Backend manifest shapes.
//!
//! The manifest behind a backend descriptor is a JSON object keyed by
//! backend name. Each backend answers in its own shape:
//!
//! | key     | shape                                    | variant              |
//! |---------|------------------------------------------|----------------------|
//! | `kaido` | `[{url}]` (or a bare object)             | [`Backend::SingleSource`]    |
//! | `luffy` | `[{resolution, url}, ...]`               | [`Backend::MultiResolution`] |
//! | `zoro`  | `[{url}]`, URL answers with more JSON    | [`Backend::RedirectStyle`]   |
//!
//! Unknown keys are ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ResolveError, Result};

const SINGLE_SOURCE_KEY: &str = "kaido";
const MULTI_RESOLUTION_KEY: &str = "luffy";
const REDIRECT_STYLE_KEY: &str = "zoro";

/// A stream URL prefix waiting for the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub url: String,
}

/// A stream URL prefix tagged with its resolution label (e.g. `720p`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    pub resolution: String,
    pub url: String,
}

/// One backend's usable entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    SingleSource(SourceEntry),
    MultiResolution(Vec<ResolutionEntry>),
    RedirectStyle(SourceEntry),
}

impl Backend {
    /// Upstream key this backend is published under.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Backend::SingleSource(_) => SINGLE_SOURCE_KEY,
            Backend::MultiResolution(_) => MULTI_RESOLUTION_KEY,
            Backend::RedirectStyle(_) => REDIRECT_STYLE_KEY,
        }
    }

    /// Preference rank; lower sorts first.
    fn rank(&self) -> u8 {
        match self {
            Backend::SingleSource(_) => 0,
            Backend::MultiResolution(_) => 1,
            Backend::RedirectStyle(_) => 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawEntry>),
    One(RawEntry),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<RawEntry> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(e) => vec![e],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    resolution: Option<Value>,
}

impl RawEntry {
    fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    fn resolution_label(&self) -> String {
        match &self.resolution {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => format!("{n}p"),
            _ => "auto".to_string(),
        }
    }
}

/// All backends offered for one landing page, in preference order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendServerSet {
    backends: Vec<Backend>,
}

impl BackendServerSet {
    /// Build a set, ordering backends by preference.
    #[must_use]
    pub fn new(mut backends: Vec<Backend>) -> Self {
        backends.sort_by_key(Backend::rank);
        Self { backends }
    }

    /// Interpret a decoded manifest fetched from `url`.
    ///
    /// Anything but a JSON object, or a known key holding something other
    /// than entry objects, is [`ResolveError::MalformedUpstream`].
    pub fn from_manifest(url: &str, manifest: &Value) -> Result<Self> {
        let map = manifest
            .as_object()
            .ok_or_else(|| ResolveError::malformed(url, "backend manifest is not an object"))?;

        let entries = |key: &str| -> Result<Vec<RawEntry>> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(v) => OneOrMany::deserialize(v)
                    .map(OneOrMany::into_vec)
                    .map_err(|e| ResolveError::malformed(url, format!("`{key}`: {e}"))),
            }
        };

        let mut backends = Vec::new();

        if let Some(entry_url) = entries(SINGLE_SOURCE_KEY)?
            .iter()
            .find_map(RawEntry::usable_url)
        {
            backends.push(Backend::SingleSource(SourceEntry {
                url: entry_url.to_string(),
            }));
        }

        let resolutions: Vec<ResolutionEntry> = entries(MULTI_RESOLUTION_KEY)?
            .iter()
            .filter_map(|e| {
                e.usable_url().map(|entry_url| ResolutionEntry {
                    resolution: e.resolution_label(),
                    url: entry_url.to_string(),
                })
            })
            .collect();
        if !resolutions.is_empty() {
            backends.push(Backend::MultiResolution(resolutions));
        }

        if let Some(entry_url) = entries(REDIRECT_STYLE_KEY)?
            .first()
            .and_then(RawEntry::usable_url)
        {
            backends.push(Backend::RedirectStyle(SourceEntry {
                url: entry_url.to_string(),
            }));
        }

        Ok(Self::new(backends))
    }

    #[must_use]
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Keep at most `limit` multi-resolution entries.
    pub fn cap_multi_resolution(&mut self, limit: usize) {
        for backend in &mut self.backends {
            if let Backend::MultiResolution(entries) = backend {
                entries.truncate(limit);
            }
        }
        self.backends
            .retain(|b| !matches!(b, Backend::MultiResolution(e) if e.is_empty()));
    }
}
