//! Addon configuration loaded from `~/.config/owlstream/config.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.
//! A handful of `OWLSTREAM_*` environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Per-request timeout bounds accepted from config, in seconds.
const MIN_REQUEST_TIMEOUT_SECS: u64 = 10;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Runtime settings for the resolver, catalog and server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the content site (no trailing slash).
    pub base_url: String,
    /// Namespace prefix carried by every content id.
    pub id_prefix: String,
    /// Socket address the addon server listens on.
    pub bind: String,
    /// Per-request timeout; clamped to 10–20 seconds.
    pub request_timeout_secs: u64,
    /// Clamped to 1 s..=`request_timeout_secs`.
    pub connect_timeout_secs: u64,
    /// Deadline for one whole `resolve_streams` call; at least 1 s.
    pub deadline_secs: u64,
    /// How many movie release links to try before giving up.
    pub max_candidates: usize,
    /// How many multi-resolution entries to keep per manifest.
    pub max_multi_resolution: usize,
    /// Version segment of the companion player script (`<id>.<version>.js`).
    pub player_version: String,
    pub subtitle_lang: String,
    /// Binge group shared by every stream this addon emits.
    pub group_key: String,
    /// Items per listing page on the content site.
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://animeowl.me".to_string(),
            id_prefix: "animeowl:".to_string(),
            bind: "127.0.0.1:7000".to_string(),
            request_timeout_secs: 20,
            connect_timeout_secs: 10,
            deadline_secs: 60,
            max_candidates: 2,
            max_multi_resolution: 2,
            player_version: "v2".to_string(),
            subtitle_lang: "eng".to_string(),
            group_key: "animeowl".to_string(),
            page_size: 24,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// Returns defaults if the file doesn't exist. Environment overrides
    /// are applied on top either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(config_path, Path::to_path_buf);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("invalid TOML in {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("OWLSTREAM_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = var("OWLSTREAM_BIND") {
            self.bind = v;
        }
        if let Some(v) = var("OWLSTREAM_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.request_timeout_secs = v;
        }
        if let Some(v) = var("OWLSTREAM_DEADLINE_SECS").and_then(|s| s.parse().ok()) {
            self.deadline_secs = v;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.request_timeout_secs = self
            .request_timeout_secs
            .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS);
        self.connect_timeout_secs = self.connect_timeout_secs.clamp(1, self.request_timeout_secs);
        self.deadline_secs = self.deadline_secs.max(1);
        self.page_size = self.page_size.max(1);
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Return the path to the default config file.
fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("owlstream")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.base_url, "https://animeowl.me");
        assert_eq!(config.max_candidates, 2);
        assert_eq!(config.player_version, "v2");
        assert_eq!(config.page_size, 24);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
base_url = "https://mirror.example/"
max_candidates = 3
subtitle_lang = "en"
"#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.base_url, "https://mirror.example");
        assert_eq!(config.max_candidates, 3);
        assert_eq!(config.subtitle_lang, "en");
        assert_eq!(config.group_key, "animeowl");
    }

    #[test]
    fn request_timeout_is_clamped() {
        let low = Config::from_toml("request_timeout_secs = 1").unwrap();
        assert_eq!(low.request_timeout(), Duration::from_secs(10));
        let high = Config::from_toml("request_timeout_secs = 300").unwrap();
        assert_eq!(high.request_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn zero_deadline_and_connect_timeout_are_raised() {
        let config = Config::from_toml("deadline_secs = 0\nconnect_timeout_secs = 0").unwrap();
        assert_eq!(config.deadline(), Duration::from_secs(1));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));

        let mut config = Config::default();
        config.apply_env(|k| (k == "OWLSTREAM_DEADLINE_SECS").then(|| "0".to_string()));
        assert_eq!(config.deadline(), Duration::from_secs(1));
    }

    #[test]
    fn connect_timeout_never_exceeds_request_timeout() {
        let config =
            Config::from_toml("request_timeout_secs = 12\nconnect_timeout_secs = 90").unwrap();
        assert_eq!(config.connect_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("OWLSTREAM_BASE_URL", "http://127.0.0.1:9999/"),
            ("OWLSTREAM_DEADLINE_SECS", "5"),
            ("OWLSTREAM_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(ToString::to_string));
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.deadline(), Duration::from_secs(5));
        assert_eq!(config.request_timeout_secs, 20);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.id_prefix, "animeowl:");
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_candidates = \"two\"").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
