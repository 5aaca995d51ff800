//! `owlstream` - AnimeOwl stream resolver and media-center addon
//!
//! # Features
//!
//! - **Stream resolution**: title page → backend descriptor → player-script
//!   token → backend manifest → playable, token-bearing stream URLs
//! - **Catalogs**: trending, recent (sub/dub) and movie listings
//! - **Addon server**: manifest, catalog and stream routes over HTTP
//! - **Browser identity**: realistic Chrome/Firefox request headers
//!
//! # Example
//!
//! ```rust,no_run
//! use owlstream::{Config, Diagnostics, StreamResolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let resolver = StreamResolver::new(&config, Diagnostics::default())?;
//!     for stream in resolver.resolve_streams("animeowl:frieren").await {
//!         println!("{}: {}", stream.name, stream.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod addon;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http_client;
pub mod stream;

pub use catalog::{Catalog, CatalogEntry, CatalogSection};
pub use config::Config;
pub use error::ResolveError;
pub use fingerprint::{chrome_profile, firefox_profile, random_profile, BrowserProfile};
pub use http_client::{Document, SiteClient};
pub use stream::{Diagnostic, DiagnosticKind, Diagnostics, StreamDescriptor, StreamResolver, Subtitle};

/// Version of owlstream
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
