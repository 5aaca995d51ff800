//! Stream resolution for AnimeOwl titles
//!
//! Title page → candidate landing pages → backend descriptor → player
//! script token → backend manifest → normalized, playable streams.

pub mod backend;
pub mod descriptor;
pub mod diagnostics;
pub mod links;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod resolver;
pub mod token;

pub use backend::{Backend, BackendServerSet};
pub use descriptor::{locate_descriptor, BackendDescriptor};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Stage};
pub use links::{resolve_candidates, Candidates};
pub use normalize::Normalizer;
pub use pipeline::StreamPipeline;
pub use provider::{RedirectResolver, RedirectTarget, StreamDescriptor, Subtitle};
pub use resolver::StreamResolver;
pub use token::{extract_token, AccessToken};
