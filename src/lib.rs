//! Cinemanello: a movie catalog addon server.
//!
//! Serves a manifest, a cached movie catalog and per-item meta records to
//! media-browsing clients. Catalog data comes from a static list or from TMDB,
//! held in a single TTL snapshot with stale fallback.

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod server;
pub mod source;
