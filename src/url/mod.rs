//! URL handling module for the sitemap checker
//!
//! This module provides website URL validation, origin derivation, resolution
//! of locations found inside documents, and the keys used by the visited-set
//! guard.

mod normalize;
mod origin;

// Re-export main functions
pub use normalize::{has_gzip_suffix, resolve_location, visit_key};
pub use origin::{join_origin, origin_of, parse_site_url, robots_url, same_host};
