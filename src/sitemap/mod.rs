//! Sitemap handling module
//!
//! Parses sitemap indexes, URL sets and RSS/Atom feeds into a closed
//! [`SitemapNode`] variant.

mod parser;
mod types;

pub use parser::{parse_sitemap, parse_sitemap_with_charset};
pub use types::{
    ChangeFrequency, MediaExtensions, ParsedSitemap, SitemapEntry, SitemapFormat, SitemapNode,
};
