//! Sitemap data model
//!
//! A parsed document is either an index of child sitemaps or a set of leaf
//! URL entries. Feeds (RSS and Atom) are treated as URL sets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Root element classification of a sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SitemapFormat {
    /// `<sitemapindex>` listing child sitemaps
    Index,
    /// `<urlset>` listing page URLs
    UrlSet,
    /// RSS 2.0 `<rss>` or RSS 1.0 `<rdf:RDF>` feed
    Rss,
    /// Atom `<feed>`
    Atom,
}

impl SitemapFormat {
    /// Classifies a document by the local name of its root element
    ///
    /// Returns None for anything that is not a known sitemap or feed root,
    /// such as an HTML error page served with a 200 status.
    pub fn from_root(local_name: &str) -> Option<Self> {
        match local_name {
            "sitemapindex" => Some(Self::Index),
            "urlset" => Some(Self::UrlSet),
            "rss" | "RDF" => Some(Self::Rss),
            "feed" => Some(Self::Atom),
            _ => None,
        }
    }
}

impl fmt::Display for SitemapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "sitemap index"),
            Self::UrlSet => write!(f, "urlset"),
            Self::Rss => write!(f, "RSS feed"),
            Self::Atom => write!(f, "Atom feed"),
        }
    }
}

/// Change frequency hints from a sitemap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl FromStr for ChangeFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            other => Err(format!("Invalid changefreq value: {}", other)),
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        };
        f.write_str(value)
    }
}

/// Fields from the news, video and image sitemap extensions
///
/// Values are kept as found; they are informational only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaExtensions {
    /// `<news:publication_date>`
    pub news_publication_date: Option<String>,

    /// `<news:title>`
    pub news_title: Option<String>,

    /// `<video:thumbnail_loc>` of each `<video:video>`
    pub video_thumbnails: Vec<String>,

    /// `<image:loc>` of each `<image:image>`
    pub image_locations: Vec<String>,
}

impl MediaExtensions {
    pub fn is_empty(&self) -> bool {
        self.news_publication_date.is_none()
            && self.news_title.is_none()
            && self.video_thumbnails.is_empty()
            && self.image_locations.is_empty()
    }

    /// Names of the extensions present on the entry
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.news_publication_date.is_some() || self.news_title.is_some() {
            kinds.push("news");
        }
        if !self.video_thumbnails.is_empty() {
            kinds.push("video");
        }
        if !self.image_locations.is_empty() {
            kinds.push("image");
        }
        kinds
    }
}

/// A single leaf entry from a URL set or feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitemapEntry {
    /// The location exactly as written in the document
    pub loc: String,

    /// `<lastmod>` (or the feed item date) as written
    pub lastmod: Option<String>,

    pub changefreq: Option<ChangeFrequency>,

    /// Priority relative to other URLs of the site, clamped to 0.0..=1.0
    pub priority: Option<f32>,

    pub extensions: MediaExtensions,
}

impl SitemapEntry {
    /// Creates an entry with only a location
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            ..Self::default()
        }
    }

    /// Interprets `lastmod` as a UTC timestamp
    ///
    /// Supports date-only values, RFC 3339 timestamps, naive timestamps
    /// (assumed UTC, with or without fractional seconds) and the RFC 2822
    /// dates used by RSS `<pubDate>`.
    pub fn lastmod_utc(&self) -> Option<DateTime<Utc>> {
        let value = self.lastmod.as_deref()?.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.and_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
            return Some(dt.with_timezone(&Utc));
        }

        tracing::debug!("Could not parse lastmod date: {}", value);
        None
    }
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapNode {
    /// Child sitemap locations in document order
    Index(Vec<String>),

    /// Leaf entries in document order
    UrlSet(Vec<SitemapEntry>),
}

/// Result of parsing one document: its classification and contents
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSitemap {
    pub format: SitemapFormat,
    pub node: SitemapNode,
}
