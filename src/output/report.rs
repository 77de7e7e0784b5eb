//! Data model of a finished check
//!
//! Everything here is produced by `Checker::run` and consumed by the
//! renderers; nothing is retained between runs.

use crate::output::stats::CheckStatistics;
use crate::robots::RobotsRuleSet;
use crate::sitemap::SitemapFormat;
use crate::ErrorKind;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Complete result of checking one site
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Origin that was checked (`scheme://host[:port]/`)
    pub origin: String,

    /// Product token the robots rules were evaluated for
    pub robots_agent: String,

    pub robots: RobotsStatus,

    /// Rules in effect for the run (empty when robots.txt was unavailable)
    pub rules: RobotsRuleSet,

    pub discovery: SitemapDiscovery,

    /// One entry per sitemap visited, in discovery order
    pub sitemaps: Vec<SitemapVisit>,

    /// One entry per distinct leaf URL, in discovery order
    pub results: Vec<CrawlResult>,

    pub stats: CheckStatistics,

    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Outcome of the robots.txt fetch
#[derive(Debug, Clone)]
pub enum RobotsStatus {
    Found {
        url: String,
        fetched_at: DateTime<Utc>,
    },

    /// Missing, unreachable or malformed; every URL is treated as crawlable
    Unavailable {
        url: String,
        kind: ErrorKind,
        message: String,
    },
}

/// How the starting sitemaps were found
#[derive(Debug, Clone)]
pub enum SitemapDiscovery {
    /// Declared by `Sitemap:` lines in robots.txt
    Declared(Vec<String>),

    /// Found by probing a well-known location
    Fallback { url: String, probed: Vec<ProbeFailure> },

    /// No declared sitemap and no fallback location answered
    NotFound { probed: Vec<ProbeFailure> },
}

/// A fallback location that did not yield a sitemap
#[derive(Debug, Clone)]
pub struct ProbeFailure {
    pub url: String,
    pub kind: ErrorKind,
}

/// One sitemap document visited during resolution
#[derive(Debug, Clone)]
pub struct SitemapVisit {
    pub url: String,

    /// Index nesting depth; starting sitemaps are at depth 0
    pub depth: u32,

    /// The index that listed this sitemap
    pub parent: Option<String>,

    pub outcome: SitemapOutcome,
}

#[derive(Debug, Clone)]
pub enum SitemapOutcome {
    /// A sitemap index and the child sitemaps it listed
    Index { children: Vec<String> },

    /// A URL set or feed and the number of leaf entries it held
    UrlSet { format: SitemapFormat, urls: usize },

    Failed { kind: ErrorKind, message: String },
}

impl SitemapVisit {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SitemapOutcome::Failed { .. })
    }
}

/// Crawlability verdict for one leaf URL
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResult {
    pub url: String,
    pub crawlable: bool,

    /// Why the URL is blocked or otherwise worth a remark
    pub note: Option<String>,

    /// Sitemap the URL was first listed in
    pub sitemap: String,

    pub lastmod: Option<DateTime<Utc>>,

    /// Media extensions present on the entry (`news`, `video`, `image`)
    pub media: Vec<&'static str>,
}

impl CheckReport {
    /// Looks up the verdict for a leaf URL
    pub fn result_for(&self, url: &str) -> Option<&CrawlResult> {
        self.results.iter().find(|r| r.url == url)
    }

    /// Looks up the visit record for a sitemap URL
    pub fn visit_for(&self, url: &str) -> Option<&SitemapVisit> {
        self.sitemaps.iter().find(|v| v.url == url)
    }
}
