//! Statistics generation from a finished check
//!
//! This module provides functionality for summarizing sitemap visits and
//! crawlability verdicts into totals.

use crate::output::report::{CrawlResult, SitemapOutcome, SitemapVisit};
use crate::ErrorKind;
use std::collections::HashMap;

/// Check statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckStatistics {
    /// Number of sitemap documents visited (including failures)
    pub sitemaps_visited: usize,

    /// Number of sitemap documents that could not be fetched or parsed
    pub sitemaps_failed: usize,

    /// Number of sitemap indexes among the visited documents
    pub indexes: usize,

    /// Number of distinct leaf URLs
    pub leaf_urls: usize,

    pub crawlable: usize,
    pub blocked: usize,

    /// Leaf URLs listed again after their first appearance
    pub duplicate_urls: usize,

    /// Child sitemaps skipped by the index depth limit
    pub depth_limited: usize,

    /// Failure counts by error kind
    pub errors_by_kind: HashMap<ErrorKind, usize>,
}

impl CheckStatistics {
    /// Computes statistics from the visit log and the verdicts
    ///
    /// # Arguments
    ///
    /// * `sitemaps` - Every sitemap visited
    /// * `results` - One verdict per distinct leaf URL
    /// * `duplicate_urls` - Leaf URLs dropped as repeats
    /// * `depth_limited` - Child sitemaps dropped by the depth limit
    pub fn collect(
        sitemaps: &[SitemapVisit],
        results: &[CrawlResult],
        duplicate_urls: usize,
        depth_limited: usize,
    ) -> Self {
        let mut stats = Self {
            sitemaps_visited: sitemaps.len(),
            leaf_urls: results.len(),
            duplicate_urls,
            depth_limited,
            ..Self::default()
        };

        for visit in sitemaps {
            match &visit.outcome {
                SitemapOutcome::Index { .. } => stats.indexes += 1,
                SitemapOutcome::UrlSet { .. } => {}
                SitemapOutcome::Failed { kind, .. } => {
                    stats.sitemaps_failed += 1;
                    *stats.errors_by_kind.entry(*kind).or_insert(0) += 1;
                }
            }
        }

        for result in results {
            if result.crawlable {
                stats.crawlable += 1;
            } else {
                stats.blocked += 1;
            }
        }

        stats
    }

    /// Error kinds sorted by count (descending), then by name
    pub fn sorted_errors(&self) -> Vec<(ErrorKind, usize)> {
        let mut errors: Vec<_> = self
            .errors_by_kind
            .iter()
            .map(|(kind, count)| (*kind, *count))
            .collect();
        errors.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.to_string().cmp(&b.0.to_string()))
        });
        errors
    }
}
