//! Plain-text report rendering
//!
//! The report is line-oriented. Every status line starts with one of three
//! markers so outcomes can be scanned (or grepped) at a glance.

use crate::output::report::{
    CheckReport, CrawlResult, RobotsStatus, SitemapDiscovery, SitemapOutcome, SitemapVisit,
};
use std::io::{self, Write};

/// Marker for successful outcomes
pub const SUCCESS: &str = "✅";

/// Marker for errors and warnings
pub const ERROR: &str = "❌";

/// Marker for discovered sitemaps
pub const DISCOVERY: &str = "🗺️";

/// Writes the formatted report
///
/// # Arguments
///
/// * `report` - The finished check
/// * `writer` - Destination, normally stdout
pub fn write_report<W: Write>(report: &CheckReport, mut writer: W) -> io::Result<()> {
    writer.write_all(format_report(report).as_bytes())?;
    writer.flush()
}

/// Formats a check report as text
pub fn format_report(report: &CheckReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Checking {}\n\n", report.origin));

    format_robots(report, &mut out);
    out.push('\n');

    format_discovery(&report.discovery, &mut out);
    out.push('\n');

    if !report.sitemaps.is_empty() {
        out.push_str("Sitemaps:\n");
        for visit in &report.sitemaps {
            format_visit(visit, &mut out);
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "URLs ({} for user agent \"{}\"):\n",
        report.results.len(),
        report.robots_agent
    ));
    if report.results.is_empty() {
        out.push_str(&format!("{} No URLs found in sitemaps\n", ERROR));
    }
    for result in &report.results {
        format_result(result, &mut out);
    }
    out.push('\n');

    format_summary(report, &mut out);

    out
}

fn format_robots(report: &CheckReport, out: &mut String) {
    match &report.robots {
        RobotsStatus::Found { url, fetched_at } => {
            out.push_str(&format!(
                "{} robots.txt found at {} ({} rules, {} sitemaps declared, fetched {})\n",
                SUCCESS,
                url,
                report.rules.rules().len(),
                report.rules.declared_sitemaps().len(),
                fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            for rule in report.rules.rules() {
                out.push_str(&format!(
                    "   [{}] {}: {}\n",
                    rule.user_agent, rule.directive, rule.pattern
                ));
            }
        }
        RobotsStatus::Unavailable { url, kind, message } => {
            out.push_str(&format!(
                "{} robots.txt unavailable at {} ({}: {}); treating every URL as crawlable\n",
                ERROR, url, kind, message
            ));
        }
    }
}

fn format_discovery(discovery: &SitemapDiscovery, out: &mut String) {
    match discovery {
        SitemapDiscovery::Declared(urls) => {
            for url in urls {
                out.push_str(&format!(
                    "{} Sitemap declared in robots.txt: {}\n",
                    DISCOVERY, url
                ));
            }
        }
        SitemapDiscovery::Fallback { url, probed } => {
            out.push_str(&format!(
                "{} No sitemap declared in robots.txt\n",
                ERROR
            ));
            for probe in probed {
                out.push_str(&format!("   probed {} ({})\n", probe.url, probe.kind));
            }
            out.push_str(&format!(
                "{} Sitemap found at fallback location: {}\n",
                DISCOVERY, url
            ));
        }
        SitemapDiscovery::NotFound { probed } => {
            out.push_str(&format!(
                "{} No sitemap declared in robots.txt and none found at common locations\n",
                ERROR
            ));
            for probe in probed {
                out.push_str(&format!("   probed {} ({})\n", probe.url, probe.kind));
            }
        }
    }
}

fn format_visit(visit: &SitemapVisit, out: &mut String) {
    match &visit.outcome {
        SitemapOutcome::Index { children } => {
            out.push_str(&format!(
                "{} {}: sitemap index with {} child sitemaps\n",
                SUCCESS,
                visit.url,
                children.len()
            ));
            for child in children {
                out.push_str(&format!("   {} {}\n", DISCOVERY, child));
            }
        }
        SitemapOutcome::UrlSet { format, urls } => {
            out.push_str(&format!(
                "{} {}: {} with {} URLs\n",
                SUCCESS, visit.url, format, urls
            ));
        }
        SitemapOutcome::Failed { kind, message } => {
            out.push_str(&format!("{} {}: {}: {}\n", ERROR, visit.url, kind, message));
        }
    }
}

fn format_result(result: &CrawlResult, out: &mut String) {
    let marker = if result.crawlable { SUCCESS } else { ERROR };
    let verdict = if result.crawlable {
        "crawlable"
    } else {
        "not crawlable"
    };

    out.push_str(&format!("{} {} ({}", marker, result.url, verdict));
    if let Some(note) = &result.note {
        out.push_str(&format!(", {}", note));
    }
    if !result.media.is_empty() {
        out.push_str(&format!(", {}", result.media.join("/")));
    }
    if let Some(lastmod) = result.lastmod {
        out.push_str(&format!(", modified {}", lastmod.format("%Y-%m-%d")));
    }
    out.push_str(")\n");
}

fn format_summary(report: &CheckReport, out: &mut String) {
    let stats = &report.stats;

    out.push_str("Summary:\n");
    out.push_str(&format!(
        "  Sitemaps: {} visited, {} failed, {} indexes\n",
        stats.sitemaps_visited, stats.sitemaps_failed, stats.indexes
    ));
    out.push_str(&format!(
        "  URLs: {} total, {} crawlable, {} blocked\n",
        stats.leaf_urls, stats.crawlable, stats.blocked
    ));
    if stats.duplicate_urls > 0 {
        out.push_str(&format!(
            "  Duplicate URLs skipped: {}\n",
            stats.duplicate_urls
        ));
    }
    if stats.depth_limited > 0 {
        out.push_str(&format!(
            "  Child sitemaps beyond the depth limit: {}\n",
            stats.depth_limited
        ));
    }
    for (kind, count) in stats.sorted_errors() {
        out.push_str(&format!("  {}: {}\n", kind, count));
    }
    out.push_str(&format!(
        "  Finished in {:.2}s (started {})\n",
        report.elapsed.as_secs_f64(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
}
