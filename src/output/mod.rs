//! Output module for check reports
//!
//! This module handles:
//! - The report data model produced by a check
//! - Summary statistics over visits and verdicts
//! - Rendering the report as marked, line-oriented text

mod report;
pub mod stats;
mod text;

pub use report::{
    CheckReport, CrawlResult, ProbeFailure, RobotsStatus, SitemapDiscovery, SitemapOutcome,
    SitemapVisit,
};
pub use stats::CheckStatistics;
pub use text::{format_report, write_report, DISCOVERY, ERROR, SUCCESS};
