//! Robots.txt handling module
//!
//! This module provides functionality for fetching and parsing a site's
//! robots.txt and answering crawlability questions against it.

mod parser;

pub use parser::{RobotsRule, RobotsRuleSet, RuleDirective};

use crate::charset::{charset_from_content_type, decode_text};
use crate::crawler::Fetcher;
use crate::CheckerError;
use tokio::time::Instant;
use url::Url;

/// Fetches and parses robots.txt
///
/// # Arguments
///
/// * `fetcher` - The fetcher used for the request
/// * `url` - Location of robots.txt (normally `<origin>/robots.txt`)
/// * `deadline` - Run deadline bounding the request
///
/// # Returns
///
/// * `Ok(RobotsRuleSet)` - Successfully fetched and parsed robots.txt
/// * `Err(CheckerError)` - The request failed or the body does not decode
///   in its declared charset (UTF-8 when none is declared)
pub async fn fetch_robots(
    fetcher: &Fetcher,
    url: &Url,
    deadline: Option<Instant>,
) -> Result<RobotsRuleSet, CheckerError> {
    let document = fetcher.fetch(url, deadline).await?;

    let charset = charset_from_content_type(document.content_type.as_deref());
    let text = decode_text(&document.body, charset).map_err(|encoding| {
        CheckerError::MalformedRobots {
            url: url.to_string(),
            message: format!("body is not valid {}", encoding.name()),
        }
    })?;

    let rules = RobotsRuleSet::parse(&text);
    tracing::debug!(
        "Parsed robots.txt at {}: {} rules, {} sitemaps",
        url,
        rules.rules().len(),
        rules.declared_sitemaps().len()
    );

    Ok(rules)
}
