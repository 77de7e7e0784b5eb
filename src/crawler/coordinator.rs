//! Checker coordinator - main check orchestration logic
//!
//! This module drives one check of one site:
//! - Fetching robots.txt (degrading to allow-all when it is unavailable)
//! - Discovering the starting sitemaps, declared or probed
//! - Resolving sitemap indexes in breadth-first waves on a bounded pool
//! - Evaluating every leaf URL against the robots rules
//! - Assembling the report
//!
//! All state lives inside one `Checker::run` call, so several runs can
//! share a `Checker` concurrently.

use crate::config::{validate, Config};
use crate::crawler::decompress::{decompress, gzip_hinted};
use crate::crawler::fetcher::{FetchedDocument, Fetcher};
use crate::crawler::scheduler::{EnqueueOutcome, QueuedSitemap, Scheduler};
use crate::output::{
    CheckReport, CheckStatistics, CrawlResult, ProbeFailure, RobotsStatus, SitemapDiscovery,
    SitemapOutcome, SitemapVisit,
};
use crate::robots::{fetch_robots, RobotsRuleSet};
use crate::charset::charset_from_content_type;
use crate::sitemap::{parse_sitemap_with_charset, ParsedSitemap, SitemapEntry, SitemapNode};
use crate::url::{
    join_origin, origin_of, parse_site_url, resolve_location, robots_url, same_host, visit_key,
};
use crate::CheckerError;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

/// A parsed document and the URL it was finally served from
type Resolved = Result<(Url, ParsedSitemap), CheckerError>;

/// A leaf entry waiting for the crawlability pass
struct Leaf {
    entry: SitemapEntry,

    /// URL relative locations resolve against
    base: Url,

    /// Sitemap the entry was listed in
    sitemap: Url,
}

/// Tracks whether the origin answered any request at all
#[derive(Debug, Default)]
struct OriginContact {
    answered: bool,
    last_error: Option<String>,
}

impl OriginContact {
    fn record_success(&mut self) {
        self.answered = true;
    }

    fn record_error(&mut self, error: &CheckerError) {
        self.answered |= error.got_response();
        self.last_error = Some(error.to_string());
    }
}

/// Main checker structure
///
/// Holds the configuration and the HTTP client; every run starts from
/// fresh state.
pub struct Checker {
    config: Arc<Config>,
    fetcher: Fetcher,
}

impl Checker {
    /// Creates a new checker
    ///
    /// # Arguments
    ///
    /// * `config` - The checker configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Checker)` - Configuration is valid and the client was built
    /// * `Err(CheckerError)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self, CheckerError> {
        validate(&config)?;
        let fetcher = Fetcher::from_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks one website
    ///
    /// This is the core logic that:
    /// 1. Fetches robots.txt for the site's origin
    /// 2. Takes the declared sitemaps, or probes the fallback locations
    /// 3. Resolves sitemap indexes until no new sitemap is found
    /// 4. Evaluates each distinct leaf URL against the robots rules
    /// 5. Builds the report
    ///
    /// # Arguments
    ///
    /// * `website_url` - Absolute HTTP(S) URL of the site; only its origin is used
    ///
    /// # Returns
    ///
    /// * `Ok(CheckReport)` - The check completed, possibly with per-document failures
    /// * `Err(CheckerError::UrlError)` - The website URL is invalid
    /// * `Err(CheckerError::OriginUnreachable)` - No request to the origin got a response
    pub async fn run(&self, website_url: &str) -> Result<CheckReport, CheckerError> {
        let started_at = Utc::now();
        let start_time = std::time::Instant::now();
        let deadline = self
            .config
            .crawl
            .run_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let site = parse_site_url(website_url)?;
        let origin = origin_of(&site);
        tracing::info!("Starting check of {}", origin);

        let mut contact = OriginContact::default();

        // Robots
        let robots_location = robots_url(&origin);
        let (robots, rules) = match fetch_robots(&self.fetcher, &robots_location, deadline).await
        {
            Ok(rules) => {
                contact.record_success();
                let status = RobotsStatus::Found {
                    url: robots_location.to_string(),
                    fetched_at: Utc::now(),
                };
                (status, rules)
            }
            Err(e) => {
                contact.record_error(&e);
                tracing::warn!(
                    "robots.txt unavailable ({}); treating every URL as crawlable",
                    e
                );
                let status = RobotsStatus::Unavailable {
                    url: robots_location.to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                };
                (status, RobotsRuleSet::allow_all())
            }
        };

        // Discovery
        let mut scheduler = Scheduler::new(
            self.config.crawl.max_concurrent_fetches,
            self.config.crawl.max_index_depth,
        );
        let discovery = self
            .discover(
                &origin,
                &robots_location,
                &rules,
                &mut scheduler,
                deadline,
                &mut contact,
            )
            .await;

        if !contact.answered {
            let reason = contact
                .last_error
                .unwrap_or_else(|| "no request was answered".to_string());
            tracing::error!("Origin {} is unreachable: {}", origin, reason);
            return Err(CheckerError::OriginUnreachable {
                origin: origin.to_string(),
                reason,
            });
        }

        // Resolution
        let (sitemaps, leaves) = self.resolve(&mut scheduler, deadline).await;

        // Crawlability
        let (results, duplicate_urls) = self.evaluate(&origin, &rules, leaves);

        let stats = CheckStatistics::collect(
            &sitemaps,
            &results,
            duplicate_urls,
            scheduler.depth_limited(),
        );

        tracing::info!(
            "Check of {} complete: {} sitemaps ({} failed), {} URLs ({} blocked) in {:.2}s",
            origin,
            stats.sitemaps_visited,
            stats.sitemaps_failed,
            stats.leaf_urls,
            stats.blocked,
            start_time.elapsed().as_secs_f64()
        );

        Ok(CheckReport {
            origin: origin.to_string(),
            robots_agent: self.config.robots_agent().to_string(),
            robots,
            rules,
            discovery,
            sitemaps,
            results,
            stats,
            started_at,
            elapsed: start_time.elapsed(),
        })
    }

    /// Seeds the scheduler with the starting sitemaps
    ///
    /// Declared sitemaps win. Without any, the fallback locations are probed
    /// in order and the first one that fetches successfully is used; its
    /// response is handed to the scheduler so it is not fetched twice.
    async fn discover(
        &self,
        origin: &Url,
        robots_location: &Url,
        rules: &RobotsRuleSet,
        scheduler: &mut Scheduler,
        deadline: Option<Instant>,
        contact: &mut OriginContact,
    ) -> SitemapDiscovery {
        let declared: Vec<Url> = rules
            .declared_sitemaps()
            .iter()
            .filter_map(|location| {
                let url = resolve_location(robots_location, location);
                if url.is_none() {
                    tracing::warn!("Ignoring invalid sitemap declaration '{}'", location);
                }
                url
            })
            .collect();

        if !declared.is_empty() {
            let mut urls = Vec::new();
            for url in declared {
                tracing::info!("Sitemap declared in robots.txt: {}", url);
                if scheduler.enqueue(url.clone(), 0, None, None) == EnqueueOutcome::Queued {
                    urls.push(url.to_string());
                }
            }
            return SitemapDiscovery::Declared(urls);
        }

        tracing::info!("No sitemap declared in robots.txt; probing common locations");

        let mut probed = Vec::new();
        for path in &self.config.crawl.fallback_sitemaps {
            let url = match join_origin(origin, path) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping fallback location {}: {}", path, e);
                    continue;
                }
            };

            match self.fetcher.fetch(&url, deadline).await {
                Ok(document) => {
                    contact.record_success();
                    tracing::info!("Found sitemap at fallback location {}", url);
                    scheduler.enqueue(url.clone(), 0, None, Some(document));
                    return SitemapDiscovery::Fallback {
                        url: url.to_string(),
                        probed,
                    };
                }
                Err(e) => {
                    tracing::debug!("No sitemap at {}: {}", url, e);
                    contact.record_error(&e);
                    probed.push(ProbeFailure {
                        url: url.to_string(),
                        kind: e.kind(),
                    });
                }
            }
        }

        tracing::warn!("No sitemap found for {}", origin);
        SitemapDiscovery::NotFound { probed }
    }

    /// Resolves queued sitemaps wave by wave until the frontier is empty
    ///
    /// Returns the visit log and the leaf entries, both in discovery order.
    async fn resolve(
        &self,
        scheduler: &mut Scheduler,
        deadline: Option<Instant>,
    ) -> (Vec<SitemapVisit>, Vec<Leaf>) {
        let semaphore = scheduler.semaphore();
        let max_depth = self.config.crawl.max_index_depth;

        let mut sitemaps = Vec::new();
        let mut leaves = Vec::new();

        while !scheduler.is_empty() {
            let mut wave = scheduler.next_wave();
            tracing::debug!("Resolving wave of {} sitemaps", wave.len());

            let outcomes = self.fetch_wave(&mut wave, &semaphore, deadline).await;

            for (queued, outcome) in wave.into_iter().zip(outcomes) {
                let outcome = match outcome {
                    Ok((base, parsed)) => match parsed.node {
                        SitemapNode::Index(locations) => {
                            tracing::info!(
                                "Sitemap index {} lists {} sitemaps",
                                queued.url,
                                locations.len()
                            );

                            let mut children = Vec::new();
                            for location in &locations {
                                let Some(child) = resolve_location(&base, location) else {
                                    tracing::debug!(
                                        "Skipping unresolvable sitemap location '{}' in {}",
                                        location,
                                        queued.url
                                    );
                                    continue;
                                };

                                match scheduler.enqueue(
                                    child.clone(),
                                    queued.depth + 1,
                                    Some(&queued.url),
                                    None,
                                ) {
                                    EnqueueOutcome::Queued => children.push(child.to_string()),
                                    EnqueueOutcome::AlreadyVisited => {
                                        tracing::debug!("Sitemap {} already visited", child)
                                    }
                                    EnqueueOutcome::TooDeep => tracing::warn!(
                                        "Skipping {}: index depth limit of {} reached",
                                        child,
                                        max_depth
                                    ),
                                }
                            }

                            SitemapOutcome::Index { children }
                        }
                        SitemapNode::UrlSet(entries) => {
                            let urls = entries.len();
                            tracing::info!("Sitemap {} lists {} URLs", queued.url, urls);

                            leaves.extend(entries.into_iter().map(|entry| Leaf {
                                entry,
                                base: base.clone(),
                                sitemap: queued.url.clone(),
                            }));

                            SitemapOutcome::UrlSet {
                                format: parsed.format,
                                urls,
                            }
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Skipping sitemap {}: {}", queued.url, e);
                        SitemapOutcome::Failed {
                            kind: e.kind(),
                            message: e.to_string(),
                        }
                    }
                };

                sitemaps.push(SitemapVisit {
                    url: queued.url.to_string(),
                    depth: queued.depth,
                    parent: queued.parent.map(|parent| parent.to_string()),
                    outcome,
                });
            }
        }

        (sitemaps, leaves)
    }

    /// Fetches and parses one wave on the bounded pool
    ///
    /// Results are keyed by sequence number and come back in wave order
    /// whatever order the fetches complete in. A task that ends without a
    /// result is reported as aborted.
    async fn fetch_wave(
        &self,
        wave: &mut [QueuedSitemap],
        semaphore: &Arc<Semaphore>,
        deadline: Option<Instant>,
    ) -> Vec<Resolved> {
        let mut resolved: HashMap<usize, Resolved> = HashMap::with_capacity(wave.len());
        let mut tasks = JoinSet::new();

        for queued in wave.iter_mut() {
            if let Some(document) = queued.prefetched.take() {
                resolved.insert(queued.seq, parse_document(&document));
                continue;
            }

            let fetcher = self.fetcher.clone();
            let semaphore = Arc::clone(semaphore);
            let seq = queued.seq;
            let url = queued.url.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (seq, resolve_sitemap(&fetcher, &url, deadline).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((seq, outcome)) => {
                    resolved.insert(seq, outcome);
                }
                Err(e) => tracing::error!("Sitemap task failed: {}", e),
            }
        }

        wave.iter()
            .map(|queued| {
                resolved.remove(&queued.seq).unwrap_or_else(|| {
                    Err(CheckerError::TaskAborted {
                        url: queued.url.to_string(),
                    })
                })
            })
            .collect()
    }

    /// Evaluates each distinct leaf URL in discovery order
    ///
    /// Returns the verdicts and the number of repeated URLs dropped.
    fn evaluate(
        &self,
        origin: &Url,
        rules: &RobotsRuleSet,
        leaves: Vec<Leaf>,
    ) -> (Vec<CrawlResult>, usize) {
        let agent = self.config.robots_agent();

        let mut seen = HashSet::new();
        let mut duplicates = 0;
        let mut results = Vec::with_capacity(leaves.len());

        for leaf in leaves {
            let Some(url) = resolve_location(&leaf.base, &leaf.entry.loc) else {
                tracing::debug!(
                    "Skipping unresolvable URL '{}' in {}",
                    leaf.entry.loc,
                    leaf.sitemap
                );
                continue;
            };

            if !seen.insert(visit_key(&url)) {
                duplicates += 1;
                continue;
            }

            let crawlable = rules.is_crawlable(url.as_str(), agent);

            let mut notes = Vec::new();
            if !crawlable {
                notes.push("blocked by robots.txt");
            }
            if !same_host(&url, origin) {
                notes.push("outside the checked origin");
            }

            results.push(CrawlResult {
                url: url.to_string(),
                crawlable,
                note: (!notes.is_empty()).then(|| notes.join(", ")),
                sitemap: leaf.sitemap.to_string(),
                lastmod: leaf.entry.lastmod_utc(),
                media: leaf.entry.extensions.kinds(),
            });
        }

        if duplicates > 0 {
            tracing::info!("Skipped {} duplicate URLs", duplicates);
        }

        (results, duplicates)
    }
}

/// Fetches, decompresses and parses one sitemap
async fn resolve_sitemap(fetcher: &Fetcher, url: &Url, deadline: Option<Instant>) -> Resolved {
    let document = fetcher.fetch(url, deadline).await?;
    parse_document(&document)
}

/// Decompresses and parses an already fetched sitemap
fn parse_document(document: &FetchedDocument) -> Resolved {
    let hinted = gzip_hinted(document.content_type.as_deref(), &document.url);

    let bytes = decompress(&document.body, hinted).map_err(|source| CheckerError::Document {
        url: document.url.to_string(),
        source,
    })?;

    let charset = charset_from_content_type(document.content_type.as_deref());
    let parsed = parse_sitemap_with_charset(&bytes, charset).map_err(|source| CheckerError::Document {
        url: document.url.to_string(),
        source,
    })?;

    Ok((document.final_url.clone(), parsed))
}

/// Runs a complete check with a fresh checker
///
/// # Example
///
/// ```no_run
/// use sitemap_checker::config::Config;
/// use sitemap_checker::crawler::run_check;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_check(Config::default(), "https://example.com").await?;
/// println!("{} URLs checked", report.results.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_check(config: Config, website_url: &str) -> Result<CheckReport, CheckerError> {
    let checker = Checker::new(config)?;
    checker.run(website_url).await
}
