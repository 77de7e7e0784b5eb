//! Scheduler for the sitemap resolution frontier
//!
//! This module handles:
//! - The FIFO frontier of sitemap URLs still to resolve
//! - The visited set that keeps every sitemap URL to a single fetch
//! - Index depth limiting
//! - Global concurrency limiting via a semaphore
//!
//! Every queued sitemap receives a discovery sequence number when it is
//! enqueued. Results are reported in that order regardless of which fetch
//! finishes first.

use crate::crawler::fetcher::FetchedDocument;
use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// A sitemap waiting to be resolved
#[derive(Debug, Clone)]
pub struct QueuedSitemap {
    /// Discovery sequence number (0-based, in enqueue order)
    pub seq: usize,

    /// The sitemap URL to fetch
    pub url: Url,

    /// Index nesting depth; seeds are at depth 0
    pub depth: u32,

    /// The index that listed this sitemap, if any
    pub parent: Option<Url>,

    /// Response already fetched while probing fallback locations
    pub prefetched: Option<FetchedDocument>,
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The URL was new and is now queued
    Queued,

    /// The URL was already queued or resolved
    AlreadyVisited,

    /// The URL sits deeper than the configured index depth
    TooDeep,
}

/// Scheduler manages the frontier queue and the fetch concurrency limit
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Sitemaps waiting for the next wave, in discovery order
    frontier: VecDeque<QueuedSitemap>,

    /// Visit keys of every sitemap ever enqueued
    visited: HashSet<String>,

    next_seq: usize,
    max_depth: u32,
    depth_limited: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of fetches in flight at once
    /// * `max_depth` - Deepest index nesting level that is still resolved
    pub fn new(max_concurrent: usize, max_depth: u32) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            next_seq: 0,
            max_depth,
            depth_limited: 0,
        }
    }

    /// Offers a sitemap URL to the frontier
    ///
    /// The URL is marked visited at enqueue time, so an index that lists
    /// itself (or a cycle across several indexes) is fetched only once.
    pub fn enqueue(
        &mut self,
        url: Url,
        depth: u32,
        parent: Option<&Url>,
        prefetched: Option<FetchedDocument>,
    ) -> EnqueueOutcome {
        if depth > self.max_depth {
            self.depth_limited += 1;
            return EnqueueOutcome::TooDeep;
        }

        if !self.visited.insert(visit_key(&url)) {
            return EnqueueOutcome::AlreadyVisited;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        tracing::debug!("Queued sitemap #{} at depth {}: {}", seq, depth, url);

        self.frontier.push_back(QueuedSitemap {
            seq,
            url,
            depth,
            parent: parent.cloned(),
            prefetched,
        });

        EnqueueOutcome::Queued
    }

    /// Takes every queued sitemap for the next resolution wave
    ///
    /// The wave comes out in ascending sequence order.
    pub fn next_wave(&mut self) -> Vec<QueuedSitemap> {
        self.frontier.drain(..).collect()
    }

    /// Returns true if no sitemap is waiting
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns a handle to the global fetch semaphore
    pub fn semaphore(&self) -> Arc<Semaphore> {
        Arc::clone(&self.global_semaphore)
    }

    /// Number of offers rejected by the depth limit
    pub fn depth_limited(&self) -> usize {
        self.depth_limited
    }
}
