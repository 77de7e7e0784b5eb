//! Crawler module for sitemap fetching and resolution
//!
//! This module contains the core checking logic, including:
//! - HTTP fetching bounded by the run deadline
//! - Gzip detection and decoding
//! - The sitemap frontier and fetch concurrency limit
//! - Overall check coordination

mod coordinator;
mod decompress;
mod fetcher;
mod scheduler;

pub use coordinator::{run_check, Checker};
pub use decompress::{decompress, gzip_hinted, MAX_DECOMPRESSED_BYTES};
pub use fetcher::{build_http_client, FetchedDocument, Fetcher};
pub use scheduler::{EnqueueOutcome, QueuedSitemap, Scheduler};
