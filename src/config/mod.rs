//! Configuration module for the sitemap checker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a configuration file works.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_checker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("checker.toml")).unwrap();
//! println!("Index depth limit: {}", config.crawl.max_index_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, FetchConfig, UserAgentConfig, CONFIG_ENV_VAR};

// Re-export parser functions
pub use parser::{load_config, load_config_from_env, parse_config};
pub use validation::validate;
