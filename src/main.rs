//! Sitemap Checker main entry point
//!
//! This is the command-line interface for the sitemap checker.

use clap::Parser;
use sitemap_checker::config::{load_config_from_env, CONFIG_ENV_VAR};
use sitemap_checker::crawler::Checker;
use sitemap_checker::output::write_report;
use tracing_subscriber::EnvFilter;

/// Sitemap Checker: robots.txt and sitemap analyzer
///
/// Fetches a site's robots.txt, follows the sitemaps it declares (or probes
/// common sitemap locations) and reports which of the listed URLs crawlers
/// are allowed to visit.
///
/// Settings are read from the TOML file named by SITEMAP_CHECKER_CONFIG;
/// log verbosity follows RUST_LOG.
#[derive(Parser, Debug)]
#[command(name = "sitemap-checker")]
#[command(version)]
#[command(about = "Checks robots.txt and sitemap crawlability", long_about = None)]
struct Cli {
    /// Website to check, including the scheme (e.g. https://example.com)
    #[arg(value_name = "WEBSITE_URL")]
    website_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging();

    let config = match load_config_from_env() {
        Ok((config, Some(path))) => {
            tracing::info!("Configuration loaded from {}", path.display());
            config
        }
        Ok((config, None)) => {
            tracing::debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let checker = Checker::new(config)?;

    let report = match checker.run(&cli.website_url).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Check failed: {}", e);
            return Err(e.into());
        }
    };

    write_report(&report, std::io::stdout().lock())?;

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// Logs go to stderr so the report on stdout stays clean.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sitemap_checker=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
