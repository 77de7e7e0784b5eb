use serde::Deserialize;

/// Name of the environment variable pointing at a TOML configuration file
pub const CONFIG_ENV_VAR: &str = "SITEMAP_CHECKER_CONFIG";

/// Main configuration structure for the sitemap checker
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
}

impl Config {
    /// Product token used when evaluating robots.txt groups
    ///
    /// Falls back to the crawler name when no explicit agent is configured.
    pub fn robots_agent(&self) -> &str {
        self.crawl
            .robots_agent
            .as_deref()
            .unwrap_or(&self.user_agent.crawler_name)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`, the contact part is
    /// omitted when no contact URL is configured.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// HTTP request behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Total time allowed for a single request (seconds)
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Sitemap resolution behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Maximum number of sitemap fetches in flight at once
    pub max_concurrent_fetches: usize,

    /// Deadline for the whole run (seconds); no deadline when absent
    pub run_timeout_secs: Option<u64>,

    /// Maximum nesting depth of sitemap indexes
    pub max_index_depth: u32,

    /// Product token matched against robots.txt `User-agent` lines
    pub robots_agent: Option<String>,

    /// Paths probed, in order, when robots.txt declares no sitemap
    pub fallback_sitemaps: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            run_timeout_secs: Some(300),
            max_index_depth: 10,
            robots_agent: None,
            fallback_sitemaps: vec![
                "/sitemap.xml".to_string(),
                "/sitemap_index.xml".to_string(),
                "/wp-sitemap.xml".to_string(),
                "/sitemap.php".to_string(),
            ],
        }
    }
}
