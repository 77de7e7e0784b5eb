//! Robots.txt parser implementation
//!
//! Lines are read into an ordered rule list plus the declared sitemaps.
//! Matching itself is delegated to the robotstxt crate, which implements
//! longest-match precedence and the `*`/`$` wildcards.

use robotstxt::DefaultMatcher;
use std::fmt;

/// Whether a rule allows or forbids the matched paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDirective {
    Allow,
    Disallow,
}

impl fmt::Display for RuleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "Allow"),
            Self::Disallow => write!(f, "Disallow"),
        }
    }
}

/// A single Allow/Disallow line and the user agent group it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    /// User agent of the group (`*` for the wildcard group)
    pub user_agent: String,

    /// Path pattern, possibly containing `*` and a trailing `$`
    pub pattern: String,

    pub directive: RuleDirective,
}

/// Parsed robots.txt data
///
/// Immutable once built. An empty rule set allows everything.
#[derive(Debug, Clone, Default)]
pub struct RobotsRuleSet {
    /// Raw robots.txt content, kept for the matcher
    content: String,

    /// Allow/Disallow rules in file order
    rules: Vec<RobotsRule>,

    /// Sitemap URLs in file order, without duplicates
    sitemaps: Vec<String>,
}

impl RobotsRuleSet {
    /// Creates a new RobotsRuleSet from raw robots.txt content
    ///
    /// Never fails: unknown directives, comments and lines without a `:`
    /// separator are skipped, so malformed input degrades to fewer rules.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_checker::robots::RobotsRuleSet;
    ///
    /// let robots = RobotsRuleSet::parse(
    ///     "User-agent: *\nDisallow: /private\nSitemap: https://example.com/sitemap.xml",
    /// );
    /// assert!(!robots.is_crawlable("https://example.com/private/page", "mybot"));
    /// assert_eq!(robots.declared_sitemaps(), ["https://example.com/sitemap.xml"]);
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut rules = Vec::new();
        let mut sitemaps: Vec<String> = Vec::new();

        // Consecutive User-agent lines form one group; the first rule line
        // closes the agent list so the next User-agent starts a new group.
        let mut current_agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in content.lines() {
            let line = strip_comment(line).trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                tracing::trace!("Skipping robots.txt line without separator: {}", line);
                continue;
            };

            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_rules {
                        current_agents.clear();
                        in_rules = false;
                    }
                    current_agents.push(value.to_string());
                }
                "allow" | "disallow" => {
                    in_rules = true;
                    // An empty Disallow means "allow everything" and
                    // contributes no pattern.
                    if value.is_empty() {
                        continue;
                    }
                    let directive = if key == "allow" {
                        RuleDirective::Allow
                    } else {
                        RuleDirective::Disallow
                    };
                    for agent in &current_agents {
                        rules.push(RobotsRule {
                            user_agent: agent.clone(),
                            pattern: value.to_string(),
                            directive,
                        });
                    }
                }
                "sitemap" | "site-map" => {
                    if !value.is_empty() && !sitemaps.iter().any(|s| s == value) {
                        sitemaps.push(value.to_string());
                    }
                }
                _ => {
                    tracing::trace!("Skipping unknown robots.txt directive: {}", key);
                }
            }
        }

        Self {
            content: content.to_string(),
            rules,
            sitemaps,
        }
    }

    /// Creates a permissive rule set that allows everything
    ///
    /// This is used when robots.txt cannot be fetched or decoded.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the Allow/Disallow rules in file order
    pub fn rules(&self) -> &[RobotsRule] {
        &self.rules
    }

    /// Returns the sitemap URLs declared with `Sitemap:` lines
    pub fn declared_sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Returns true if the rule set has no Allow/Disallow rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks if a URL may be crawled by the given user agent
    ///
    /// The group naming the agent applies when one exists, otherwise the `*`
    /// group. Within the group the longest matching pattern wins, with Allow
    /// winning ties.
    ///
    /// # Arguments
    ///
    /// * `url` - An absolute URL or a path such as `/page.html`
    /// * `user_agent` - The product token of the crawler
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_crawlable(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

/// Removes a `#` comment from a robots.txt line
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = RobotsRuleSet::allow_all();
        assert!(robots.is_crawlable("/any/path", "TestBot"));
        assert!(robots.is_crawlable("/admin", "TestBot"));
        assert!(robots.declared_sitemaps().is_empty());
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /");
        assert!(!robots.is_crawlable("/", "TestBot"));
        assert!(!robots.is_crawlable("https://example.com/page", "TestBot"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /admin");
        assert!(robots.is_crawlable("/", "TestBot"));
        assert!(robots.is_crawlable("/page", "TestBot"));
        assert!(!robots.is_crawlable("/admin", "TestBot"));
        assert!(!robots.is_crawlable("/admin/users", "TestBot"));
    }

    #[test]
    fn test_longest_match_wins() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /a\nAllow: /a/b");
        assert!(robots.is_crawlable("https://example.com/a/b/page", "TestBot"));
        assert!(!robots.is_crawlable("https://example.com/a/c", "TestBot"));
    }

    #[test]
    fn test_longest_match_independent_of_order() {
        let robots = RobotsRuleSet::parse("User-agent: *\nAllow: /a/b\nDisallow: /a");
        assert!(robots.is_crawlable("/a/b/page", "TestBot"));
        assert!(!robots.is_crawlable("/a/c", "TestBot"));
    }

    #[test]
    fn test_wildcard_patterns() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /*.pdf$\nDisallow: /tmp*/cache");
        assert!(!robots.is_crawlable("/docs/file.pdf", "TestBot"));
        assert!(robots.is_crawlable("/docs/file.pdf?download=1", "TestBot"));
        assert!(!robots.is_crawlable("/tmp123/cache/x", "TestBot"));
        assert!(robots.is_crawlable("/docs/file.html", "TestBot"));
    }

    #[test]
    fn test_parse_specific_user_agent() {
        let robots = RobotsRuleSet::parse("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(robots.is_crawlable("/page", "GoodBot"));
        assert!(!robots.is_crawlable("/page", "BadBot"));
    }

    #[test]
    fn test_specific_group_replaces_wildcard_group() {
        let robots =
            RobotsRuleSet::parse("User-agent: *\nDisallow: /private\n\nUser-agent: TestBot\nDisallow: /drafts");
        assert!(robots.is_crawlable("/private", "TestBot"));
        assert!(!robots.is_crawlable("/drafts", "TestBot"));
        assert!(!robots.is_crawlable("/private", "OtherBot"));
    }

    #[test]
    fn test_case_insensitive_keys() {
        let robots = RobotsRuleSet::parse("USER-AGENT: *\ndisallow: /secret\nSITEMAP: https://example.com/s.xml");
        assert!(!robots.is_crawlable("/secret", "TestBot"));
        assert_eq!(robots.declared_sitemaps(), ["https://example.com/s.xml"]);
    }

    #[test]
    fn test_grouped_user_agents_share_rules() {
        let robots = RobotsRuleSet::parse("User-agent: BotA\nUser-agent: BotB\nDisallow: /x");
        assert_eq!(robots.rules().len(), 2);
        assert_eq!(robots.rules()[0].user_agent, "BotA");
        assert_eq!(robots.rules()[1].user_agent, "BotB");
        assert!(robots.rules().iter().all(|r| r.directive == RuleDirective::Disallow));
    }

    #[test]
    fn test_comments_and_unknown_directives_are_skipped() {
        let content = "# comment line\nUser-agent: * # everyone\nCrawl-delay: 10\nDisallow: /tmp # scratch\nNoindex: /x\n";
        let robots = RobotsRuleSet::parse(content);
        assert_eq!(robots.rules().len(), 1);
        assert_eq!(robots.rules()[0].pattern, "/tmp");
        assert_eq!(robots.rules()[0].user_agent, "*");
    }

    #[test]
    fn test_sitemaps_collected_in_order_without_duplicates() {
        let content = "Sitemap: https://example.com/a.xml\nUser-agent: *\nDisallow:\nSitemap: https://example.com/b.xml\nSitemap: https://example.com/a.xml";
        let robots = RobotsRuleSet::parse(content);
        assert_eq!(
            robots.declared_sitemaps(),
            ["https://example.com/a.xml", "https://example.com/b.xml"]
        );
        assert!(robots.is_empty());
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = RobotsRuleSet::parse("This is not valid robots.txt {{{");
        assert!(robots.is_empty());
        assert!(robots.is_crawlable("/any/path", "TestBot"));
    }

    #[test]
    fn test_lenient_lines_still_block() {
        // Accepted by the matcher even though the line parser skips them
        let missing_colon = RobotsRuleSet::parse("User-agent: *\nDisallow /private\n");
        assert!(!missing_colon.is_crawlable("/private", "TestBot"));
        assert!(missing_colon.is_crawlable("/public", "TestBot"));

        let misspelled = RobotsRuleSet::parse("User-agent: *\nDissallow: /private\n");
        assert!(!misspelled.is_crawlable("https://example.com/private", "TestBot"));
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = RobotsRuleSet::parse("");
        assert!(robots.is_crawlable("/any/path", "TestBot"));
    }

    #[test]
    fn test_is_crawlable_is_idempotent() {
        let robots = RobotsRuleSet::parse("User-agent: *\nDisallow: /a\nAllow: /a/b");
        for url in ["/a", "/a/b", "/a/b/c", "/z"] {
            let first = robots.is_crawlable(url, "TestBot");
            for _ in 0..5 {
                assert_eq!(robots.is_crawlable(url, "TestBot"), first);
            }
        }
    }
}
