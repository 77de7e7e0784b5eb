//! Integration tests for the checker
//!
//! These tests use wiremock to create mock HTTP servers and run complete
//! checks end-to-end.

use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_checker::config::Config;
use sitemap_checker::crawler::Checker;
use sitemap_checker::output::{format_report, RobotsStatus, SitemapDiscovery, SitemapOutcome};
use sitemap_checker::{CheckerError, ErrorKind};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.fetch.request_timeout_secs = 5;
    config.fetch.connect_timeout_secs = 2;
    config.crawl.max_concurrent_fetches = 4;
    config.crawl.run_timeout_secs = Some(20);
    config
}

fn urlset(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("<url><loc>{}</loc></url>", loc));
    }
    xml.push_str("</urlset>");
    xml
}

fn sitemap_index(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("<sitemap><loc>{}</loc></sitemap>", loc));
    }
    xml.push_str("</sitemapindex>");
    xml
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

async fn mount_xml(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn result_urls(report: &sitemap_checker::CheckReport) -> Vec<String> {
    report.results.iter().map(|r| r.url.clone()).collect()
}

#[tokio::test]
async fn test_disallowed_path_is_not_crawlable() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        format!(
            "User-agent: *\nDisallow: /private\nSitemap: {}/sitemap.xml\n",
            base
        ),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[
            format!("{}/public/page", base),
            format!("{}/private/page", base),
        ]),
    )
    .await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert!(matches!(report.robots, RobotsStatus::Found { .. }));
    assert_eq!(report.rules.rules().len(), 1);
    assert!(matches!(
        &report.discovery,
        SitemapDiscovery::Declared(urls) if urls == &vec![format!("{}/sitemap.xml", base)]
    ));

    assert_eq!(report.results.len(), 2);
    let public = report
        .result_for(&format!("{}/public/page", base))
        .unwrap();
    assert!(public.crawlable);
    let private = report
        .result_for(&format!("{}/private/page", base))
        .unwrap();
    assert!(!private.crawlable);
    assert_eq!(private.note.as_deref(), Some("blocked by robots.txt"));

    assert_eq!(report.stats.crawlable, 1);
    assert_eq!(report.stats.blocked, 1);

    let text = format_report(&report);
    assert!(text.contains(&format!("✅ {}/public/page (crawlable)", base)));
    assert!(text.contains(&format!("❌ {}/private/page (not crawlable", base)));
}

#[tokio::test]
async fn test_sitemap_index_children_are_resolved() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap_index.xml\n", base),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/sitemap1.xml", base),
            format!("{}/sitemap2.xml", base),
        ]),
    )
    .await;
    mount_xml(&server, "/sitemap1.xml", urlset(&[format!("{}/one", base)])).await;
    mount_xml(&server, "/sitemap2.xml", urlset(&[format!("{}/two", base)])).await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert_eq!(report.sitemaps.len(), 3);
    match &report.sitemaps[0].outcome {
        SitemapOutcome::Index { children } => assert_eq!(children.len(), 2),
        other => panic!("expected index, got {:?}", other),
    }
    assert_eq!(report.sitemaps[1].url, format!("{}/sitemap1.xml", base));
    assert_eq!(report.sitemaps[1].depth, 1);
    assert_eq!(
        report.sitemaps[1].parent.as_deref(),
        Some(format!("{}/sitemap_index.xml", base).as_str())
    );
    assert_eq!(report.sitemaps[2].url, format!("{}/sitemap2.xml", base));

    assert_eq!(
        result_urls(&report),
        vec![format!("{}/one", base), format!("{}/two", base)]
    );
    assert!(report.results.iter().all(|r| r.crawlable));
    assert_eq!(report.stats.indexes, 1);
}

#[tokio::test]
async fn test_index_cycle_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("Sitemap: {}/sitemap.xml\n", base)).await;

    // The root index lists itself and a child index that points back to it
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[
            format!("{}/sitemap.xml", base),
            format!("{}/nested.xml", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nested.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[
            format!("{}/sitemap.xml", base),
            format!("{}/leaves.xml", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_xml(&server, "/leaves.xml", urlset(&[format!("{}/page", base)])).await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert_eq!(report.sitemaps.len(), 3);
    assert_eq!(result_urls(&report), vec![format!("{}/page", base)]);
}

#[tokio::test]
async fn test_gzip_sitemap_matches_plain() {
    let server = MockServer::start().await;
    let base = server.uri();

    let body = urlset(&[format!("{}/a", base), format!("{}/b", base)]);

    mount_robots(
        &server,
        format!(
            "Sitemap: {}/plain.xml\nSitemap: {}/packed.xml.gz\nSitemap: {}/encoded.xml\n",
            base, base, base
        ),
    )
    .await;
    mount_xml(&server, "/plain.xml", body.clone()).await;
    Mock::given(method("GET"))
        .and(path("/packed.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(body.as_bytes()))
                .insert_header("content-type", "application/x-gzip"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/encoded.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(body.as_bytes()))
                .insert_header("content-type", "application/xml")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&server)
        .await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert_eq!(report.sitemaps.len(), 3);
    for visit in &report.sitemaps {
        assert!(
            matches!(visit.outcome, SitemapOutcome::UrlSet { urls: 2, .. }),
            "{} was not read as a two-URL set: {:?}",
            visit.url,
            visit.outcome
        );
    }

    // The same two URLs from all three documents, reported once each
    assert_eq!(
        result_urls(&report),
        vec![format!("{}/a", base), format!("{}/b", base)]
    );
    assert_eq!(report.stats.duplicate_urls, 4);
}

#[tokio::test]
async fn test_malformed_sibling_does_not_block_others() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("Sitemap: {}/index.xml\n", base)).await;
    mount_xml(
        &server,
        "/index.xml",
        sitemap_index(&[
            format!("{}/broken.xml", base),
            format!("{}/missing.xml", base),
            format!("{}/good.xml", base),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/broken.xml",
        format!("<urlset><url><loc>{}/lost</loc>", base),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_xml(&server, "/good.xml", urlset(&[format!("{}/kept", base)])).await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    let broken = report.visit_for(&format!("{}/broken.xml", base)).unwrap();
    assert!(matches!(
        broken.outcome,
        SitemapOutcome::Failed {
            kind: ErrorKind::MalformedDocument,
            ..
        }
    ));
    let missing = report.visit_for(&format!("{}/missing.xml", base)).unwrap();
    assert!(matches!(
        missing.outcome,
        SitemapOutcome::Failed {
            kind: ErrorKind::Http(500),
            ..
        }
    ));

    assert_eq!(result_urls(&report), vec![format!("{}/kept", base)]);
    assert_eq!(report.stats.sitemaps_failed, 2);

    let text = format_report(&report);
    assert!(text.contains(&format!("❌ {}/broken.xml: MalformedDocumentError", base)));
    assert!(text.contains(&format!("❌ {}/missing.xml: HttpError(500)", base)));
}

#[tokio::test]
async fn test_missing_robots_uses_fallback_sitemap() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // /sitemap.xml is not mounted and answers 404
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(urlset(&[format!("{}/anything", base)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert!(matches!(
        report.robots,
        RobotsStatus::Unavailable {
            kind: ErrorKind::Http(404),
            ..
        }
    ));
    match &report.discovery {
        SitemapDiscovery::Fallback { url, probed } => {
            assert_eq!(url, &format!("{}/sitemap_index.xml", base));
            assert_eq!(probed.len(), 1);
            assert_eq!(probed[0].kind, ErrorKind::Http(404));
        }
        other => panic!("expected fallback discovery, got {:?}", other),
    }

    // No rules: everything is crawlable
    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].crawlable);
}

#[tokio::test]
async fn test_no_sitemap_anywhere_still_reports() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nDisallow: /admin\n".to_string()).await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    match &report.discovery {
        SitemapDiscovery::NotFound { probed } => assert_eq!(probed.len(), 4),
        other => panic!("expected no sitemap, got {:?}", other),
    }
    assert!(report.sitemaps.is_empty());
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_unreachable_origin_fails_run() {
    // Nothing listens on port 1
    let checker = Checker::new(create_test_config()).unwrap();
    let err = checker.run("http://127.0.0.1:1").await.unwrap_err();

    assert!(matches!(err, CheckerError::OriginUnreachable { .. }));
    assert_eq!(err.kind(), ErrorKind::OriginUnreachable);
}

#[tokio::test]
async fn test_results_follow_discovery_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("Sitemap: {}/index.xml\n", base)).await;
    mount_xml(
        &server,
        "/index.xml",
        sitemap_index(&[format!("{}/slow.xml", base), format!("{}/fast.xml", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&[format!("{}/slow-page", base)]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    mount_xml(&server, "/fast.xml", urlset(&[format!("{}/fast-page", base)])).await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    let visited: Vec<&str> = report.sitemaps.iter().map(|v| v.url.as_str()).collect();
    assert_eq!(
        visited,
        vec![
            format!("{}/index.xml", base).as_str(),
            format!("{}/slow.xml", base).as_str(),
            format!("{}/fast.xml", base).as_str(),
        ]
    );
    assert_eq!(
        result_urls(&report),
        vec![format!("{}/slow-page", base), format!("{}/fast-page", base)]
    );
}

#[tokio::test]
async fn test_run_deadline_fails_slow_sitemap_only() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        format!("Sitemap: {}/quick.xml\nSitemap: {}/stuck.xml\n", base, base),
    )
    .await;
    mount_xml(&server, "/quick.xml", urlset(&[format!("{}/ok", base)])).await;
    Mock::given(method("GET"))
        .and(path("/stuck.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&[format!("{}/late", base)]))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawl.run_timeout_secs = Some(1);

    let checker = Checker::new(config).unwrap();
    let report = checker.run(&base).await.unwrap();

    let stuck = report.visit_for(&format!("{}/stuck.xml", base)).unwrap();
    assert!(matches!(
        stuck.outcome,
        SitemapOutcome::Failed {
            kind: ErrorKind::Network,
            ..
        }
    ));
    assert_eq!(result_urls(&report), vec![format!("{}/ok", base)]);
}

#[tokio::test]
async fn test_index_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("Sitemap: {}/top.xml\n", base)).await;
    mount_xml(
        &server,
        "/top.xml",
        sitemap_index(&[format!("{}/middle.xml", base)]),
    )
    .await;
    mount_xml(
        &server,
        "/middle.xml",
        sitemap_index(&[format!("{}/bottom.xml", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bottom.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[format!(
            "{}/deep",
            base
        )])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawl.max_index_depth = 1;

    let checker = Checker::new(config).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert_eq!(report.sitemaps.len(), 2);
    assert_eq!(report.stats.depth_limited, 1);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_relative_locations_and_feeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "Sitemap: /maps/index.xml\n".to_string()).await;
    mount_xml(
        &server,
        "/maps/index.xml",
        sitemap_index(&["feed.rss".to_string(), "/maps/atom.xml".to_string()]),
    )
    .await;
    mount_xml(
        &server,
        "/maps/feed.rss",
        format!(
            r#"<rss version="2.0"><channel><title>News</title>
<item><title>Post</title><link>{}/posts/1</link><pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate></item>
</channel></rss>"#,
            base
        ),
    )
    .await;
    mount_xml(
        &server,
        "/maps/atom.xml",
        r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><title>A</title><link href="/posts/2"/></entry></feed>"#
            .to_string(),
    )
    .await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert_eq!(
        result_urls(&report),
        vec![format!("{}/posts/1", base), format!("{}/posts/2", base)]
    );
    assert!(report.results[0].lastmod.is_some());
}

#[tokio::test]
async fn test_latin1_robots_and_sitemap() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut robots = b"# Caf\xe9 rules\nUser-agent: *\nDisallow: /private\n".to_vec();
    robots.extend_from_slice(format!("Sitemap: {}/sitemap.xml\n", base).as_bytes());
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(robots, "text/plain; charset=iso-8859-1"))
        .mount(&server)
        .await;

    let mut sitemap = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<urlset>".to_vec();
    sitemap.extend_from_slice(format!("<url><loc>{}/caf", base).as_bytes());
    sitemap.extend_from_slice(b"\xe9</loc></url>");
    sitemap.extend_from_slice(format!("<url><loc>{}/private/x</loc></url></urlset>", base).as_bytes());
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sitemap))
        .mount(&server)
        .await;

    let checker = Checker::new(create_test_config()).unwrap();
    let report = checker.run(&base).await.unwrap();

    assert!(matches!(report.robots, RobotsStatus::Found { .. }));
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].url, format!("{}/caf%C3%A9", base));
    assert!(report.results[0].crawlable);
    assert!(!report.results[1].crawlable);
}
