use url::Url;

/// Resolves a `<loc>`/`<link>` value found in a document
///
/// Relative locations are resolved against the URL of the document they were
/// found in. Returns None when the value is empty, cannot be parsed, or does
/// not resolve to an HTTP(S) URL.
///
/// # Arguments
///
/// * `base` - The URL of the document containing the location
/// * `location` - The raw location text
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_checker::url::resolve_location;
///
/// let base = Url::parse("https://example.com/sitemaps/index.xml").unwrap();
/// let url = resolve_location(&base, "posts.xml").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/sitemaps/posts.xml");
/// assert!(resolve_location(&base, "javascript:void(0)").is_none());
/// ```
pub fn resolve_location(base: &Url, location: &str) -> Option<Url> {
    let location = location.trim();

    if location.is_empty() {
        return None;
    }

    match base.join(location) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Builds the key used by the visited-set guard
///
/// Two spellings of the same sitemap (differing only in host case, default
/// port, dot segments or fragment) map to the same key. The `url` crate
/// already normalizes everything but the fragment.
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    if key.query() == Some("") {
        key.set_query(None);
    }
    key.into()
}

/// Checks whether the URL path carries a `.gz` suffix
pub fn has_gzip_suffix(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".gz")
}
