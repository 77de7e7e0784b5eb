use crate::UrlError;
use url::Url;

/// Parses the website URL given on the command line
///
/// The URL must carry an `http` or `https` scheme and a host. Any path,
/// query or fragment is accepted here and discarded by [`origin_of`].
///
/// # Arguments
///
/// * `input` - The raw website URL
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is malformed, relative, or not HTTP(S)
///
/// # Examples
///
/// ```
/// use sitemap_checker::url::parse_site_url;
///
/// assert!(parse_site_url("https://example.com").is_ok());
/// assert!(parse_site_url("example.com").is_err());
/// assert!(parse_site_url("ftp://example.com").is_err());
/// ```
pub fn parse_site_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input.trim()).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => {
            UrlError::Parse(format!("'{}' must include a scheme such as https://", input))
        }
        other => UrlError::Parse(format!("'{}': {}", input, other)),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Reduces a URL to its origin (`scheme://host[:port]/`)
pub fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    // Credentials never belong to the origin; these only fail for
    // cannot-be-a-base URLs, which HTTP(S) URLs are not.
    let _ = origin.set_username("");
    let _ = origin.set_password(None);
    origin
}

/// Builds an absolute URL for a path on the origin
///
/// # Examples
///
/// ```
/// use sitemap_checker::url::{join_origin, parse_site_url};
///
/// let origin = parse_site_url("https://example.com/").unwrap();
/// let url = join_origin(&origin, "/sitemap.xml").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/sitemap.xml");
/// ```
pub fn join_origin(origin: &Url, path: &str) -> Result<Url, UrlError> {
    origin
        .join(path)
        .map_err(|e| UrlError::Parse(format!("'{}': {}", path, e)))
}

/// Returns the robots.txt URL for an origin
pub fn robots_url(origin: &Url) -> Url {
    let mut url = origin.clone();
    url.set_path("/robots.txt");
    url
}

/// Checks whether two URLs point at the same host and port
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().map(str::to_ascii_lowercase) == b.host_str().map(str::to_ascii_lowercase)
        && a.port_or_known_default() == b.port_or_known_default()
}
