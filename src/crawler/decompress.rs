//! Gzip detection and decoding for fetched documents
//!
//! Compressed sitemaps arrive either as `.gz` files served with a gzip
//! content type, or with `Content-Encoding: gzip` (already undone by the HTTP
//! client). The gzip magic bytes decide; the hint only explains mismatches.

use crate::url::has_gzip_suffix;
use crate::{DocumentError, DocumentResult};
use flate2::read::MultiGzDecoder;
use std::borrow::Cow;
use std::io::Read;
use url::Url;

/// First two bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Upper bound on a decompressed document (the sitemap protocol limit)
pub const MAX_DECOMPRESSED_BYTES: u64 = 50 * 1024 * 1024;

/// Checks whether the response advertises gzip content
///
/// # Arguments
///
/// * `content_type` - The Content-Type header value, if any
/// * `url` - The requested URL (checked for a `.gz` suffix)
pub fn gzip_hinted(content_type: Option<&str>, url: &Url) -> bool {
    let by_header = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false);

    by_header || has_gzip_suffix(url)
}

/// Decodes gzip-framed bytes, passing anything else through unchanged
///
/// # Arguments
///
/// * `body` - The response body
/// * `hinted` - Whether headers or the URL suggested gzip content
///
/// # Returns
///
/// * `Ok(Cow::Owned)` - The decompressed bytes
/// * `Ok(Cow::Borrowed)` - The body was not gzip framed
/// * `Err(DocumentError::Gzip)` - The gzip framing is corrupt or the
///   decompressed size exceeds [`MAX_DECOMPRESSED_BYTES`]
pub fn decompress(body: &[u8], hinted: bool) -> DocumentResult<Cow<'_, [u8]>> {
    if !body.starts_with(&GZIP_MAGIC) {
        if hinted {
            tracing::debug!("gzip hinted but body has no gzip framing; using it as-is");
        }
        return Ok(Cow::Borrowed(body));
    }

    let mut decoded = Vec::new();
    MultiGzDecoder::new(body)
        .take(MAX_DECOMPRESSED_BYTES + 1)
        .read_to_end(&mut decoded)
        .map_err(DocumentError::Gzip)?;

    if decoded.len() as u64 > MAX_DECOMPRESSED_BYTES {
        return Err(DocumentError::Gzip(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "decompressed size exceeds {} bytes",
                MAX_DECOMPRESSED_BYTES
            ),
        )));
    }

    tracing::trace!(
        "Decompressed {} bytes into {} bytes",
        body.len(),
        decoded.len()
    );

    Ok(Cow::Owned(decoded))
}
