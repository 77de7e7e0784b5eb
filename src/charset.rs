//! Character set detection and decoding for fetched text
//!
//! Precedence: a byte order mark, then the `charset` parameter of the
//! Content-Type header, then (for XML) the `encoding` of the XML
//! declaration, then UTF-8.

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;

/// Reads the `charset` parameter of a Content-Type header value
///
/// Returns None when there is no parameter or the label is unknown.
///
/// # Examples
///
/// ```
/// use sitemap_checker::charset::charset_from_content_type;
///
/// let latin1 = charset_from_content_type(Some("text/plain; charset=ISO-8859-1")).unwrap();
/// assert_eq!(latin1.name(), "windows-1252");
/// assert!(charset_from_content_type(Some("application/xml")).is_none());
/// ```
pub fn charset_from_content_type(content_type: Option<&str>) -> Option<&'static Encoding> {
    content_type?
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| {
            let label = value.trim().trim_matches(|c| c == '"' || c == '\'');
            let encoding = Encoding::for_label(label.as_bytes());
            if encoding.is_none() {
                tracing::debug!("Unknown charset label '{}'", label);
            }
            encoding
        })
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration
pub fn charset_from_xml_declaration(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            // A declaration readable as ASCII rules out UTF-16
            Encoding::for_label(&label).map(Encoding::output_encoding)
        }
        _ => None,
    }
}

/// Decodes a body strictly in the detected encoding
///
/// A byte order mark wins over `declared`; without either the body is
/// read as UTF-8.
///
/// # Returns
///
/// * `Ok(Cow<str>)` - The decoded text, without any byte order mark
/// * `Err(&'static Encoding)` - The body is not valid in that encoding
pub fn decode_text<'a>(
    bytes: &'a [u8],
    declared: Option<&'static Encoding>,
) -> Result<Cow<'a, str>, &'static Encoding> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared.unwrap_or(UTF_8), bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(encoding)
}

/// Decodes an XML body, falling back to its XML declaration
///
/// `declared` is the charset from the transport, if any.
pub fn decode_xml<'a>(
    bytes: &'a [u8],
    declared: Option<&'static Encoding>,
) -> Result<Cow<'a, str>, &'static Encoding> {
    let declared = declared.or_else(|| charset_from_xml_declaration(bytes));
    decode_text(bytes, declared)
}
