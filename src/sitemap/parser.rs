//! Sitemap and feed XML parsing
//!
//! Parsing is a single pass over quick-xml events. The root element is
//! classified first; the classification picks which elements are collected.
//! Element names are compared by local name, so `image:loc` inside
//! `<image:image>` and a plain `<loc>` are told apart by their parent.

use crate::charset::decode_xml;
use crate::sitemap::types::{ParsedSitemap, SitemapEntry, SitemapFormat, SitemapNode};
use crate::{DocumentError, DocumentResult};
use encoding_rs::Encoding;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parses a decoded sitemap, sitemap index, RSS or Atom document
///
/// # Arguments
///
/// * `bytes` - The document body after decompression
///
/// # Returns
///
/// * `Ok(ParsedSitemap)` - The classified document
/// * `Err(DocumentError)` - The document does not decode in its encoding,
///   is not well-formed XML, has no root element, or has an unknown root
///   element
///
/// # Example
///
/// ```
/// use sitemap_checker::sitemap::{parse_sitemap, SitemapNode};
///
/// let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://example.com/page1</loc></url>
/// </urlset>"#;
///
/// let parsed = parse_sitemap(xml).unwrap();
/// assert!(matches!(parsed.node, SitemapNode::UrlSet(ref entries) if entries.len() == 1));
/// ```
pub fn parse_sitemap(bytes: &[u8]) -> DocumentResult<ParsedSitemap> {
    parse_sitemap_with_charset(bytes, None)
}

/// Parses a sitemap whose transport declared a charset
///
/// A byte order mark overrides `charset`; without either, the `encoding`
/// of the XML declaration applies, then UTF-8.
pub fn parse_sitemap_with_charset(
    bytes: &[u8],
    charset: Option<&'static Encoding>,
) -> DocumentResult<ParsedSitemap> {
    let text = decode_xml(bytes, charset)
        .map_err(|encoding| DocumentError::Encoding(encoding.name().to_string()))?;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut builder: Option<DocumentBuilder> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut text_buf = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                match builder.as_mut() {
                    None => builder = Some(DocumentBuilder::for_root(&name)?),
                    Some(b) => b.start(&stack, &name, &e)?,
                }
                stack.push(name);
                text_buf.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                match builder.as_mut() {
                    None => builder = Some(DocumentBuilder::for_root(&name)?),
                    Some(b) => {
                        b.start(&stack, &name, &e)?;
                        b.end(&stack, &name, "");
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let (Some(b), Some(name)) = (builder.as_mut(), stack.pop()) {
                    b.end(&stack, &name, text_buf.trim());
                }
                text_buf.clear();
            }
            Ok(Event::Text(e)) => {
                if builder.is_some() {
                    let text = e
                        .unescape()
                        .map_err(|e| DocumentError::Xml(e.to_string()))?;
                    text_buf.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if builder.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Xml(format!(
                    "{} at byte {}",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocumentError::Xml(format!(
            "unexpected end of document inside <{}>",
            stack.join("/")
        )));
    }

    builder.map(DocumentBuilder::finish).ok_or(DocumentError::MissingRoot)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Accumulates entries for one classified document
struct DocumentBuilder {
    format: SitemapFormat,
    children: Vec<String>,
    entries: Vec<SitemapEntry>,
    current: Option<SitemapEntry>,
}

impl DocumentBuilder {
    fn for_root(root: &str) -> DocumentResult<Self> {
        let format = SitemapFormat::from_root(root)
            .ok_or_else(|| DocumentError::UnexpectedRoot(root.to_string()))?;

        Ok(Self {
            format,
            children: Vec::new(),
            entries: Vec::new(),
            current: None,
        })
    }

    /// Name of the element wrapping one entry for this format
    fn entry_element(&self) -> &'static str {
        match self.format {
            SitemapFormat::Index => "sitemap",
            SitemapFormat::UrlSet => "url",
            SitemapFormat::Rss => "item",
            SitemapFormat::Atom => "entry",
        }
    }

    fn start(&mut self, parents: &[String], name: &str, e: &BytesStart<'_>) -> DocumentResult<()> {
        if name == self.entry_element() {
            self.current = Some(SitemapEntry::default());
            return Ok(());
        }

        // Atom links carry the location in an attribute
        if self.format == SitemapFormat::Atom && name == "link" && parent_is(parents, "entry") {
            if let Some(entry) = self.current.as_mut() {
                let rel = attribute(e, "rel")?;
                let is_alternate = rel.as_deref().map_or(true, |rel| rel == "alternate");
                if is_alternate && entry.loc.is_empty() {
                    if let Some(href) = attribute(e, "href")? {
                        entry.loc = href;
                    }
                }
            }
        }

        Ok(())
    }

    fn end(&mut self, parents: &[String], name: &str, text: &str) {
        if name == self.entry_element() {
            if let Some(entry) = self.current.take() {
                self.push_entry(entry);
            }
            return;
        }

        let Some(entry) = self.current.as_mut() else {
            return;
        };
        let Some(parent) = parents.last().map(String::as_str) else {
            return;
        };

        if text.is_empty() {
            return;
        }

        match (self.format, parent, name) {
            (SitemapFormat::Index, "sitemap", "loc") | (SitemapFormat::UrlSet, "url", "loc") => {
                entry.loc = text.to_string();
            }
            (SitemapFormat::UrlSet, "url", "lastmod") => {
                entry.lastmod = Some(text.to_string());
            }
            (SitemapFormat::UrlSet, "url", "changefreq") => {
                entry.changefreq = text.parse().ok();
            }
            (SitemapFormat::UrlSet, "url", "priority") => {
                entry.priority = text.parse::<f32>().ok().map(|p| p.clamp(0.0, 1.0));
            }
            (SitemapFormat::UrlSet, "image", "loc") => {
                entry.extensions.image_locations.push(text.to_string());
            }
            (SitemapFormat::UrlSet, "video", "thumbnail_loc") => {
                entry.extensions.video_thumbnails.push(text.to_string());
            }
            (SitemapFormat::UrlSet, "news", "publication_date") => {
                entry.extensions.news_publication_date = Some(text.to_string());
            }
            (SitemapFormat::UrlSet, "news", "title") => {
                entry.extensions.news_title = Some(text.to_string());
            }
            (SitemapFormat::Rss, "item", "link") if entry.loc.is_empty() => {
                entry.loc = text.to_string();
            }
            (SitemapFormat::Rss, "item", "pubDate" | "date") => {
                entry.lastmod = Some(text.to_string());
            }
            (SitemapFormat::Atom, "entry", "updated") => {
                entry.lastmod = Some(text.to_string());
            }
            _ => {}
        }
    }

    fn push_entry(&mut self, entry: SitemapEntry) {
        if entry.loc.trim().is_empty() {
            tracing::debug!("Skipping {} entry without a location", self.format);
            return;
        }

        match self.format {
            SitemapFormat::Index => self.children.push(entry.loc),
            _ => self.entries.push(entry),
        }
    }

    fn finish(self) -> ParsedSitemap {
        let node = match self.format {
            SitemapFormat::Index => SitemapNode::Index(self.children),
            _ => SitemapNode::UrlSet(self.entries),
        };

        ParsedSitemap {
            format: self.format,
            node,
        }
    }
}

fn parent_is(parents: &[String], name: &str) -> bool {
    parents.last().map_or(false, |p| p == name)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> DocumentResult<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|e| DocumentError::Xml(e.to_string()))?;

    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| DocumentError::Xml(e.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}
