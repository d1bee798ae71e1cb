use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Reader};
use tracing::{debug, warn};

const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";
const NEWS_NS: &[u8] = b"http://www.google.com/schemas/sitemap-news/0.9";

/// Which shape of sitemap document to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<sitemapindex>` listing child sitemaps under `sitemap/loc`.
    Index,
    /// `<urlset>` listing page URLs under `url/loc`.
    UrlSet,
}

impl SitemapKind {
    fn parent_tag(self) -> &'static [u8] {
        match self {
            SitemapKind::Index => b"sitemap",
            SitemapKind::UrlSet => b"url",
        }
    }
}

/// Extract `loc` values from a sitemap document.
///
/// Tries parse strategies in order until one yields a non-empty result:
/// namespace-aware structural parse, the same query without namespaces,
/// then a lenient walk that accepts any `loc` element and skips syntax
/// errors. Returns an empty Vec (with a warning) if every strategy
/// comes up empty; never fails the caller.
pub fn read_locs(xml: &str, kind: SitemapKind) -> Vec<String> {
    let locs = parse_structured(xml, kind, true);
    if !locs.is_empty() {
        return locs;
    }
    debug!("Namespaced parse found nothing, retrying without namespaces");

    let locs = parse_structured(xml, kind, false);
    if !locs.is_empty() {
        return locs;
    }
    debug!("Structural parse found nothing, falling back to lenient walk");

    let locs = parse_lenient(xml, kind);
    if locs.is_empty() {
        warn!("No loc entries extracted from document ({} bytes)", xml.len());
    }
    locs
}

/// Structural parse: `sitemap/loc` or `url/loc` pairs only.
///
/// With `require_ns`, elements must resolve to the sitemap namespace
/// (the Google News namespace is accepted as a secondary). Stops at the
/// first syntax error, returning whatever was collected.
fn parse_structured(xml: &str, kind: SitemapKind, require_ns: bool) -> Vec<String> {
    let mut reader = NsReader::from_str(xml);
    let parent_tag = kind.parent_tag();

    let mut locs = Vec::new();
    let mut in_parent = false;
    let mut in_loc = false;
    let mut text = String::new();

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                if require_ns && !ns_allowed(&ns) {
                    continue;
                }
                let name = e.local_name();
                if name.as_ref() == parent_tag {
                    in_parent = true;
                } else if name.as_ref() == b"loc" && in_parent {
                    in_loc = true;
                    text.clear();
                }
            }
            Ok((_, Event::Text(e))) if in_loc => match e.unescape() {
                Ok(t) => text.push_str(&t),
                Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
            },
            Ok((_, Event::CData(e))) if in_loc => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok((_, Event::End(e))) => {
                let name = e.local_name();
                if name.as_ref() == b"loc" && in_loc {
                    in_loc = false;
                    let loc = text.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                } else if name.as_ref() == parent_tag {
                    in_parent = false;
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => {
                debug!("Structural parse stopped: {}", e);
                break;
            }
            _ => {}
        }
    }
    locs
}

fn ns_allowed(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Bound(ns) => ns.as_ref() == SITEMAP_NS || ns.as_ref() == NEWS_NS,
        _ => false,
    }
}

/// Lenient walk: collect any `loc` element anywhere in the tree.
///
/// In urlset mode a `loc` directly under a `sitemap` element is an index
/// entry and is skipped, since both document shapes share the tag name.
/// Syntax errors are skipped by resyncing at the next `<`; extraction
/// continues with whatever structurally valid fragments remain.
fn parse_lenient(xml: &str, kind: SitemapKind) -> Vec<String> {
    let mut locs = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut input = xml;

    'resync: loop {
        let mut reader = Reader::from_str(input);
        reader.config_mut().check_end_names = false;
        let mut text: Option<String> = None;

        loop {
            let pos_before = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(e.local_name().as_ref().to_vec());
                    if e.local_name().as_ref() == b"loc" {
                        text = Some(String::new());
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(t) = text.as_mut() {
                        match e.unescape() {
                            Ok(s) => t.push_str(&s),
                            Err(_) => t.push_str(&String::from_utf8_lossy(&e)),
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(t) = text.as_mut() {
                        t.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"loc" {
                        if let Some(t) = text.take() {
                            let loc = t.trim();
                            let parent_is_sitemap = stack
                                .iter()
                                .rev()
                                .nth(1)
                                .is_some_and(|p| p.as_slice() == b"sitemap");
                            let keep = match kind {
                                SitemapKind::Index => true,
                                SitemapKind::UrlSet => !parent_is_sitemap,
                            };
                            if keep && !loc.is_empty() {
                                locs.push(loc.to_string());
                            }
                        }
                    }
                    if stack.last().is_some_and(|top| top == e.local_name().as_ref()) {
                        stack.pop();
                    }
                }
                Ok(Event::Eof) => break 'resync,
                Err(e) => {
                    debug!("Skipping invalid XML fragment: {}", e);
                    text = None;
                    // Resync at the next tag after the failing byte.
                    let failed_at = (reader.buffer_position() as usize)
                        .max(pos_before as usize + 1)
                        .min(input.len());
                    match input.as_bytes()[failed_at..].iter().position(|&b| b == b'<') {
                        Some(i) => {
                            input = &input[failed_at + i..];
                            continue 'resync;
                        }
                        None => break 'resync,
                    }
                }
                _ => {}
            }
        }
    }
    locs
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const NS_INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://wiki.example.com/sitemap-1.xml</loc></sitemap>
  <sitemap><loc>https://wiki.example.com/sitemap-2.xml</loc></sitemap>
</sitemapindex>"#;

    const NS_URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://wiki.example.com/wiki/Ahri</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://wiki.example.com/wiki/Garen</loc></url>
</urlset>"#;

    const PLAIN_URLSET: &str = r#"<urlset>
  <url><loc>https://wiki.example.com/wiki/Ahri</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://wiki.example.com/wiki/Garen</loc></url>
</urlset>"#;

    #[test]
    fn namespaced_index() {
        let locs = read_locs(NS_INDEX, SitemapKind::Index);
        assert_eq!(
            locs,
            vec![
                "https://wiki.example.com/sitemap-1.xml",
                "https://wiki.example.com/sitemap-2.xml"
            ]
        );
    }

    #[test]
    fn namespaced_urlset() {
        let locs = read_locs(NS_URLSET, SitemapKind::UrlSet);
        assert_eq!(
            locs,
            vec![
                "https://wiki.example.com/wiki/Ahri",
                "https://wiki.example.com/wiki/Garen"
            ]
        );
    }

    #[test]
    fn missing_namespace_matches_namespaced_result() {
        let namespaced = read_locs(NS_URLSET, SitemapKind::UrlSet);
        let plain = read_locs(PLAIN_URLSET, SitemapKind::UrlSet);
        assert_eq!(namespaced, plain);
    }

    #[test]
    fn index_entries_excluded_from_urlset_mode() {
        // No url/loc structure at all, so the lenient walk runs; the loc
        // under sitemap must still be recognized as an index entry.
        let xml = r#"<root>
  <sitemap><loc>https://wiki.example.com/sitemap-1.xml</loc></sitemap>
  <page><loc>https://wiki.example.com/wiki/Ahri</loc></page>
</root>"#;
        let locs = read_locs(xml, SitemapKind::UrlSet);
        assert_eq!(locs, vec!["https://wiki.example.com/wiki/Ahri"]);
    }

    #[test]
    fn lenient_index_takes_any_loc() {
        let xml =
            r#"<index><entry><loc>https://wiki.example.com/sitemap-1.xml</loc></entry></index>"#;
        let locs = read_locs(xml, SitemapKind::Index);
        assert_eq!(locs, vec!["https://wiki.example.com/sitemap-1.xml"]);
    }

    #[test]
    fn malformed_prefix_with_valid_tail() {
        let xml = r#"<<<garbage>>> not xml at all
<url><loc>https://wiki.example.com/wiki/Ahri</loc></url>"#;
        let locs = read_locs(xml, SitemapKind::UrlSet);
        assert_eq!(locs, vec!["https://wiki.example.com/wiki/Ahri"]);
    }

    #[test]
    fn malformed_middle_keeps_surviving_entry() {
        let xml = r#"<urlset>
  <url><loc https://wiki.example.com/wiki/Ahri</url>
  <url><loc>https://wiki.example.com/wiki/Garen</loc></url>
</urlset>"#;
        let locs = read_locs(xml, SitemapKind::UrlSet);
        assert!(locs.contains(&"https://wiki.example.com/wiki/Garen".to_string()));
    }

    #[test]
    fn total_garbage_is_empty_not_fatal() {
        let locs = read_locs("complete nonsense, no tags", SitemapKind::UrlSet);
        assert!(locs.is_empty());
    }

    #[test]
    fn whitespace_around_loc_text_trimmed() {
        let xml = "<urlset><url><loc>\n  https://wiki.example.com/wiki/Ahri\n</loc></url></urlset>";
        let locs = read_locs(xml, SitemapKind::UrlSet);
        assert_eq!(locs, vec!["https://wiki.example.com/wiki/Ahri"]);
    }

    #[test]
    fn empty_loc_skipped() {
        let xml = "<urlset><url><loc></loc></url><url><loc>https://x/a</loc></url></urlset>";
        let locs = read_locs(xml, SitemapKind::UrlSet);
        assert_eq!(locs, vec!["https://x/a"]);
    }
}
