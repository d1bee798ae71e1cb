use std::collections::BTreeSet;

use crate::analyze::{segments, url_path, Counter};

const COLLECTION_TERMS: &[&str] = &["collection", "group", "series", "set", "related", "overview"];
const ADMIN_TERMS: &[&str] = &["admin", "policy", "guideline", "rules", "help", "sandbox"];
const ORGANIZATIONAL_TERMS: &[&str] = &[
    "navigation",
    "redirect",
    "table_of_contents",
    "toc",
    "sitemap",
    "contents",
    "directory",
    "glossary",
    "terminology",
    "classifications",
    "catalog",
];

/// Exclusion patterns worth considering whenever organizational pages
/// show up in a corpus.
pub const SUGGESTED_EXCLUSIONS: &[&str] = &[
    r"/wiki/.*\(disambiguation\)",
    r"/wiki/List_of_",
    r"/wiki/.*_index",
    r"/wiki/.*_list",
    r"/wiki/.*_collection",
    r"/wiki/.*_overview",
    r"/wiki/.*_catalog",
    r"/wiki/.*_directory",
    r"/wiki/.*_glossary",
];

/// Structural indicators of organizational (non-content) pages. A page
/// name can land in several buckets.
const BUCKET_NAMES: &[&str] = &[
    "disambiguation",
    "list_pages",
    "index_pages",
    "category_pages",
    "collection_pages",
    "admin_pages",
    "stub_pages",
    "template_pages",
    "portal_pages",
    "organizational",
];

pub struct OrgReport {
    /// Bucket name to matching URLs, in fixed bucket order.
    pub buckets: Vec<(&'static str, Vec<String>)>,
    /// Sorted union of every bucketed URL.
    pub all: Vec<String>,
    /// Path patterns deeper than two segments.
    pub deep_paths: Counter,
}

/// Scan a corpus for organizational pages by page-name indicators.
pub fn scan(urls: &[String]) -> OrgReport {
    let mut buckets: Vec<(&'static str, Vec<String>)> =
        BUCKET_NAMES.iter().map(|&name| (name, Vec::new())).collect();
    let mut union: BTreeSet<String> = BTreeSet::new();
    let mut deep_paths = Counter::new();

    for url in urls {
        let path = url_path(url);
        let name = path.rsplit('/').next().unwrap_or("");
        let lower = name.to_lowercase();
        let mut matched = false;

        let mut hit = |buckets: &mut Vec<(&'static str, Vec<String>)>, slot: usize| {
            buckets[slot].1.push(url.clone());
            matched = true;
        };

        if name.contains("(disambiguation)") || name.contains("_disambiguation") {
            hit(&mut buckets, 0);
        }
        if name.starts_with("List_of_") || lower.contains("_list") || path.contains("/List_") {
            hit(&mut buckets, 1);
        }
        if name.ends_with("_index") || name.starts_with("Index_of_") || name.contains("_index_") {
            hit(&mut buckets, 2);
        }
        if name.starts_with("Category:")
            || lower.contains("_category")
            || lower.contains("_categories")
        {
            hit(&mut buckets, 3);
        }
        if COLLECTION_TERMS.iter().any(|t| lower.contains(t)) {
            hit(&mut buckets, 4);
        }
        if ADMIN_TERMS.iter().any(|t| lower.contains(t)) {
            hit(&mut buckets, 5);
        }
        if lower.contains("_stub") || lower.contains("stub_") {
            hit(&mut buckets, 6);
        }
        if name.starts_with("Template:") || lower.contains("_template") {
            hit(&mut buckets, 7);
        }
        if name.starts_with("Portal:") || lower.contains("portal_") || lower.contains("_portal") {
            hit(&mut buckets, 8);
        }
        if ORGANIZATIONAL_TERMS.iter().any(|t| lower.contains(t)) {
            hit(&mut buckets, 9);
        }

        if matched {
            union.insert(url.clone());
        }

        let segs = segments(path);
        if segs.len() > 2 {
            for depth in 3..=segs.len() {
                deep_paths.bump(&segs[..depth].join("/"));
            }
        }
    }

    OrgReport {
        buckets,
        all: union.into_iter().collect(),
        deep_paths,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    fn bucket<'a>(report: &'a OrgReport, name: &str) -> &'a Vec<String> {
        &report.buckets.iter().find(|(n, _)| *n == name).unwrap().1
    }

    #[test]
    fn page_names_land_in_matching_buckets() {
        let report = scan(&urls(&[
            "https://x/wiki/Ahri_(disambiguation)",
            "https://x/wiki/List_of_champions",
            "https://x/wiki/Category:Skins",
            "https://x/wiki/Template:Infobox",
            "https://x/wiki/Ahri",
        ]));
        assert_eq!(bucket(&report, "disambiguation").len(), 1);
        assert_eq!(bucket(&report, "list_pages").len(), 1);
        assert_eq!(bucket(&report, "category_pages").len(), 1);
        assert_eq!(bucket(&report, "template_pages").len(), 1);
        assert_eq!(report.all.len(), 4);
    }

    #[test]
    fn one_page_can_match_several_buckets() {
        let report = scan(&urls(&["https://x/wiki/List_of_champion_categories"]));
        assert_eq!(bucket(&report, "list_pages").len(), 1);
        assert_eq!(bucket(&report, "category_pages").len(), 1);
        // The union counts it once.
        assert_eq!(report.all.len(), 1);
    }

    #[test]
    fn content_pages_stay_out() {
        let report = scan(&urls(&["https://x/wiki/Ahri", "https://x/wiki/Garen"]));
        assert!(report.all.is_empty());
        assert!(report.buckets.iter().all(|(_, urls)| urls.is_empty()));
    }

    #[test]
    fn deep_paths_counted_beyond_two_segments() {
        let report = scan(&urls(&[
            "https://x/wiki/Champion/LoL/History",
            "https://x/wiki/Champion/LoL/History",
            "https://x/wiki/Ahri",
        ]));
        assert_eq!(report.deep_paths.get("wiki/Champion/LoL"), 2);
        assert_eq!(report.deep_paths.get("wiki/Champion/LoL/History"), 2);
        assert_eq!(report.deep_paths.get("wiki/Ahri"), 0);
    }
}
