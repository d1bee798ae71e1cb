use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use url::Url;

static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").unwrap());

/// Insertion-ordered frequency table. Ranked views sort by count,
/// highest first, with ties kept in first-encountered order.
#[derive(Default)]
pub struct Counter {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> u64 {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// All entries, highest count first. The sort is stable, so equal
    /// counts keep insertion order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        ranked.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
        ranked
    }

    /// Ranked entries with at least `min` occurrences.
    pub fn above(&self, min: u64) -> Vec<(&str, u64)> {
        self.ranked()
            .into_iter()
            .filter(|&(_, count)| count >= min)
            .collect()
    }
}

impl Serialize for Counter {
    /// Serializes as a map in ranked order, so the JSON document reads
    /// highest-count-first.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in self.ranked() {
            map.serialize_entry(key, &count)?;
        }
        map.end()
    }
}

/// Frequency statistics over a URL corpus. Built once, read-only after.
#[derive(serde::Serialize)]
pub struct PathStats {
    pub total_urls: usize,
    pub domains: Counter,
    /// Segment-indexed structure keys, e.g. `0:wiki/1:Champion`.
    pub structures: Counter,
    /// 2- and 3-segment path prefixes; a deep URL contributes to both.
    pub prefixes: Counter,
    /// Flat per-segment frequency across all positions.
    pub segments: Counter,
    pub extensions: Counter,
    /// Filename token patterns mined from final segments:
    /// `Base(*)`, `*(Inner)`, and `First_*`.
    pub name_patterns: Counter,
}

/// The path component of a URL: after the authority, before any query
/// or fragment. A string with no authority is treated as a bare path.
pub fn url_path(url: &str) -> &str {
    let path = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => url,
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Path split on `/` with empty segments removed.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Build every frequency table in one pass over the corpus.
pub fn analyze(urls: &[String]) -> PathStats {
    let mut stats = PathStats {
        total_urls: urls.len(),
        domains: Counter::new(),
        structures: Counter::new(),
        prefixes: Counter::new(),
        segments: Counter::new(),
        extensions: Counter::new(),
        name_patterns: Counter::new(),
    };

    for url in urls {
        if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
            stats.domains.bump(&host);
        }

        let segs = segments(url_path(url));
        if segs.is_empty() {
            continue;
        }

        let structure = segs
            .iter()
            .enumerate()
            .map(|(i, seg)| format!("{i}:{seg}"))
            .collect::<Vec<_>>()
            .join("/");
        stats.structures.bump(&structure);

        if segs.len() >= 2 {
            stats.prefixes.bump(&segs[..2].join("/"));
            if segs.len() >= 3 {
                stats.prefixes.bump(&segs[..3].join("/"));
            }
        }

        for seg in &segs {
            stats.segments.bump(seg);
        }

        let name = segs[segs.len() - 1];
        if let Some((_, ext)) = name.rsplit_once('.') {
            if !ext.is_empty() {
                stats.extensions.bump(ext);
            }
        }
        mine_name_patterns(name, &mut stats.name_patterns);
    }

    stats
}

/// Derive wildcard patterns from a final path segment.
fn mine_name_patterns(name: &str, table: &mut Counter) {
    if name.contains('(') && name.contains(')') {
        let base = name.split('(').next().unwrap_or("").trim_end_matches('_');
        table.bump(&format!("{base}(*)"));
        if let Some(caps) = PARENS_RE.captures(name) {
            table.bump(&format!("*({})", &caps[1]));
        }
    }

    if name.contains('_') && name.split('_').count() > 2 {
        let first = name.split('_').next().unwrap_or("");
        table.bump(&format!("{first}_*"));
    }
}

/// A ready-to-use exclusion pattern derived from a frequency table.
pub struct Suggestion {
    pub pattern: String,
    pub count: u64,
}

const SUGGESTION_CAP: usize = 30;

/// Translate the top prefix-chain and filename-pattern entries above
/// `min_count` into exclusion-pattern text. Entries containing a
/// protected marker are skipped so suggestions never propose excluding
/// curated core content.
pub fn suggest_exclusions(stats: &PathStats, min_count: u64, protected: &[String]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (prefix, count) in stats.prefixes.above(min_count).into_iter().take(SUGGESTION_CAP) {
        if is_protected(prefix, protected) {
            continue;
        }
        if let Some(last) = prefix.rsplit('/').next() {
            suggestions.push(Suggestion {
                pattern: format!("/wiki/{last}/"),
                count,
            });
        }
    }

    for (pattern, count) in stats
        .name_patterns
        .above(min_count)
        .into_iter()
        .take(SUGGESTION_CAP)
    {
        if is_protected(pattern, protected) {
            continue;
        }
        if pattern.contains("(*)") {
            let base = pattern.split('(').next().unwrap_or("");
            if base.len() > 2 {
                suggestions.push(Suggestion {
                    pattern: format!(r"/wiki/{base}\(.*\)"),
                    count,
                });
            }
        } else if pattern.contains("_*") {
            let base = pattern.split('_').next().unwrap_or("");
            if base.len() > 2 {
                suggestions.push(Suggestion {
                    pattern: format!("/wiki/{base}_"),
                    count,
                });
            }
        }
    }

    suggestions
}

fn is_protected(key: &str, protected: &[String]) -> bool {
    let key = key.to_lowercase();
    protected.iter().any(|marker| key.contains(&marker.to_lowercase()))
}

// ── Tests ──
