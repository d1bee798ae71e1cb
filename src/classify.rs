use regex::{Regex, RegexBuilder};

use crate::patterns::{PatternError, PatternSet};

/// Result of a whitelist/blacklist pass over a corpus. Both sides keep
/// corpus order.
pub struct Partition {
    pub kept: Vec<String>,
    pub excluded: Vec<String>,
}

/// Partition a corpus with whitelist dominance: a whitelist match is
/// kept without consulting the blacklist at all, a blacklist match is
/// excluded, everything else is kept.
pub fn classify(urls: &[String], whitelist: &PatternSet, blacklist: &PatternSet) -> Partition {
    let mut kept = Vec::new();
    let mut excluded = Vec::new();

    for url in urls {
        if whitelist.is_match(url) {
            kept.push(url.clone());
        } else if blacklist.is_match(url) {
            excluded.push(url.clone());
        } else {
            kept.push(url.clone());
        }
    }

    Partition { kept, excluded }
}

/// Four-bucket diagnostic comparison of two independent pattern sets,
/// with standalone per-pattern match counts for ranking usefulness.
pub struct PairwiseReport {
    pub first_only: Vec<String>,
    pub second_only: Vec<String>,
    pub both: Vec<String>,
    pub neither: Vec<String>,
    pub first_counts: Vec<(String, u64)>,
    pub second_counts: Vec<(String, u64)>,
}

/// Compare two pattern sets over a corpus. No dominance applies here:
/// the buckets are pure set-membership, and every pattern is counted
/// against every URL.
pub fn compare(urls: &[String], first: &PatternSet, second: &PatternSet) -> PairwiseReport {
    let mut first_only = Vec::new();
    let mut second_only = Vec::new();
    let mut both = Vec::new();
    let mut neither = Vec::new();

    for url in urls {
        match (first.is_match(url), second.is_match(url)) {
            (true, false) => first_only.push(url.clone()),
            (false, true) => second_only.push(url.clone()),
            (true, true) => both.push(url.clone()),
            (false, false) => neither.push(url.clone()),
        }
    }

    PairwiseReport {
        first_only,
        second_only,
        both,
        neither,
        first_counts: first.match_counts(urls),
        second_counts: second.match_counts(urls),
    }
}

/// An ordered list of named single-pattern categories. Assignment is
/// first-match-wins in list order, so overlapping patterns resolve by
/// position.
pub struct CategorySet {
    categories: Vec<(String, Regex)>,
}

impl CategorySet {
    pub fn compile<I, N, P>(categories: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let mut compiled = Vec::new();
        for (name, pattern) in categories {
            let pattern = pattern.into();
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| PatternError {
                    pattern: pattern.clone(),
                    source,
                })?;
            compiled.push((name.into(), regex));
        }
        Ok(Self {
            categories: compiled,
        })
    }
}

/// Category assignment for a corpus: one bucket per category (in set
/// order, empty buckets included) plus the uncategorized remainder.
pub struct Categorized {
    pub buckets: Vec<(String, Vec<String>)>,
    pub uncategorized: Vec<String>,
}

pub fn categorize(urls: &[String], categories: &CategorySet) -> Categorized {
    let mut buckets: Vec<(String, Vec<String>)> = categories
        .categories
        .iter()
        .map(|(name, _)| (name.clone(), Vec::new()))
        .collect();
    let mut uncategorized = Vec::new();

    for url in urls {
        let slot = categories
            .categories
            .iter()
            .position(|(_, regex)| regex.is_match(url));
        match slot {
            Some(i) => buckets[i].1.push(url.clone()),
            None => uncategorized.push(url.clone()),
        }
    }

    Categorized {
        buckets,
        uncategorized,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partition_is_exact() {
        let corpus = urls(&[
            "https://x/wiki/Ahri",
            "https://x/Wild_Rift/Ahri",
            "https://x/wiki/Garen",
        ]);
        let blacklist = PatternSet::compile(vec![r"/Wild_Rift/"]).unwrap();
        let partition = classify(&corpus, &PatternSet::empty(), &blacklist);

        assert_eq!(partition.kept.len() + partition.excluded.len(), corpus.len());
        for url in &partition.kept {
            assert!(!partition.excluded.contains(url));
        }
        assert_eq!(partition.kept, urls(&["https://x/wiki/Ahri", "https://x/wiki/Garen"]));
        assert_eq!(partition.excluded, urls(&["https://x/Wild_Rift/Ahri"]));
    }

    #[test]
    fn whitelist_dominates_blacklist() {
        let corpus = urls(&["https://x/wiki/Runeterra"]);
        // The URL matches every blacklist pattern and must still be kept.
        let whitelist = PatternSet::compile(vec![r"/wiki/Runeterra$"]).unwrap();
        let blacklist = PatternSet::compile(vec![r"Runeterra", r"/wiki/", r".*"]).unwrap();
        let partition = classify(&corpus, &whitelist, &blacklist);
        assert_eq!(partition.kept, corpus);
        assert!(partition.excluded.is_empty());
    }

    #[test]
    fn empty_blacklist_is_identity() {
        let corpus = urls(&["https://x/wiki/A", "https://x/wiki/B", "https://x/wiki/A"]);
        let partition = classify(&corpus, &PatternSet::empty(), &PatternSet::empty());
        assert_eq!(partition.kept, corpus);
        assert!(partition.excluded.is_empty());
    }

    #[test]
    fn classify_is_idempotent() {
        let corpus = urls(&[
            "https://x/wiki/Ahri",
            "https://x/TFT/Ahri",
            "https://x/wiki/Champion",
        ]);
        let whitelist = PatternSet::compile(vec![r"/wiki/Champion$"]).unwrap();
        let blacklist = PatternSet::compile(vec![r"/TFT/"]).unwrap();

        let first = classify(&corpus, &whitelist, &blacklist);
        let second = classify(&corpus, &whitelist, &blacklist);
        assert_eq!(first.kept, second.kept);
        assert_eq!(first.excluded, second.excluded);
    }

    #[test]
    fn compare_buckets_are_disjoint_and_cover() {
        let corpus = urls(&[
            "https://x/wiki/Champion",  // whitelist only
            "https://x/TFT/Ahri",       // blacklist only
            "https://x/TFT/Champion",   // both
            "https://x/wiki/Ahri",      // neither
        ]);
        let first = PatternSet::compile(vec![r"Champion"]).unwrap();
        let second = PatternSet::compile(vec![r"/TFT/"]).unwrap();
        let report = compare(&corpus, &first, &second);

        assert_eq!(report.first_only, urls(&["https://x/wiki/Champion"]));
        assert_eq!(report.second_only, urls(&["https://x/TFT/Ahri"]));
        assert_eq!(report.both, urls(&["https://x/TFT/Champion"]));
        assert_eq!(report.neither, urls(&["https://x/wiki/Ahri"]));
        let total = report.first_only.len()
            + report.second_only.len()
            + report.both.len()
            + report.neither.len();
        assert_eq!(total, corpus.len());
    }

    #[test]
    fn compare_counts_ignore_bucket_outcomes() {
        let corpus = urls(&["https://x/TFT/Champion"]);
        let first = PatternSet::compile(vec![r"Champion", r"TFT"]).unwrap();
        let second = PatternSet::compile(vec![r"/TFT/"]).unwrap();
        let report = compare(&corpus, &first, &second);
        // Both first-set patterns counted even though membership
        // short-circuits after the first.
        assert_eq!(
            report.first_counts,
            vec![("Champion".to_string(), 1), ("TFT".to_string(), 1)]
        );
        assert_eq!(report.second_counts, vec![("/TFT/".to_string(), 1)]);
    }

    #[test]
    fn categorize_first_match_wins_in_order() {
        let categories = CategorySet::compile(vec![
            ("lore", r"/wiki/Runeterra"),
            ("runes", r"/wiki/Rune"),
        ])
        .unwrap();
        // Matches both patterns; assignment follows list order.
        let corpus = urls(&["https://x/wiki/Runeterra_map", "https://x/wiki/Rune_page"]);
        let result = categorize(&corpus, &categories);
        assert_eq!(result.buckets[0].0, "lore");
        assert_eq!(result.buckets[0].1, urls(&["https://x/wiki/Runeterra_map"]));
        assert_eq!(result.buckets[1].1, urls(&["https://x/wiki/Rune_page"]));
        assert!(result.uncategorized.is_empty());
    }

    #[test]
    fn categorize_keeps_empty_buckets_and_remainder() {
        let categories =
            CategorySet::compile(vec![("maps", r"/wiki/Map"), ("items", r"/wiki/Item")]).unwrap();
        let corpus = urls(&["https://x/wiki/Ahri"]);
        let result = categorize(&corpus, &categories);
        assert_eq!(result.buckets.len(), 2);
        assert!(result.buckets.iter().all(|(_, urls)| urls.is_empty()));
        assert_eq!(result.uncategorized, corpus);
    }
}
