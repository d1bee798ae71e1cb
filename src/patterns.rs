use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A configured pattern failed to compile. Classification never starts
/// with a half-built set, so this aborts the run at load time.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// An ordered set of compiled, case-insensitive regex patterns.
#[derive(Debug)]
pub struct PatternSet {
    patterns: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Compile every pattern up front. Order is preserved; it affects
    /// which pattern is reported first, not classification outcomes.
    pub fn compile<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| PatternError {
                    pattern: pattern.clone(),
                    source,
                })?;
            compiled.push((pattern, regex));
        }
        Ok(Self { patterns: compiled })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True iff any pattern matches anywhere in the URL. Short-circuits.
    pub fn is_match(&self, url: &str) -> bool {
        self.patterns.iter().any(|(_, regex)| regex.is_match(url))
    }

    /// All pattern strings matching the URL. Tests every pattern, since
    /// callers want the full match set, not just existence.
    pub fn matching(&self, url: &str) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(url))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    /// Standalone match frequency per pattern over a corpus: every
    /// pattern is tested against every URL, regardless of what other
    /// patterns matched. Returned in set order.
    pub fn match_counts(&self, urls: &[String]) -> Vec<(String, u64)> {
        self.patterns
            .iter()
            .map(|(source, regex)| {
                let count = urls.iter().filter(|url| regex.is_match(url)).count() as u64;
                (source.clone(), count)
            })
            .collect()
    }
}

/// Read patterns from a file, one per line. Blank lines and `#` comments
/// are skipped.
pub fn load_pattern_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

// ── Tests ──
