use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analyze::Suggestion;

/// Write one record per line. Output-stage IO errors always propagate.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write `pattern: N matches` lines, highest count first.
pub fn write_match_counts(path: &Path, counts: &[(String, u64)]) -> Result<()> {
    let mut ranked: Vec<&(String, u64)> = counts.iter().collect();
    ranked.sort_by_key(|entry| std::cmp::Reverse(entry.1));
    let lines: Vec<String> = ranked
        .iter()
        .map(|(pattern, count)| format!("{pattern}: {count} matches"))
        .collect();
    write_lines(path, &lines)
}

/// Write a ranked frequency table with a heading line.
pub fn write_ranked(path: &Path, heading: &str, entries: &[(&str, u64)]) -> Result<()> {
    let mut lines = vec![heading.to_string(), String::new()];
    lines.extend(entries.iter().map(|(key, count)| format!("{key}: {count}")));
    write_lines(path, &lines)
}

/// Write suggested exclusion patterns as a loadable pattern file; the
/// count rides along as a trailing comment.
pub fn write_suggestions(path: &Path, heading: &str, suggestions: &[Suggestion]) -> Result<()> {
    let mut lines = vec![format!("# {heading}"), String::new()];
    lines.extend(
        suggestions
            .iter()
            .map(|s| format!("{}  # {} URLs", s.pattern, s.count)),
    );
    write_lines(path, &lines)
}

/// Serialize a report as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Counter;

    #[test]
    fn lines_written_one_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        write_lines(&path, &["https://x/wiki/A", "https://x/wiki/B"]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "https://x/wiki/A\nhttps://x/wiki/B\n");
    }

    #[test]
    fn match_counts_ranked_descending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        write_match_counts(
            &path,
            &[("rare".to_string(), 1), ("common".to_string(), 9)],
        )
        .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "common: 9 matches\nrare: 1 matches\n");
    }

    #[test]
    fn json_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let mut counter = Counter::new();
        counter.bump("wiki/Champion");
        counter.bump("wiki/Champion");
        write_json(&path, &counter).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["wiki/Champion"], 2);
    }

    #[test]
    fn missing_directory_propagates_error() {
        let err = write_lines(Path::new("/nonexistent-dir/urls.txt"), &["a"]).unwrap_err();
        assert!(err.to_string().contains("urls.txt"));
    }
}
