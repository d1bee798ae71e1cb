use std::path::Path;

use anyhow::Result;

use crate::patterns::load_pattern_file;

/// Exclusion patterns for sibling-game content. Shared lore terms like
/// "Runeterra" are deliberately absent; the main lore pages are curated
/// core content and protected by the default whitelist instead.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    // Game-specific markers in titles
    r"\(Wild_Rift\)",
    r"\(Legends_of_Runeterra\)",
    r"\(Teamfight_Tactics\)",
    r"\(TFT\)",
    // Game-specific paths
    r"/Wild_Rift/",
    r"/Legends_of_Runeterra/",
    r"/Teamfight_Tactics/",
    r"/TFT/",
    r"\w+/TFT$",
    r"Category:Wild_Rift",
    r"Category:Teamfight_Tactics",
    r"Category:TFT",
    r"Category:Legends_of_Runeterra",
    // Valorant content
    r"/Valorant",
    r"Category:Valorant",
];

/// Core pages kept even when a blacklist pattern matches them.
pub const DEFAULT_WHITELIST: &[&str] = &[
    r"/wiki/League_of_Legends$",
    r"/wiki/Champion$",
    r"/wiki/Runeterra$",
];

/// Category patterns, first-match-wins in this order.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("champions", r"/wiki/[\w%']+/LoL$"),
    ("items", r"/wiki/[\w%']+_(item)$|/wiki/Item:"),
    ("runes", r"/wiki/Rune"),
    ("summoner_spells", r"/wiki/Summoner"),
    ("maps", r"/wiki/Map"),
    ("lore", r"/wiki/Runeterra|/wiki/Universe"),
    ("game_modes", r"/wiki/Game_modes|/wiki/Clash|/wiki/ARAM|/wiki/URF"),
];

/// Rule suggestions never propose excluding entries containing these.
pub const PROTECTED_MARKERS: &[&str] = &["Category", "champion"];

/// Compose the effective blacklist: defaults (unless disabled), then
/// command-line patterns, then a pattern file.
pub fn compose_blacklist(
    no_defaults: bool,
    extra: &[String],
    file: Option<&Path>,
) -> Result<Vec<String>> {
    let mut patterns = Vec::new();
    if !no_defaults {
        patterns.extend(DEFAULT_BLACKLIST.iter().map(|p| p.to_string()));
    }
    patterns.extend(extra.iter().cloned());
    if let Some(path) = file {
        patterns.extend(load_pattern_file(path)?);
    }
    Ok(patterns)
}

/// Compose the effective whitelist: defaults (unless disabled), then a
/// pattern file.
pub fn compose_whitelist(no_defaults: bool, file: Option<&Path>) -> Result<Vec<String>> {
    let mut patterns = Vec::new();
    if !no_defaults {
        patterns.extend(DEFAULT_WHITELIST.iter().map(|p| p.to_string()));
    }
    if let Some(path) = file {
        patterns.extend(load_pattern_file(path)?);
    }
    Ok(patterns)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSet;
    use std::io::Write;

    #[test]
    fn defaults_compile() {
        PatternSet::compile(DEFAULT_BLACKLIST.iter().copied()).unwrap();
        PatternSet::compile(DEFAULT_WHITELIST.iter().copied()).unwrap();
        crate::classify::CategorySet::compile(DEFAULT_CATEGORIES.iter().copied()).unwrap();
    }

    #[test]
    fn compose_order_is_defaults_flags_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "/from_file/").unwrap();
        let patterns = compose_blacklist(
            false,
            &["/from_flag/".to_string()],
            Some(file.path()),
        )
        .unwrap();
        assert_eq!(patterns.len(), DEFAULT_BLACKLIST.len() + 2);
        assert_eq!(patterns[DEFAULT_BLACKLIST.len()], "/from_flag/");
        assert_eq!(patterns[DEFAULT_BLACKLIST.len() + 1], "/from_file/");
    }

    #[test]
    fn no_defaults_starts_empty() {
        let patterns = compose_blacklist(true, &[], None).unwrap();
        assert!(patterns.is_empty());
    }
}
