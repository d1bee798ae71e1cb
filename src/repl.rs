use std::io::{self, Write};

use anyhow::Result;
use rand::seq::IndexedRandom;
use url::Url;

use crate::analyze::{segments, url_path};
use crate::patterns::PatternSet;

/// Interactively grow a blacklist by examining sample URLs. Pure
/// terminal collaborator: pattern validation and match counting go
/// through the core matcher, never ad-hoc regex handling here.
pub fn build_blacklist(urls: &[String], initial: Vec<String>) -> Result<Vec<String>> {
    let mut patterns = initial;

    if !patterns.is_empty() {
        println!("\nExisting blacklist patterns:");
        for (i, pattern) in patterns.iter().enumerate() {
            println!("  {}. {}", i + 1, pattern);
        }
    }

    let answer = prompt("\nHow many sample URLs would you like to examine? (default: 20)\n> ")?;
    let sample_size = answer.parse().unwrap_or(20).min(urls.len());

    let answer = prompt("\nWould you like to search for specific terms in the URLs? (y/n)\n> ")?;
    if answer.eq_ignore_ascii_case("y") {
        search_mode(urls, &mut patterns)?;
    }

    let mut rng = rand::rng();
    let sample: Vec<&String> = urls.choose_multiple(&mut rng, sample_size).collect();

    println!("\nExamining {} sample URLs to build blacklist patterns:", sample.len());
    for (i, url) in sample.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, sample.len(), url);

        let compiled = PatternSet::compile(patterns.clone())?;
        let matched = compiled.matching(url);
        if !matched.is_empty() {
            println!("  Already matched by patterns: {}", matched.join(", "));
            continue;
        }

        let path = url_path(url);
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                println!("  Domain: {host}");
            }
        }
        println!("  Path: {path}");
        let suggestion = segments(path)
            .last()
            .map(|name| regex::escape(name))
            .unwrap_or_default();
        if !suggestion.is_empty() {
            println!("  Last path component: {}", segments(path).last().unwrap());
        }

        let response =
            prompt("Blacklist this URL? [y/n/p/s/q] (p=add pattern, s=skip rest, q=quit): ")?
                .to_lowercase();
        match response.as_str() {
            "y" => {
                let entered = prompt(&format!(
                    "Enter regex pattern to match this URL [default: {suggestion}]: "
                ))?;
                let candidate = if entered.is_empty() { suggestion } else { entered };
                if !candidate.is_empty() {
                    try_add(&mut patterns, candidate, urls);
                }
            }
            "p" => {
                let candidate = prompt("Enter regex pattern to add to blacklist: ")?;
                if !candidate.is_empty() {
                    try_add(&mut patterns, candidate, urls);
                }
            }
            "s" => {
                println!("Skipping remaining URLs...");
                break;
            }
            "q" => break,
            _ => {}
        }
    }

    Ok(patterns)
}

/// Term-search loop: show where a term appears and offer to turn it
/// into a pattern.
fn search_mode(urls: &[String], patterns: &mut Vec<String>) -> Result<()> {
    loop {
        let term = prompt("Enter term to search (or 'q' to quit search mode): ")?;
        if term.eq_ignore_ascii_case("q") {
            break;
        }

        let needle = term.to_lowercase();
        let matching: Vec<&String> = urls
            .iter()
            .filter(|url| url.to_lowercase().contains(&needle))
            .collect();
        println!("Found {} URLs containing '{}'", matching.len(), term);
        if matching.is_empty() {
            continue;
        }

        println!("\nShowing {} examples:", matching.len().min(5));
        for (i, url) in matching.iter().take(5).enumerate() {
            println!("  {}. {}", i + 1, url);
        }

        let answer = prompt(&format!(
            "\nWould you like to add a blacklist pattern for '{term}'? (y/n)\n> "
        ))?;
        if answer.eq_ignore_ascii_case("y") {
            let default = regex::escape(&term);
            let entered = prompt(&format!("Enter regex pattern [default: {default}]: "))?;
            let candidate = if entered.is_empty() { default } else { entered };
            try_add(patterns, candidate, urls);
        }
    }
    Ok(())
}

/// Validate a candidate through the core matcher; on success report how
/// much of the corpus it would exclude.
fn try_add(patterns: &mut Vec<String>, candidate: String, urls: &[String]) {
    match PatternSet::compile(vec![candidate.clone()]) {
        Ok(set) => {
            let matches = urls.iter().filter(|url| set.is_match(url)).count();
            let percent = if urls.is_empty() {
                0.0
            } else {
                matches as f64 / urls.len() as f64 * 100.0
            };
            println!("Added pattern: {candidate}");
            println!("This pattern would match {matches} URLs ({percent:.2}% of total)");
            patterns.push(candidate);
        }
        Err(e) => println!("Invalid regex pattern: {e}"),
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ── Tests ──
