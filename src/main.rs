mod analyze;
mod classify;
mod config;
mod corpus;
mod fetch;
mod organize;
mod output;
mod patterns;
mod repl;
mod sitemap;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use patterns::PatternSet;

#[derive(Parser)]
#[command(name = "sitemap_filter", about = "Filter and analyze wiki sitemap URL corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a sitemap index and write kept/excluded URL lists
    Filter {
        /// Path to the sitemap index XML file
        sitemap_index: PathBuf,
        /// Directory for downloaded sitemaps and results
        #[arg(short = 'o', long, default_value = "filtered_sitemaps")]
        output_dir: PathBuf,
        /// Additional blacklist pattern (repeatable)
        #[arg(short = 'b', long = "blacklist", value_name = "PATTERN")]
        blacklist: Vec<String>,
        /// File of blacklist patterns, one per line
        #[arg(long)]
        blacklist_file: Option<PathBuf>,
        /// File of whitelist patterns, one per line
        #[arg(long)]
        whitelist_file: Option<PathBuf>,
        /// Skip the default blacklist patterns
        #[arg(long)]
        no_default_blacklist: bool,
        /// Skip the default whitelist patterns
        #[arg(long)]
        no_default_whitelist: bool,
        /// Interactively build blacklist patterns from corpus samples
        #[arg(short = 'i', long)]
        interactive: bool,
        /// Group kept URLs by category and write one file per category
        #[arg(long)]
        url_categories: bool,
    },
    /// Aggregate a sitemap index and compute URL statistics
    Analyze {
        /// Path to the sitemap index XML file
        sitemap_index: PathBuf,
        /// Directory for downloaded sitemaps and results
        #[arg(short = 'o', long, default_value = "filtered_sitemaps")]
        output_dir: PathBuf,
        /// Show and save URLs containing this term
        #[arg(long)]
        search_term: Option<String>,
    },
    /// Compare whitelist and blacklist matching over the corpus
    Compare {
        /// Path to the sitemap index XML file
        sitemap_index: PathBuf,
        /// File of whitelist patterns, one per line
        #[arg(short = 'w', long)]
        whitelist_file: PathBuf,
        /// File of blacklist patterns, one per line
        #[arg(short = 'b', long)]
        blacklist_file: Option<PathBuf>,
        /// Directory for downloaded sitemaps and results
        #[arg(short = 'o', long, default_value = "whitelist_analysis")]
        output_dir: PathBuf,
    },
    /// Mine path structure from a URL list file and suggest exclusions
    Paths {
        /// File containing URLs to analyze, one per line
        urls_file: PathBuf,
        /// Directory for analysis results
        #[arg(short = 'o', long, default_value = "path_analysis")]
        output_dir: PathBuf,
        /// Minimum occurrences before an entry becomes a suggestion
        #[arg(long, default_value_t = 20)]
        min_count: u64,
    },
    /// Find organizational pages in a URL list file
    Organize {
        /// File containing URLs to analyze, one per line
        urls_file: PathBuf,
        /// Directory to save categorized URLs
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Filter {
            sitemap_index,
            output_dir,
            blacklist,
            blacklist_file,
            whitelist_file,
            no_default_blacklist,
            no_default_whitelist,
            interactive,
            url_categories,
        } => {
            cmd_filter(FilterArgs {
                sitemap_index,
                output_dir,
                blacklist,
                blacklist_file,
                whitelist_file,
                no_default_blacklist,
                no_default_whitelist,
                interactive,
                url_categories,
            })
            .await
        }
        Commands::Analyze {
            sitemap_index,
            output_dir,
            search_term,
        } => cmd_analyze(&sitemap_index, &output_dir, search_term).await,
        Commands::Compare {
            sitemap_index,
            whitelist_file,
            blacklist_file,
            output_dir,
        } => cmd_compare(&sitemap_index, &whitelist_file, blacklist_file.as_deref(), &output_dir).await,
        Commands::Paths {
            urls_file,
            output_dir,
            min_count,
        } => cmd_paths(&urls_file, &output_dir, min_count),
        Commands::Organize {
            urls_file,
            output_dir,
        } => cmd_organize(&urls_file, output_dir.as_deref()),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct FilterArgs {
    sitemap_index: PathBuf,
    output_dir: PathBuf,
    blacklist: Vec<String>,
    blacklist_file: Option<PathBuf>,
    whitelist_file: Option<PathBuf>,
    no_default_blacklist: bool,
    no_default_whitelist: bool,
    interactive: bool,
    url_categories: bool,
}

async fn cmd_filter(args: FilterArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;

    let mut blacklist_patterns = config::compose_blacklist(
        args.no_default_blacklist,
        &args.blacklist,
        args.blacklist_file.as_deref(),
    )?;
    let whitelist_patterns =
        config::compose_whitelist(args.no_default_whitelist, args.whitelist_file.as_deref())?;

    // An unparsable pattern fails the run before any URL is processed.
    PatternSet::compile(blacklist_patterns.clone())?;
    let whitelist = PatternSet::compile(whitelist_patterns.clone())?;

    let corpus = load_corpus(&args.sitemap_index, &args.output_dir).await?;
    output::write_lines(&args.output_dir.join("all_urls.txt"), &corpus.urls)?;

    if args.interactive {
        blacklist_patterns = repl::build_blacklist(&corpus.urls, blacklist_patterns)?;
        println!("\nFinal blacklist patterns:");
        for pattern in &blacklist_patterns {
            println!("  {pattern}");
        }
    }
    let blacklist = PatternSet::compile(blacklist_patterns.clone())?;

    let partition = classify::classify(&corpus.urls, &whitelist, &blacklist);

    output::write_lines(&args.output_dir.join("blacklist_patterns.txt"), &blacklist_patterns)?;
    output::write_lines(&args.output_dir.join("whitelist_patterns.txt"), &whitelist_patterns)?;
    output::write_lines(&args.output_dir.join("filtered_urls.txt"), &partition.kept)?;
    output::write_lines(&args.output_dir.join("blacklisted_urls.txt"), &partition.excluded)?;

    println!("\nAnalyzing URL patterns by path structure...");
    let stats = analyze::analyze(&partition.kept);
    output::write_json(
        &args.output_dir.join("path_patterns.json"),
        &serde_json::json!({ "path_patterns": &stats.prefixes }),
    )?;

    println!("\nTop URL path patterns (after filtering):");
    for (prefix, count) in stats.prefixes.ranked().into_iter().take(10) {
        println!("  {prefix}: {count} URLs");
    }

    if args.url_categories {
        let categories = classify::CategorySet::compile(config::DEFAULT_CATEGORIES.iter().copied())?;
        let result = classify::categorize(&partition.kept, &categories);
        println!();
        for (name, urls) in &result.buckets {
            output::write_lines(&args.output_dir.join(format!("{name}_urls.txt")), urls)?;
            println!("  {}: {} URLs", name, urls.len());
        }
        output::write_lines(
            &args.output_dir.join("uncategorized_urls.txt"),
            &result.uncategorized,
        )?;
        println!("  uncategorized: {} URLs", result.uncategorized.len());
    }

    let total = corpus.len();
    println!("\nFiltering Results:");
    println!(
        "  Sitemaps: {} expected, {} retrieved",
        corpus.expected_children, corpus.retrieved_children
    );
    println!("  Total URLs: {total}");
    println!(
        "  Kept: {} ({})",
        partition.kept.len(),
        percent(partition.kept.len(), total)
    );
    println!(
        "  Excluded: {} ({})",
        partition.excluded.len(),
        percent(partition.excluded.len(), total)
    );
    print_samples("kept", &partition.kept);
    print_samples("excluded", &partition.excluded);

    Ok(())
}

async fn cmd_analyze(
    sitemap_index: &Path,
    output_dir: &Path,
    search_term: Option<String>,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let corpus = load_corpus(sitemap_index, output_dir).await?;
    output::write_lines(&output_dir.join("all_urls.txt"), &corpus.urls)?;

    if let Some(term) = search_term {
        let needle = term.to_lowercase();
        let matching: Vec<String> = corpus
            .urls
            .iter()
            .filter(|url| url.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        println!("\nFound {} URLs containing '{}'", matching.len(), term);
        for (i, url) in matching.iter().take(20).enumerate() {
            println!("  {}. {}", i + 1, url);
        }
        let path = output_dir.join(format!("search_results_{term}.txt"));
        output::write_lines(&path, &matching)?;
        println!("Saved search results to: {}", path.display());
    }

    println!("\nAnalyzing URL patterns...");
    let stats = analyze::analyze(&corpus.urls);
    let analysis_path = output_dir.join("url_analysis.json");
    output::write_json(&analysis_path, &stats)?;

    println!("\nURL Analysis Summary:");
    println!("  Total URLs: {}", stats.total_urls);
    println!("  Domains: {}", stats.domains.len());
    println!("\nTop path segments (might indicate content categories):");
    for (segment, count) in stats.segments.ranked().into_iter().take(20) {
        println!("  {}: {} ({})", segment, count, percent(count as usize, stats.total_urls));
    }

    println!("\nAnalysis complete. Results saved to {}", analysis_path.display());
    Ok(())
}

async fn cmd_compare(
    sitemap_index: &Path,
    whitelist_file: &Path,
    blacklist_file: Option<&Path>,
    output_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let whitelist_patterns = patterns::load_pattern_file(whitelist_file)?;
    println!("Loaded {} whitelist patterns", whitelist_patterns.len());
    let blacklist_patterns = match blacklist_file {
        Some(path) => {
            let loaded = patterns::load_pattern_file(path)?;
            println!("Loaded {} blacklist patterns", loaded.len());
            loaded
        }
        None => Vec::new(),
    };

    let whitelist = PatternSet::compile(whitelist_patterns)?;
    let blacklist = PatternSet::compile(blacklist_patterns)?;

    let corpus = load_corpus(sitemap_index, output_dir).await?;
    let report = classify::compare(&corpus.urls, &whitelist, &blacklist);
    let total = corpus.len();

    println!("\nPattern Matching Summary:");
    println!(
        "  Whitelist only: {} ({})",
        report.first_only.len(),
        percent(report.first_only.len(), total)
    );
    if !blacklist.is_empty() {
        println!(
            "  Blacklist only: {} ({})",
            report.second_only.len(),
            percent(report.second_only.len(), total)
        );
        println!(
            "  Both whitelist and blacklist: {} ({})",
            report.both.len(),
            percent(report.both.len(), total)
        );
    }
    println!(
        "  Neither: {} ({})",
        report.neither.len(),
        percent(report.neither.len(), total)
    );

    output::write_lines(&output_dir.join("whitelist_only.txt"), &report.first_only)?;
    if !blacklist.is_empty() {
        output::write_lines(&output_dir.join("blacklist_only.txt"), &report.second_only)?;
        output::write_lines(&output_dir.join("both_match.txt"), &report.both)?;
    }
    output::write_lines(&output_dir.join("neither_match.txt"), &report.neither)?;

    output::write_match_counts(
        &output_dir.join("whitelist_pattern_counts.txt"),
        &report.first_counts,
    )?;
    if !blacklist.is_empty() {
        output::write_match_counts(
            &output_dir.join("blacklist_pattern_counts.txt"),
            &report.second_counts,
        )?;
    }

    print_top_counts("whitelist", &report.first_counts);
    if !blacklist.is_empty() {
        print_top_counts("blacklist", &report.second_counts);
    }

    println!("\nAnalysis complete. Results saved to {}", output_dir.display());
    Ok(())
}

fn cmd_paths(urls_file: &Path, output_dir: &Path, min_count: u64) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let urls = read_url_file(urls_file)?;
    println!("Analyzing path structure of {} URLs...", urls.len());
    let stats = analyze::analyze(&urls);

    output::write_ranked(
        &output_dir.join("path_structures.txt"),
        "Common URL path structures (frequency):",
        &stats.structures.ranked().into_iter().take(30).collect::<Vec<_>>(),
    )?;
    output::write_ranked(
        &output_dir.join("path_prefixes.txt"),
        "Common URL path prefixes (frequency):",
        &stats.prefixes.above(5).into_iter().take(50).collect::<Vec<_>>(),
    )?;
    output::write_ranked(
        &output_dir.join("page_name_patterns.txt"),
        "Common page name patterns (frequency):",
        &stats.name_patterns.above(5).into_iter().take(50).collect::<Vec<_>>(),
    )?;

    let protected: Vec<String> = config::PROTECTED_MARKERS.iter().map(|m| m.to_string()).collect();
    let suggestions = analyze::suggest_exclusions(&stats, min_count, &protected);
    output::write_suggestions(
        &output_dir.join("blacklist_suggestions.txt"),
        "Suggested blacklist patterns based on path analysis:",
        &suggestions,
    )?;

    println!("\nTop path prefixes (potential patterns to blacklist):");
    for (prefix, count) in stats.prefixes.ranked().into_iter().take(10) {
        println!("  {prefix}: {count} occurrences");
    }
    println!("\nTop page name patterns (potential patterns to blacklist):");
    for (pattern, count) in stats.name_patterns.ranked().into_iter().take(10) {
        println!("  {pattern}: {count} occurrences");
    }

    println!("\nPath structure analysis complete. Results saved to {}", output_dir.display());
    Ok(())
}

fn cmd_organize(urls_file: &Path, output_dir: Option<&Path>) -> Result<()> {
    let urls = read_url_file(urls_file)?;
    println!("Analyzing {} URLs...", urls.len());
    let report = organize::scan(&urls);

    println!("\nPotential organizational page patterns found:");
    for (name, bucket) in &report.buckets {
        if !bucket.is_empty() {
            println!("  {}: {} URLs", name, bucket.len());
        }
    }
    println!(
        "\nTotal unique organizational URLs identified: {}",
        report.all.len()
    );

    println!("\nCommon URL path patterns (deeper than two segments):");
    for (pattern, count) in report.deep_paths.above(5).into_iter().take(20) {
        println!("  {pattern}: {count} occurrences");
    }

    println!("\nSuggested regex patterns for blacklisting:");
    for pattern in organize::SUGGESTED_EXCLUSIONS {
        println!("  {pattern}");
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
        for (name, bucket) in &report.buckets {
            if !bucket.is_empty() {
                output::write_lines(&dir.join(format!("{name}_urls.txt")), bucket)?;
            }
        }
        output::write_lines(&dir.join("all_organizational_urls.txt"), &report.all)?;
        output::write_lines(
            &dir.join("suggested_blacklist_patterns.txt"),
            organize::SUGGESTED_EXCLUSIONS,
        )?;
        println!("\nResults saved to {}", dir.display());
    }

    Ok(())
}

/// Read the index, then fetch and parse every child sitemap with a
/// progress bar over the download loop.
async fn load_corpus(index_path: &Path, output_dir: &Path) -> Result<corpus::Corpus> {
    let index_xml = std::fs::read_to_string(index_path)
        .with_context(|| format!("Failed to read sitemap index {}", index_path.display()))?;

    println!("Parsing sitemap index: {}", index_path.display());
    let children = sitemap::read_locs(&index_xml, sitemap::SitemapKind::Index);
    println!("Found {} sitemaps in the index", children.len());

    let fetcher = fetch::Fetcher::new(output_dir);
    let pb = ProgressBar::new(children.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let pb_task = pb.clone();
    let corpus = corpus::collect_from_children(children, move |url| {
        let fetcher = fetcher.clone();
        let pb = pb_task.clone();
        async move {
            let result = fetcher.fetch(&url).await;
            pb.inc(1);
            result
        }
    })
    .await;
    pb.finish_and_clear();

    println!(
        "\nTotal URLs found: {} ({}/{} sitemaps retrieved)",
        corpus.len(),
        corpus.retrieved_children,
        corpus.expected_children
    );
    Ok(corpus)
}

fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        "0.00%".to_string()
    } else {
        format!("{:.2}%", part as f64 / total as f64 * 100.0)
    }
}

fn print_samples(label: &str, urls: &[String]) {
    if urls.is_empty() {
        return;
    }
    println!("\nSample of {label} URLs:");
    for (i, url) in urls.iter().take(5).enumerate() {
        println!("  {}. {}", i + 1, url);
    }
}

fn print_top_counts(label: &str, counts: &[(String, u64)]) {
    let mut ranked: Vec<&(String, u64)> = counts.iter().collect();
    ranked.sort_by_key(|entry| std::cmp::Reverse(entry.1));
    println!("\nTop 10 {label} patterns by match count:");
    for (pattern, count) in ranked.into_iter().take(10) {
        println!("  {pattern}: {count} matches");
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
