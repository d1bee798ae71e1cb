use std::future::Future;

use anyhow::Result;
use tracing::{info, warn};

use crate::sitemap::{self, SitemapKind};

/// The aggregated URL corpus: discovery order, duplicates preserved.
pub struct Corpus {
    pub urls: Vec<String>,
    /// Child sitemaps listed in the index.
    pub expected_children: usize,
    /// Child sitemaps successfully fetched and parsed.
    pub retrieved_children: usize,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Walk a sitemap index document and aggregate page URLs from its
/// children. `fetch` is the caller's capability for turning a child
/// reference into document text; a failed fetch contributes nothing and
/// processing continues with the remaining children.
pub async fn collect<F, Fut>(index_xml: &str, fetch: F) -> Corpus
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let children = sitemap::read_locs(index_xml, SitemapKind::Index);
    collect_from_children(children, fetch).await
}

/// Aggregate page URLs from an already-resolved list of child sitemap
/// references.
pub async fn collect_from_children<F, Fut>(children: Vec<String>, mut fetch: F) -> Corpus
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut corpus = Corpus {
        urls: Vec::new(),
        expected_children: children.len(),
        retrieved_children: 0,
    };

    for child in children {
        match fetch(child.clone()).await {
            Ok(xml) => {
                let urls = sitemap::read_locs(&xml, SitemapKind::UrlSet);
                info!("Found {} URLs in {}", urls.len(), child);
                corpus.retrieved_children += 1;
                corpus.urls.extend(urls);
            }
            Err(e) => {
                warn!("Skipping sitemap {}: {}", child, e);
            }
        }
    }

    corpus
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use crate::patterns::PatternSet;
    use anyhow::anyhow;

    const INDEX: &str = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://x/sitemap-a.xml</loc></sitemap>
  <sitemap><loc>https://x/sitemap-b.xml</loc></sitemap>
</sitemapindex>"#;

    const CHILD_A: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://x/wiki/A</loc></url>
  <url><loc>https://x/wiki/B</loc></url>
</urlset>"#;

    async fn fake_fetch(url: String) -> Result<String> {
        match url.as_str() {
            "https://x/sitemap-a.xml" => Ok(CHILD_A.to_string()),
            _ => Err(anyhow!("connection refused")),
        }
    }

    #[tokio::test]
    async fn failed_child_contributes_nothing() {
        let corpus = collect(INDEX, fake_fetch).await;
        assert_eq!(corpus.urls, vec!["https://x/wiki/A", "https://x/wiki/B"]);
        assert_eq!(corpus.expected_children, 2);
        assert_eq!(corpus.retrieved_children, 1);
    }

    #[tokio::test]
    async fn order_follows_index_listing() {
        let index = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>second</loc></sitemap>
  <sitemap><loc>first</loc></sitemap>
</sitemapindex>"#;
        let corpus = collect(index, |child| async move {
            Ok(format!("<urlset><url><loc>https://x/{child}/1</loc></url><url><loc>https://x/{child}/2</loc></url></urlset>"))
        })
        .await;
        assert_eq!(
            corpus.urls,
            vec![
                "https://x/second/1",
                "https://x/second/2",
                "https://x/first/1",
                "https://x/first/2"
            ]
        );
    }

    #[tokio::test]
    async fn duplicates_preserved() {
        let corpus = collect(INDEX, |_| async {
            Ok("<urlset><url><loc>https://x/wiki/A</loc></url></urlset>".to_string())
        })
        .await;
        assert_eq!(corpus.urls, vec!["https://x/wiki/A", "https://x/wiki/A"]);
    }

    #[tokio::test]
    async fn aggregate_then_classify_end_to_end() {
        // Child A yields two URLs, child B fails to fetch: the partial
        // corpus proceeds, and the blacklist excludes exactly one entry.
        let corpus = collect(INDEX, fake_fetch).await;
        assert_eq!(corpus.len(), 2);

        let blacklist = PatternSet::compile(vec![r".*/B$"]).unwrap();
        let partition = classify::classify(&corpus.urls, &PatternSet::empty(), &blacklist);
        assert_eq!(partition.kept, vec!["https://x/wiki/A"]);
        assert_eq!(partition.excluded, vec!["https://x/wiki/B"]);
    }
}
