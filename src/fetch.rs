use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

/// Downloads child sitemaps and caches the bodies into the output
/// directory, one file per sitemap named from the reference's final
/// path segment.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    cache_dir: PathBuf,
}

impl Fetcher {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            client: Client::new(),
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Fetch one sitemap, retrying transient statuses (429/5xx) with
    /// exponential backoff. The body is cached to disk before returning.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        for attempt in 0..=MAX_RETRIES {
            let response = self
                .client
                .get(url)
                .timeout(Duration::from_secs(10))
                .send()
                .await
                .with_context(|| format!("Failed to fetch {url}"))?;

            let status = response.status();
            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read body of {url}"))?;
                let cache_path = self.cache_dir.join(cache_name(url));
                tokio::fs::write(&cache_path, &body)
                    .await
                    .with_context(|| format!("Failed to cache sitemap to {}", cache_path.display()))?;
                return Ok(body);
            }

            let transient = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if !transient || attempt == MAX_RETRIES {
                return Err(anyhow!("Failed to download {url}: status {status}"));
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
            warn!(
                "Status {} for {} (attempt {}/{}), backing off {:.1}s",
                status,
                url,
                attempt + 1,
                MAX_RETRIES,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
        }

        unreachable!("retry loop always returns")
    }
}

/// Cache filename for a sitemap reference: the final path segment, or a
/// hashed fallback when the reference has no usable one.
fn cache_name(url: &str) -> String {
    let name = crate::analyze::url_path(url)
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim();
    if name.is_empty() {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("sitemap-{:016x}.xml", hasher.finish())
    } else {
        name.to_string()
    }
}

// ── Tests ──
