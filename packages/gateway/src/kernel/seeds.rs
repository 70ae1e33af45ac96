//! Seed-URL list shared with the crawl workers.
//!
//! The file is an out-of-band channel: workers read it at startup via
//! `--seed-urls`. Every submission replaces the whole list with the root
//! URLs implied by the batch, last-writer-wins. The write is atomic
//! (tmp + rename) so a worker never observes a half-written list.

use anyhow::{Context, Result};
use std::path::Path;

/// Replace the seed file with the root URLs for `domains`.
pub async fn sync_seed_file(path: &Path, domains: &[String]) -> Result<()> {
    let urls: Vec<String> = domains.iter().map(|d| format!("https://{d}/")).collect();
    let payload = serde_json::to_vec_pretty(&urls).context("Failed to encode seed list")?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &payload)
        .await
        .with_context(|| format!("Failed to write seed file {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace seed file {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = urls.len(), "seed list synchronized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_root_urls_and_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed_urls.json");

        sync_seed_file(&path, &["a.com".to_string(), "b.org".to_string()])
            .await
            .unwrap();
        let first: Vec<String> =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(first, vec!["https://a.com/", "https://b.org/"]);

        sync_seed_file(&path, &["c.net".to_string()]).await.unwrap();
        let second: Vec<String> =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(second, vec!["https://c.net/"]);
    }
}
