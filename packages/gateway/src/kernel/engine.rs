//! Typed client for the search/analytics engine (Elasticsearch wire format).
//!
//! All engine I/O in the gateway goes through this client. Every request
//! carries the configured timeout so a slow backend cannot stall a stats or
//! search request; a timeout is indistinguishable from any other transport
//! error to callers.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domains::models::{DomainBreakdown, DomainRecord, PageDocument};

/// Index holding crawled pages, written by the workers.
pub const PAGES_INDEX: &str = "web_pages";

/// Index holding domain records, written by the registry and the workers.
pub const DOMAINS_INDEX: &str = "crawl_domains";

/// Search engine client
pub struct EngineClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse<T> {
    hits: EsHits<T>,
}

#[derive(Debug, Deserialize)]
struct EsHits<T> {
    hits: Vec<EsHit<T>>,
}

#[derive(Debug, Deserialize)]
struct EsHit<T> {
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Debug, Deserialize)]
struct EsCountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct EsBulkResponse {
    errors: bool,
    items: Vec<EsBulkItem>,
}

#[derive(Debug, Deserialize)]
struct EsBulkItem {
    create: EsBulkResult,
}

#[derive(Debug, Deserialize)]
struct EsBulkResult {
    status: u16,
    #[serde(default)]
    error: Option<EsBulkError>,
}

#[derive(Debug, Deserialize)]
struct EsBulkError {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EsAvgValue {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EsDomainBucket {
    key: String,
    doc_count: u64,
    avg_crawl_time: EsAvgValue,
    avg_content_length: EsAvgValue,
}

#[derive(Debug, Deserialize)]
struct EsDomainAggResponse {
    aggregations: EsDomainAggs,
}

#[derive(Debug, Deserialize)]
struct EsDomainAggs {
    domains: EsBuckets<EsDomainBucket>,
}

#[derive(Debug, Deserialize)]
struct EsBuckets<T> {
    buckets: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct EsActivityBucket {
    key_as_string: String,
    doc_count: u64,
}

#[derive(Debug, Deserialize)]
struct EsActivityAggResponse {
    aggregations: EsActivityAggs,
}

#[derive(Debug, Deserialize)]
struct EsActivityAggs {
    activity: EsBuckets<EsActivityBucket>,
}

#[derive(Debug, Deserialize)]
struct EsSumValue {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EsSumAggResponse {
    aggregations: EsSumAggs,
}

#[derive(Debug, Deserialize)]
struct EsSumAggs {
    urls: EsSumValue,
}

fn pages_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "url": { "type": "keyword" },
                "domain": { "type": "keyword" },
                "title": { "type": "text" },
                "content": { "type": "text" },
                "timestamp": { "type": "date" },
                "status": { "type": "keyword" },
                "content_length": { "type": "long" },
                "crawl_time": { "type": "float" }
            }
        }
    })
}

fn domains_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "domain": { "type": "keyword" },
                "status": { "type": "keyword" },
                "added_at": { "type": "date" },
                "last_crawled": { "type": "date" },
                "pages_found": { "type": "long" },
                "crawl_status": {
                    "properties": {
                        "success": { "type": "long" },
                        "failed": { "type": "long" },
                        "in_progress": { "type": "long" }
                    }
                }
            }
        }
    })
}

impl EngineClient {
    /// Create a new engine client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { base_url, client })
    }

    /// Cheap reachability probe, used before accepting a submission batch.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("Engine is unreachable")?;

        if !response.status().is_success() {
            bail!("Engine responded with {}", response.status());
        }
        Ok(())
    }

    /// Idempotently create the pages and domains indices.
    ///
    /// "already exists" is success: concurrent startups race on creation and
    /// the losers observe the winner's index. Any other failure is fatal to
    /// the caller, which must not accept traffic against an unchecked store.
    pub async fn ensure_schemas(&self) -> Result<()> {
        for (index, mapping) in [
            (PAGES_INDEX, pages_mapping()),
            (DOMAINS_INDEX, domains_mapping()),
        ] {
            let response = self
                .client
                .put(format!("{}/{}", self.base_url, index))
                .json(&mapping)
                .send()
                .await
                .with_context(|| format!("Failed to create index {index}"))?;

            if response.status().is_success() {
                tracing::info!(index, "created index");
                continue;
            }

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST
                && body.contains("resource_already_exists_exception")
            {
                tracing::debug!(index, "index already exists");
                continue;
            }
            bail!("Failed to create index {index}: {status}: {body}");
        }
        Ok(())
    }

    /// Bulk-write domain records with the `create` op type, so a record for
    /// an already-tracked domain is left untouched (409 per-item results are
    /// treated as success). Returns the number of newly created records.
    pub async fn bulk_create_domains(&self, records: &[DomainRecord]) -> Result<usize> {
        let mut body = String::new();
        for record in records {
            body.push_str(&json!({ "create": { "_id": record.domain } }).to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        let response = self
            .client
            .post(format!("{}/{}/_bulk", self.base_url, DOMAINS_INDEX))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .context("Bulk write failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Bulk write rejected: {status}: {body}");
        }

        let bulk: EsBulkResponse = response
            .json()
            .await
            .context("Failed to parse bulk response")?;

        let mut created = 0;
        if bulk.errors {
            for item in &bulk.items {
                match &item.create.error {
                    // Duplicate submission: the domain is already tracked.
                    Some(e) if item.create.status == 409 => {
                        tracing::debug!(kind = %e.kind, "domain already tracked");
                    }
                    Some(e) => bail!(
                        "Bulk item failed: {}: {}",
                        e.kind,
                        e.reason.as_deref().unwrap_or("unknown reason")
                    ),
                    None => created += 1,
                }
            }
        } else {
            created = bulk.items.len();
        }
        Ok(created)
    }

    /// All persisted domain records, newest first.
    pub async fn list_domains(&self, size: usize) -> Result<Vec<DomainRecord>> {
        let body = json!({
            "query": { "match_all": {} },
            "sort": [{ "added_at": { "order": "desc" } }],
            "size": size
        });

        let response: EsSearchResponse<DomainRecord> = self
            .execute_search(DOMAINS_INDEX, &body)
            .await
            .context("Failed to list domain records")?;

        Ok(response.hits.hits.into_iter().map(|h| h.source).collect())
    }

    /// Execute a page query built by the query gateway. Returns hits with
    /// their engine relevance score (absent for filter-sorted queries).
    pub async fn search_pages(&self, body: &Value) -> Result<Vec<(Option<f64>, PageDocument)>> {
        let response: EsSearchResponse<PageDocument> = self
            .execute_search(PAGES_INDEX, body)
            .await
            .context("Page search failed")?;

        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|h| (h.score, h.source))
            .collect())
    }

    /// Total number of crawled pages.
    pub async fn count_pages(&self) -> Result<u64> {
        let response = self
            .client
            .get(format!("{}/{}/_count", self.base_url, PAGES_INDEX))
            .send()
            .await
            .context("Count request failed")?;

        if !response.status().is_success() {
            bail!("Count request rejected: {}", response.status());
        }

        let count: EsCountResponse = response
            .json()
            .await
            .context("Failed to parse count response")?;
        Ok(count.count)
    }

    /// Per-domain breakdown: page count, average crawl duration, average
    /// content size, for the top `size` domains by document count.
    pub async fn domain_aggregation(&self, size: usize) -> Result<Vec<DomainBreakdown>> {
        let body = json!({
            "size": 0,
            "aggs": {
                "domains": {
                    "terms": { "field": "domain", "size": size },
                    "aggs": {
                        "avg_crawl_time": { "avg": { "field": "crawl_time" } },
                        "avg_content_length": { "avg": { "field": "content_length" } }
                    }
                }
            }
        });

        let response: EsDomainAggResponse = self
            .execute_search(PAGES_INDEX, &body)
            .await
            .context("Domain aggregation failed")?;

        Ok(response
            .aggregations
            .domains
            .buckets
            .into_iter()
            .map(|b| DomainBreakdown {
                domain: b.key,
                page_count: b.doc_count,
                avg_crawl_time_ms: b.avg_crawl_time.value.unwrap_or(0.0),
                avg_content_bytes: b.avg_content_length.value.unwrap_or(0.0),
            })
            .collect())
    }

    /// Sum of `pages_found` over all domain records: total URLs the workers
    /// have discovered so far.
    pub async fn sum_urls_discovered(&self) -> Result<u64> {
        let body = json!({
            "size": 0,
            "aggs": { "urls": { "sum": { "field": "pages_found" } } }
        });

        let response: EsSumAggResponse = self
            .execute_search(DOMAINS_INDEX, &body)
            .await
            .context("URL sum aggregation failed")?;

        Ok(response.aggregations.urls.value.unwrap_or(0.0) as u64)
    }

    /// Hourly crawl activity, keyed by ISO-8601 bucket timestamp.
    pub async fn crawl_activity(&self) -> Result<BTreeMap<String, u64>> {
        let body = json!({
            "size": 0,
            "aggs": {
                "activity": {
                    "date_histogram": { "field": "timestamp", "fixed_interval": "1h" }
                }
            }
        });

        let response: EsActivityAggResponse = self
            .execute_search(PAGES_INDEX, &body)
            .await
            .context("Activity histogram failed")?;

        Ok(response
            .aggregations
            .activity
            .buckets
            .into_iter()
            .map(|b| (b.key_as_string, b.doc_count))
            .collect())
    }

    async fn execute_search<T: serde::de::DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{}/_search", self.base_url, index))
            .json(body)
            .send()
            .await
            .context("Search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Search request rejected: {status}: {body}");
        }

        response
            .json()
            .await
            .context("Failed to parse search response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = EngineClient::new("http://localhost:9200/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:9200");
    }

    #[test]
    fn mappings_cover_owned_fields() {
        let pages = pages_mapping();
        assert_eq!(pages["mappings"]["properties"]["domain"]["type"], "keyword");
        assert_eq!(pages["mappings"]["properties"]["timestamp"]["type"], "date");

        let domains = domains_mapping();
        assert_eq!(domains["mappings"]["properties"]["added_at"]["type"], "date");
        assert_eq!(
            domains["mappings"]["properties"]["crawl_status"]["properties"]["success"]["type"],
            "long"
        );
    }
}
