use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a tracked domain, written by the registry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Per-domain crawl counters, written by the worker only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlCounters {
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub in_progress: u64,
}

/// Persisted record for a tracked domain, one per domain value.
///
/// Field ownership is split: the registry writes `status` and `added_at`
/// at creation; the worker owns `last_crawled`, `pages_found`, and
/// `crawl_status`. The gateway never merges whole documents, so neither
/// writer can clobber the other's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    pub status: DomainStatus,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub last_crawled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages_found: u64,
    #[serde(default)]
    pub crawl_status: CrawlCounters,
}

impl DomainRecord {
    /// A fresh record for a newly submitted domain.
    pub fn pending(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            status: DomainStatus::Pending,
            added_at: Utc::now(),
            last_crawled: None,
            pages_found: 0,
            crawl_status: CrawlCounters::default(),
        }
    }
}

/// A DomainRecord joined with supervisor liveness for the status endpoint.
/// Read-side join, never written back to the engine.
#[derive(Debug, Clone, Serialize)]
pub struct DomainStatusRow {
    #[serde(flatten)]
    pub record: DomainRecord,
    pub is_active: bool,
}

/// A crawled page as stored by the worker. Read-only here; missing fields
/// tolerated since the worker's schema may run ahead of ours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDocument {
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
}

/// A normalized search hit returned to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub score: f64,
}

impl SearchHit {
    pub fn from_page(page: PageDocument, score: Option<f64>) -> Self {
        Self {
            url: page.url,
            domain: page.domain,
            title: page.title,
            content: page.content,
            timestamp: page.timestamp,
            score: score.unwrap_or(0.0),
        }
    }
}

/// Per-domain slice of the dashboard snapshot. All numeric fields are
/// explicit zero-defaults so consumers never branch on presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainBreakdown {
    pub domain: String,
    pub page_count: u64,
    pub avg_crawl_time_ms: f64,
    pub avg_content_bytes: f64,
}

/// Freshly computed aggregate view for the dashboard. Never persisted,
/// recomputed on every request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub total_pages: u64,
    pub urls_discovered: u64,
    pub active_crawlers: u64,
    pub domains: Vec<DomainBreakdown>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_record_has_zeroed_counters() {
        let record = DomainRecord::pending("example.com");
        assert_eq!(record.status, DomainStatus::Pending);
        assert_eq!(record.pages_found, 0);
        assert_eq!(record.crawl_status, CrawlCounters::default());
        assert!(record.last_crawled.is_none());
    }

    #[test]
    fn domain_status_serializes_snake_case() {
        let json = serde_json::to_string(&DomainStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }

    #[test]
    fn record_deserializes_with_missing_counters() {
        // Records written before the counter fields existed.
        let record: DomainRecord = serde_json::from_str(
            r#"{"domain":"a.com","status":"pending","added_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.pages_found, 0);
        assert_eq!(record.crawl_status.success, 0);
    }

    #[test]
    fn status_row_flattens_record() {
        let row = DomainStatusRow {
            record: DomainRecord::pending("a.com"),
            is_active: true,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["domain"], "a.com");
        assert_eq!(value["is_active"], true);
    }

    #[test]
    fn search_hit_defaults_score_to_zero() {
        let page: PageDocument =
            serde_json::from_str(r#"{"url":"https://a.com/x"}"#).unwrap();
        let hit = SearchHit::from_page(page, None);
        assert_eq!(hit.score, 0.0);
        assert!(hit.title.is_empty());
    }
}
