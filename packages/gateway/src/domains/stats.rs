//! Dashboard statistics, merged from the engine and the supervisor.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::GatewayError;
use crate::domains::models::DashboardSnapshot;
use crate::kernel::{EngineClient, ProcessSupervisor};

/// Combines engine aggregates with the supervisor's live worker count into
/// one snapshot per request.
pub struct StatsAggregator {
    engine: Arc<EngineClient>,
    supervisor: Arc<ProcessSupervisor>,
    top_domains: usize,
}

impl StatsAggregator {
    pub fn new(
        engine: Arc<EngineClient>,
        supervisor: Arc<ProcessSupervisor>,
        top_domains: usize,
    ) -> Self {
        Self {
            engine,
            supervisor,
            top_domains,
        }
    }

    /// Compute a fresh snapshot.
    ///
    /// Contract: the total page count is load-bearing — if it fails the
    /// whole request fails as `BackendUnavailable`. The per-domain breakdown
    /// and the discovered-URL sum degrade to empty/zero instead, so a
    /// partially unavailable engine still yields a usable dashboard.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, GatewayError> {
        let (total, breakdown, discovered) = tokio::join!(
            self.engine.count_pages(),
            self.engine.domain_aggregation(self.top_domains),
            self.engine.sum_urls_discovered(),
        );

        let total_pages = total.map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;

        let domains = breakdown.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "per-domain aggregation failed, returning empty breakdown");
            Vec::new()
        });
        let urls_discovered = discovered.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "url sum aggregation failed, defaulting to zero");
            0
        });

        Ok(DashboardSnapshot {
            total_pages,
            urls_discovered,
            active_crawlers: self.supervisor.active_count() as u64,
            domains,
            generated_at: Utc::now(),
        })
    }

    /// Hourly crawl activity keyed by ISO-8601 bucket timestamp. A direct
    /// read: engine failure surfaces, unlike the merged snapshot.
    pub async fn metrics(&self) -> Result<BTreeMap<String, u64>, GatewayError> {
        self.engine
            .crawl_activity()
            .await
            .map_err(|e| GatewayError::SearchUnavailable(e.to_string()))
    }
}
