//! Domain submission and status reconciliation.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::GatewayError;
use crate::domains::models::{DomainRecord, DomainStatusRow};
use crate::kernel::{sync_seed_file, EngineClient, ProcessSupervisor};

lazy_static! {
    // Conventional label(.label)+ DNS shape, lowercase, with a TLD.
    static ref DOMAIN_REGEX: Regex = Regex::new(
        r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)+$"
    )
    .unwrap();
}

/// Normalize and validate a submission batch. Rejects before any write.
pub fn validate_domains(domains: &[String]) -> Result<Vec<String>, GatewayError> {
    if domains.is_empty() {
        return Err(GatewayError::Validation("domain list is empty".into()));
    }

    let mut normalized = Vec::with_capacity(domains.len());
    for raw in domains {
        let domain = raw.trim().to_lowercase();
        if !DOMAIN_REGEX.is_match(&domain) {
            return Err(GatewayError::Validation(format!(
                "'{raw}' is not a valid domain name"
            )));
        }
        normalized.push(domain);
    }
    Ok(normalized)
}

/// Accepts domain submissions, persists domain records, and keeps workers
/// running for tracked domains.
pub struct DomainRegistry {
    engine: Arc<EngineClient>,
    supervisor: Arc<ProcessSupervisor>,
    seed_file: PathBuf,
    status_page_size: usize,
}

impl DomainRegistry {
    pub fn new(
        engine: Arc<EngineClient>,
        supervisor: Arc<ProcessSupervisor>,
        seed_file: PathBuf,
        status_page_size: usize,
    ) -> Self {
        Self {
            engine,
            supervisor,
            seed_file,
            status_page_size,
        }
    }

    /// Submit a batch of domains.
    ///
    /// Validation happens before any write. The engine must be reachable or
    /// the whole batch fails with `BackendUnavailable` so the dashboard can
    /// tell infra failures from input errors. Records are create-only, so a
    /// resubmitted domain keeps its counters; every domain in the batch is
    /// then ensured running, which is what makes resubmission the recovery
    /// path for a submit that persisted records but failed to spawn.
    pub async fn submit(&self, domains: &[String]) -> Result<Vec<String>, GatewayError> {
        let normalized = validate_domains(domains)?;

        self.engine
            .ping()
            .await
            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;

        let records: Vec<DomainRecord> = normalized
            .iter()
            .map(|d| DomainRecord::pending(d))
            .collect();
        let created = self
            .engine
            .bulk_create_domains(&records)
            .await
            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;
        tracing::info!(
            submitted = normalized.len(),
            created,
            "domain batch persisted"
        );

        sync_seed_file(&self.seed_file, &normalized).await?;

        for domain in &normalized {
            self.supervisor.start(domain)?;
        }

        Ok(normalized)
    }

    /// All persisted domain records, newest first, joined with liveness.
    pub async fn list_statuses(&self) -> Result<Vec<DomainStatusRow>, GatewayError> {
        let records = self
            .engine
            .list_domains(self.status_page_size)
            .await
            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let is_active = self.supervisor.is_active(&record.domain);
                DomainStatusRow { record, is_active }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_conventional_domains() {
        let batch = vec!["example.com".to_string(), "news.bbc.co.uk".to_string()];
        assert_eq!(validate_domains(&batch).unwrap(), batch);
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let batch = vec!["  Example.COM ".to_string()];
        assert_eq!(validate_domains(&batch).unwrap(), vec!["example.com"]);
    }

    #[test]
    fn rejects_empty_batch() {
        let err = validate_domains(&[]).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_domains() {
        for bad in ["not a domain", "nodots", "http://example.com", "-bad.com", "a..b"] {
            let err = validate_domains(&[bad.to_string()]).unwrap_err();
            assert!(
                matches!(err, GatewayError::Validation(_)),
                "expected validation error for {bad:?}"
            );
        }
    }
}
