//! Simplified query translation for the dashboard search box.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::common::GatewayError;
use crate::domains::models::SearchHit;
use crate::kernel::EngineClient;

/// What the operator typed, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Blank input short-circuits to an empty result set, no engine call.
    Empty,
    /// `domain:<value>` — exact filter, newest-crawl-first ordering.
    Domain(String),
    /// Anything else — relevance-ranked full-text match.
    FreeText(String),
}

pub fn parse_query(raw: &str) -> ParsedQuery {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedQuery::Empty;
    }
    if let Some(value) = trimmed.strip_prefix("domain:") {
        let value = value.trim();
        if value.is_empty() {
            return ParsedQuery::Empty;
        }
        return ParsedQuery::Domain(value.to_lowercase());
    }
    ParsedQuery::FreeText(trimmed.to_string())
}

/// Exact-match filter on the domain field, newest first. Recency ordering is
/// the contract here, not relevance.
fn domain_query(domain: &str, size: usize) -> Value {
    json!({
        "query": { "term": { "domain": domain } },
        "sort": [{ "timestamp": { "order": "desc" } }],
        "size": size
    })
}

/// Full-text match with fixed relative boosts: title over content over url.
/// The engine's relevance score orders the hits.
fn free_text_query(text: &str, size: usize) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": text,
                "fields": ["title^3", "content^2", "url"],
                "type": "best_fields"
            }
        },
        "sort": [{ "_score": { "order": "desc" } }],
        "size": size
    })
}

/// Translates dashboard queries into engine queries and normalizes hits.
pub struct QueryGateway {
    engine: Arc<EngineClient>,
}

impl QueryGateway {
    pub fn new(engine: Arc<EngineClient>) -> Self {
        Self { engine }
    }

    pub async fn search(&self, raw: &str, size: usize) -> Result<Vec<SearchHit>, GatewayError> {
        let body = match parse_query(raw) {
            ParsedQuery::Empty => return Ok(Vec::new()),
            ParsedQuery::Domain(domain) => domain_query(&domain, size),
            ParsedQuery::FreeText(text) => free_text_query(&text, size),
        };

        let hits = self
            .engine
            .search_pages(&body)
            .await
            .map_err(|e| GatewayError::SearchUnavailable(e.to_string()))?;

        Ok(hits
            .into_iter()
            .map(|(score, page)| SearchHit::from_page(page, score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_query(""), ParsedQuery::Empty);
        assert_eq!(parse_query("   "), ParsedQuery::Empty);
        assert_eq!(parse_query("domain:  "), ParsedQuery::Empty);
    }

    #[test]
    fn domain_prefix_is_exact_filter() {
        assert_eq!(
            parse_query("domain:Example.COM"),
            ParsedQuery::Domain("example.com".to_string())
        );
    }

    #[test]
    fn everything_else_is_free_text() {
        assert_eq!(
            parse_query("  rust async runtime "),
            ParsedQuery::FreeText("rust async runtime".to_string())
        );
    }

    #[test]
    fn domain_query_sorts_by_recency() {
        let body = domain_query("example.com", 20);
        assert_eq!(body["query"]["term"]["domain"], "example.com");
        assert_eq!(body["sort"][0]["timestamp"]["order"], "desc");
        assert_eq!(body["size"], 20);
    }

    #[test]
    fn free_text_query_sorts_by_score_with_title_boosted() {
        let body = free_text_query("rust", 10);
        let fields = body["query"]["multi_match"]["fields"].as_array().unwrap();
        assert_eq!(fields[0], "title^3");
        assert_eq!(fields[1], "content^2");
        assert_eq!(fields[2], "url");
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
    }
}
