//! Stats aggregator tests: concurrent engine reads, partial degradation.

use std::sync::Arc;
use std::time::Duration;

use gateway_core::common::GatewayError;
use gateway_core::domains::StatsAggregator;
use gateway_core::kernel::{EngineClient, ProcessSupervisor, SupervisorConfig};
use serde_json::json;

fn idle_supervisor() -> Arc<ProcessSupervisor> {
    Arc::new(ProcessSupervisor::new(SupervisorConfig {
        worker_bin: "sh".to_string(),
        worker_args: vec!["-c".to_string(), "sleep 30".to_string()],
        seed_file: std::env::temp_dir().join("stats_test_seeds.json"),
    }))
}

fn aggregator(server: &mockito::ServerGuard, supervisor: Arc<ProcessSupervisor>) -> StatsAggregator {
    let engine = Arc::new(EngineClient::new(server.url(), Duration::from_secs(2)).unwrap());
    StatsAggregator::new(engine, supervisor, 10)
}

#[tokio::test]
async fn snapshot_merges_engine_and_supervisor_views() {
    let mut server = mockito::Server::new_async().await;
    let supervisor = idle_supervisor();
    supervisor.start("a.com").unwrap();
    let stats = aggregator(&server, Arc::clone(&supervisor));

    let _count = server
        .mock("GET", "/web_pages/_count")
        .with_status(200)
        .with_body(json!({ "count": 1234 }).to_string())
        .create_async()
        .await;
    let _agg = server
        .mock("POST", "/web_pages/_search")
        .with_status(200)
        .with_body(
            json!({ "aggregations": { "domains": { "buckets": [{
                "key": "a.com",
                "doc_count": 900,
                "avg_crawl_time": { "value": 140.5 },
                "avg_content_length": { "value": 52100.0 }
            }]}}})
            .to_string(),
        )
        .create_async()
        .await;
    let _sum = server
        .mock("POST", "/crawl_domains/_search")
        .with_status(200)
        .with_body(json!({ "aggregations": { "urls": { "value": 4321.0 } } }).to_string())
        .create_async()
        .await;

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.total_pages, 1234);
    assert_eq!(snapshot.urls_discovered, 4321);
    assert_eq!(snapshot.active_crawlers, 1);
    assert_eq!(snapshot.domains.len(), 1);
    assert_eq!(snapshot.domains[0].domain, "a.com");
    assert_eq!(snapshot.domains[0].page_count, 900);
    assert_eq!(snapshot.domains[0].avg_crawl_time_ms, 140.5);

    supervisor.stop("a.com").unwrap();
}

#[tokio::test]
async fn aggregation_failure_degrades_to_empty_breakdown() {
    let mut server = mockito::Server::new_async().await;
    let stats = aggregator(&server, idle_supervisor());

    let _count = server
        .mock("GET", "/web_pages/_count")
        .with_status(200)
        .with_body(json!({ "count": 42 }).to_string())
        .create_async()
        .await;
    // Both aggregation reads fail; the snapshot still succeeds.
    let _agg = server
        .mock("POST", "/web_pages/_search")
        .with_status(500)
        .create_async()
        .await;
    let _sum = server
        .mock("POST", "/crawl_domains/_search")
        .with_status(500)
        .create_async()
        .await;

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.total_pages, 42);
    assert!(snapshot.domains.is_empty());
    assert_eq!(snapshot.urls_discovered, 0);
    assert_eq!(snapshot.active_crawlers, 0);
}

#[tokio::test]
async fn count_failure_fails_the_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let stats = aggregator(&server, idle_supervisor());

    let _count = server
        .mock("GET", "/web_pages/_count")
        .with_status(500)
        .create_async()
        .await;
    let _agg = server
        .mock("POST", "/web_pages/_search")
        .with_status(500)
        .create_async()
        .await;
    let _sum = server
        .mock("POST", "/crawl_domains/_search")
        .with_status(500)
        .create_async()
        .await;

    let err = stats.snapshot().await.unwrap_err();
    assert!(matches!(err, GatewayError::BackendUnavailable(_)));
}

#[tokio::test]
async fn missing_average_values_default_to_zero() {
    let mut server = mockito::Server::new_async().await;
    let stats = aggregator(&server, idle_supervisor());

    let _count = server
        .mock("GET", "/web_pages/_count")
        .with_status(200)
        .with_body(json!({ "count": 1 }).to_string())
        .create_async()
        .await;
    let _agg = server
        .mock("POST", "/web_pages/_search")
        .with_status(200)
        .with_body(
            // Engine reports null averages for a domain with no numeric data.
            json!({ "aggregations": { "domains": { "buckets": [{
                "key": "b.com",
                "doc_count": 1,
                "avg_crawl_time": { "value": null },
                "avg_content_length": { "value": null }
            }]}}})
            .to_string(),
        )
        .create_async()
        .await;
    let _sum = server
        .mock("POST", "/crawl_domains/_search")
        .with_status(200)
        .with_body(json!({ "aggregations": { "urls": { "value": null } } }).to_string())
        .create_async()
        .await;

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.domains[0].avg_crawl_time_ms, 0.0);
    assert_eq!(snapshot.domains[0].avg_content_bytes, 0.0);
    assert_eq!(snapshot.urls_discovered, 0);
}

#[tokio::test]
async fn metrics_returns_hourly_buckets_keyed_by_timestamp() {
    let mut server = mockito::Server::new_async().await;
    let stats = aggregator(&server, idle_supervisor());

    let _activity = server
        .mock("POST", "/web_pages/_search")
        .with_status(200)
        .with_body(
            json!({ "aggregations": { "activity": { "buckets": [
                { "key_as_string": "2026-08-29T09:00:00.000Z", "doc_count": 17 },
                { "key_as_string": "2026-08-29T10:00:00.000Z", "doc_count": 42 }
            ]}}})
            .to_string(),
        )
        .create_async()
        .await;

    let buckets = stats.metrics().await.unwrap();
    assert_eq!(buckets.get("2026-08-29T09:00:00.000Z"), Some(&17));
    assert_eq!(buckets.get("2026-08-29T10:00:00.000Z"), Some(&42));
}

#[tokio::test]
async fn metrics_failure_is_not_swallowed() {
    let mut server = mockito::Server::new_async().await;
    let stats = aggregator(&server, idle_supervisor());

    let _activity = server
        .mock("POST", "/web_pages/_search")
        .with_status(500)
        .create_async()
        .await;

    let err = stats.metrics().await.unwrap_err();
    assert!(matches!(err, GatewayError::SearchUnavailable(_)));
}
