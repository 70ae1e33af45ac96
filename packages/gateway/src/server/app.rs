//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::{DomainRegistry, QueryGateway, StatsAggregator};
use crate::kernel::{EngineClient, ProcessSupervisor, SupervisorConfig};
use crate::server::routes::{
    domain_statuses_handler, health_handler, metrics_handler, search_handler, stats_handler,
    stop_domain_handler, submit_domains_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub engine: Arc<EngineClient>,
    pub supervisor: Arc<ProcessSupervisor>,
    pub registry: Arc<DomainRegistry>,
    pub query_gateway: Arc<QueryGateway>,
    pub stats: Arc<StatsAggregator>,
}

impl AxumAppState {
    /// Wire the kernel and domain services from configuration.
    pub fn from_config(config: &Config, engine: Arc<EngineClient>) -> Self {
        let supervisor = Arc::new(ProcessSupervisor::new(SupervisorConfig {
            worker_bin: config.worker_bin.clone(),
            worker_args: config.worker_args.clone(),
            seed_file: config.seed_file.clone(),
        }));
        let registry = Arc::new(DomainRegistry::new(
            engine.clone(),
            supervisor.clone(),
            config.seed_file.clone(),
            config.status_page_size,
        ));
        let query_gateway = Arc::new(QueryGateway::new(engine.clone()));
        let stats = Arc::new(StatsAggregator::new(
            engine.clone(),
            supervisor.clone(),
            config.stats_top_domains,
        ));

        Self {
            engine,
            supervisor,
            registry,
            query_gateway,
            stats,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AxumAppState) -> Router {
    // CORS: the dashboard is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/metrics", get(metrics_handler))
        .route("/api/crawl/domains", post(submit_domains_handler))
        .route("/api/crawl/domains/status", get(domain_statuses_handler))
        .route("/api/crawl/domains/:domain/stop", post(stop_domain_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
