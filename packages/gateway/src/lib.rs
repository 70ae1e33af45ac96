// Crawl Control-Plane Gateway
//
// Sits between the operator dashboard, a fleet of per-domain crawl worker
// subprocesses, and the search/analytics engine that stores crawled pages and
// domain records. The gateway provisions indices, supervises worker
// lifecycles, reconciles desired vs. observed domain state, and translates
// dashboard queries into engine queries.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
