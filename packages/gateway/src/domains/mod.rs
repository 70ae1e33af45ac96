// Domain services built on top of the kernel (engine client + supervisor).
pub mod models;
pub mod registry;
pub mod search;
pub mod stats;

pub use registry::DomainRegistry;
pub use search::QueryGateway;
pub use stats::StatsAggregator;
