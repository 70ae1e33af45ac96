//! Kernel module - engine client, process supervision, seed list.

pub mod engine;
pub mod seeds;
pub mod supervisor;

pub use engine::{EngineClient, DOMAINS_INDEX, PAGES_INDEX};
pub use seeds::sync_seed_file;
pub use supervisor::{ProcessSupervisor, StartOutcome, SupervisorConfig};
