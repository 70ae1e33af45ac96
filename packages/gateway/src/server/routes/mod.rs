// HTTP routes
pub mod crawl;
pub mod health;
pub mod search;
pub mod stats;

pub use crawl::*;
pub use health::*;
pub use search::*;
pub use stats::*;
