// Shared types used across kernel, domains, and routes.
pub mod errors;

pub use errors::GatewayError;
