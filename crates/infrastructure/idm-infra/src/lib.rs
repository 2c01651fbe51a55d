pub mod api;
pub mod net;
pub mod rbac;

// Re-exports for convenience
pub use api::{DomainsApi, HttpDomainsApi};
pub use net::default_http_client;
pub use rbac::{AccessApi, HttpAccessApi, StaticAccess};
