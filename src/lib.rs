//! Same-origin gateway for the tutoring admin dashboard.
//!
//! Forwards `/api/proxy/*` to the remote PHP service and gates page
//! navigation on the `authToken` / `userRole` cookies.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
