//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → middleware/access_control.rs (page navigations only)
//!     → proxy.rs      /api/proxy/*     → body.rs → upstream
//!     → auth.rs       /api/auth/*, /api/health
//!     → static pages  (fallback)
//!     → response.rs (uniform JSON error envelope)
//! ```

pub mod auth;
pub mod body;
pub mod middleware;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::{ErrorEnvelope, GatewayError};
pub use server::{AppState, HttpServer};
