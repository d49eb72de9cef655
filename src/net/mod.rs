//! Network layer subsystem.
//!
//! Plain TCP is handled by `axum::serve`; this module only prepares the
//! optional TLS listener.

pub mod tls;
