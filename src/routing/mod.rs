//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request (/api/proxy/<rest>?<query>)
//!     → target.rs (allow-list check, join with base origin)
//!     → Return: upstream Url or TargetError
//!
//! Page navigation (/<page>)
//!     → matcher.rs (is this path governed by the access gate?)
//! ```
//!
//! # Design Decisions
//! - Upstream and matchers built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves to the same target

pub mod matcher;
pub mod target;

pub use matcher::Matcher;
pub use target::{TargetError, Upstream};
