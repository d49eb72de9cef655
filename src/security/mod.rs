//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming page navigation:
//!     → session.rs (read authToken / userRole cookies → Session)
//!     → access_control.rs (path + Session + permission table → GateDecision)
//!     → Allow, or redirect to login / landing / unauthorized
//! ```
//!
//! # Design Decisions
//! - No server-side session store; cookies are the only input
//! - Role strings are parsed into a closed enum at the boundary
//! - Unknown roles never count as a valid principal

pub mod access_control;
pub mod session;

pub use access_control::{AccessGate, GateDecision, PermissionTable, Role};
pub use session::Session;
