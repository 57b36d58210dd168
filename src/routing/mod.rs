//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (classify)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: Asset | Chat | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same disposition

pub mod matcher;
pub mod router;

pub use router::{Disposition, Router};
