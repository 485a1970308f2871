//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (hubhost query parameter or own hostname, path)
//!     → router.rs (label → upstream host + disguise flag)
//!     → matcher.rs (browser-style path classification)
//!     → Return: RouteDecision and classification
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[]
//!     → HashMap keyed by label
//!     → Freeze as immutable HostRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always resolves the same way

pub mod matcher;
pub mod router;

pub use matcher::{PathClassifier, PathRule};
pub use router::{host_label, HostRouter, RouteDecision};
