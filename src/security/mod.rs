//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → headers.rs (allow-list or passthrough, strip hop-by-hop)
//!     → upstream
//!
//! Client response:
//!     → headers.rs (drop CSP / clear-site-data, open CORS)
//! ```
//!
//! # Design Decisions
//! - Registry and token traffic only carries allow-listed headers
//! - Page security headers from upstream never reach the client

pub mod headers;
