//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (method, url, curated headers, streaming body)
//!     → client.rs (pooled reqwest client, manual or following redirects)
//!     → UpstreamResponse (status, headers, streaming body)
//! ```

pub mod client;

pub use client::{OutboundRequest, RedirectMode, UpstreamClient, UpstreamResponse};
