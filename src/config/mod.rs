//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, overlay URL302 / URL / D1..D5)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → snapshotted per request via ArcSwap
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → HttpServer rebuilds runtime state and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults so the mirror runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::ProxyConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::RouteConfig;
pub use schema::DisguiseConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
