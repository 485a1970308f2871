//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, config snapshot)
//!     → request.rs (request ID)
//!     → context.rs (hostname, label, route decision)
//!     → [proxy pipeline]
//!     → response.rs (challenge rewrite, redirect detection, header policy)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
