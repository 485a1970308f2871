//! Docker Registry v2 pull-through mirror.
//!
//! Routes requests by the first label of the hostname they arrive on,
//! repairs implicit `library/` namespaces, relays token requests to the
//! auth origin and re-proxies blob redirects so clients only ever talk to
//! the mirror.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
