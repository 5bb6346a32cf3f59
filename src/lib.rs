//! Single-endpoint HTTP relay library.
//!
//! `POST /proxy` takes a description of an outbound request, executes it,
//! stores the upstream body under a fresh id and answers with a summary.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::ResponseRegistry;
