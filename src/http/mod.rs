//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit, trace layer)
//!     → proxy.rs (POST /proxy: decode, relay, respond)
//!     → relay executor (outbound call + registry write)
//!     → JSON summary or plain-text error back to the client
//! ```

pub mod proxy;
pub mod server;

pub use server::{AppState, HttpServer};
