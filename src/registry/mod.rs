//! Response registry subsystem.
//!
//! # Data Flow
//! ```text
//! relay executor (successful call)
//!     → store.rs put(id, body)
//!     → DashMap entry, alive until process exit (or bound eviction)
//! ```
//!
//! # Design Decisions
//! - Owned by the server state and passed in, never a global
//! - Write-only from the relay path; ids are returned, bodies are not
//! - Unbounded by default; optional oldest-first bound via config

pub mod store;

pub use store::{CapturedBody, ResponseRegistry};
