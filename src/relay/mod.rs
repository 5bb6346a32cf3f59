//! Relay subsystem: request translation and forwarding.
//!
//! # Data Flow
//! ```text
//! inbound JSON body
//!     → types.rs (decode RelayRequest, validate method + url)
//!     → executor.rs (build outbound request, execute, read body)
//!     → registry (store body under fresh id)
//!     → types.rs (RelayResponse summary, JSON encoded)
//! ```
//!
//! Any failure is terminal and maps onto a status code in error.rs.

pub mod error;
pub mod executor;
pub mod types;

pub use error::{RelayError, RelayResult};
pub use executor::{RelayExecutor, Relayed};
pub use types::{RelayRequest, RelayResponse};
