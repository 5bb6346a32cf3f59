//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → HttpServer stops accepting → in-flight relays finish → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
