//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler / executor / registry produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) set per inbound call and logged at the boundary
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
