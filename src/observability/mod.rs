//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Batch passes and RPC calls produce:
//!     → logging.rs (structured log events, one span per batch)
//!     → metrics.rs (row outcome counters, batch duration histogram)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! Logs go to stderr so `--json` output on stdout stays machine readable.

pub mod logging;
pub mod metrics;
