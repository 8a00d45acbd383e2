//! hitcount core: in-process counter registry, exposition encoding, and the
//! scrape contract checks shared by the service and its tests.
//!
//! This crate carries no transport or runtime dependencies. The registry never
//! performs I/O; a transport adapter calls `encode(&registry.snapshot())` and
//! writes the result.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `HitcountError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod scrape;

/// Shared result type.
pub use error::{Result, HitcountError};
pub use metrics::exposition::encode;
pub use metrics::registry::{CounterHandle, MetricSample, Registry};
