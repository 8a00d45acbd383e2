//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics in a registration-ordered [`registry::Registry`]
//! and rendered by [`exposition::encode`] for the `/metrics` handler.

pub mod exposition;
pub mod registry;
