//! hitcount service library entry.
//!
//! Wires config, the shared registry, business and operational routes into an
//! axum app. Consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod shutdown;
