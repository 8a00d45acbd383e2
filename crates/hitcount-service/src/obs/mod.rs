//! Observability setup.

pub mod logging;
