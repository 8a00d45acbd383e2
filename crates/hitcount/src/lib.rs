//! Top-level facade crate for hitcount.
//!
//! Re-exports the core metric types and the service library so users can depend on a single crate.

pub mod core {
    pub use hitcount_core::*;
}

pub mod service {
    pub use hitcount_service::*;
}
