//! Business endpoints. Every route here counts toward the request counter.

pub mod hello;
