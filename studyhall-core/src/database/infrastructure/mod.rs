//! Adapters implementing the store ports.

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;
