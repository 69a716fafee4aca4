//! Capabilities shared across resource types.

pub mod owned;

pub use owned::Owned;
