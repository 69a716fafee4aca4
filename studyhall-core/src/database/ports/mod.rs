//! Repository traits the domain services depend on.
//!
//! Each listing port is a [`KeysetSource`](crate::pagination::KeysetSource)
//! so the pagination fetchers can drive it directly.

pub mod comments;
pub mod posts;
pub mod saved_posts;
