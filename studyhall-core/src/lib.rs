//! # Studyhall Core
//!
//! Domain and storage layer for the Studyhall student social platform.
//!
//! ## Overview
//!
//! - **Pagination**: keyset pagination with opaque single-field and compound
//!   cursors, over-fetching one row to answer "is there more?"
//! - **Comments**: two-level threads where replies to replies are reparented
//!   onto the thread's top-level comment and mention the bypassed author
//! - **Posts**: the main feed, search and per-author listings
//! - **Saved posts**: likes and bookmarks keyed on `(user, post)`
//! - **Storage**: async repository ports with PostgreSQL and in-memory
//!   adapters
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapters (SQLx)
//!
//! ## Examples
//!
//! ```no_run
//! use studyhall_core::{
//!     application::AppUnitOfWork,
//!     database::InMemoryStore,
//!     domain::Actor,
//!     pagination::FEED_LIMITS,
//!     types::UserId,
//! };
//!
//! async fn first_feed_page() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::default();
//!     let uow = AppUnitOfWork::in_memory(&store);
//!     let posts = uow.post_service();
//!
//!     let author = Actor::member(UserId::new());
//!     posts.create_post(author, "Exam notes", "Chapter 3 summary").await?;
//!
//!     let page = posts.feed(None, FEED_LIMITS.resolve(None)?).await?;
//!     println!("{} posts, more: {}", page.data.len(), page.has_more);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Request and query payloads shared with the HTTP layer
pub mod api_types;

/// Application-level composition utilities (Unit of Work)
pub mod application;

/// Repository ports and their storage adapters
pub mod database;

/// Posts, comment threads and saved posts
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Cursor codec, page fetchers and page assembly
pub mod pagination;

/// Traits for core types
pub mod traits;

/// Identifier newtypes
pub mod types;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, StoreError, ValidationError};
