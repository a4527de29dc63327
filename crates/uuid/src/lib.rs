//! Document identifiers and sharded-path utilities.
//!
//! Medications and medication plans are stored as one JSON document each, under sharded
//! directories derived from a generated identifier. Patients are the exception: their
//! identifier is supplied by the caller and is not a [`DocumentId`].
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`. Non-canonical
//! values (uppercase, hyphenated, wrong length, non-hex) are rejected by [`DocumentId::parse`].
//!
//! ## Sharded layout
//! For a canonical id `u`, a document lives at:
//! `collection_dir/<u[0..2]>/<u[2..4]>/<u>.json`

mod service;

pub use service::{DocumentId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
