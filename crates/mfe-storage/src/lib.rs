//! S3 blob store client.
//!
//! This crate provides:
//! - Object download into memory
//! - Server-side copy between buckets (archiving)
//! - Object deletion

pub mod client;
pub mod error;

pub use client::{BlobStore, S3BlobStore, StorageConfig};
pub use error::{StorageError, StorageResult};
