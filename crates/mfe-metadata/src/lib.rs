//! Moments API client.
//!
//! Sends full-record overwrites of a moment to the metadata store. The store
//! owns the authoritative record; this worker only ever writes whole moments.

pub mod client;
pub mod error;

pub use client::{MetadataClient, MetadataConfig, MetadataService, UpdateOutcome};
pub use error::{MetadataError, MetadataResult};
