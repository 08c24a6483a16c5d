//! Shared data models for the moment processor.
//!
//! This crate provides Serde-serializable types for:
//! - Moments (the record carried in every queue message)
//! - Moment identifiers and processing status
//! - Hosting-platform references

pub mod moment;

pub use moment::{HostId, Moment, MomentId, MomentStatus, QueueId};
