//! Shared data models for the vidbox client.
//!
//! This crate provides Serde-serializable types for:
//! - Videos as listed by the annotation server
//! - Per-video detail info
//! - Group box annotations (frames of bounding boxes)

pub mod annotation;
pub mod video;

// Re-export common types
pub use annotation::{BoundingBox, Frame, GroupAnnotations, GroupBox};
pub use video::{Video, VideoId, VideoInfo};
