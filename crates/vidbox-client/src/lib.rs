//! HTTP client for the video annotation API.
//!
//! This crate provides:
//! - The `VideoApi` trait describing the five server endpoints
//! - A reqwest-backed implementation with request metrics
//! - Upload payloads built from memory or from disk

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod upload;

pub use client::{HttpVideoApi, VideoApi};
pub use config::ApiClientConfig;
pub use error::{ApiError, ApiResult};
pub use upload::UploadFile;
