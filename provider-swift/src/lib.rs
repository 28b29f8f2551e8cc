//! # Swift Storage Provider
//!
//! Implements the `ObjectStore` capability for Swift-protocol object storage
//! (Cloud Files compatible).
//!
//! ## Overview
//!
//! This module provides:
//! - v1 token authentication (`X-Auth-User` / `X-Auth-Key`)
//! - Container creation and paginated JSON listings
//! - Object get/put/delete with streaming uploads
//! - CDN / static-website enablement via container metadata

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{SwiftConfig, SwiftConnector, SwiftProvider};
pub use error::{Result, SwiftError};
