//! # Storage Capability Traits
//!
//! Abstract capabilities consumed by the sync engine.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync engine and the concrete
//! storage backends. Each trait represents a capability the engine requires
//! but that is implemented differently per backend:
//!
//! - [`ObjectStore`](store::ObjectStore) - container/object operations against
//!   a remote object store
//! - [`StoreFactory`](store::StoreFactory) - opens fresh, independently
//!   authenticated store sessions (backend drivers are not assumed to be
//!   shareable across concurrent transfer tasks)
//! - [`HttpClient`](http::HttpClient) - plain HTTP operations used for index
//!   scraping and artifact downloads
//!
//! ## Error Handling
//!
//! All traits use [`StoreError`](error::StoreError). Authentication failures
//! surface as `InvalidCredentials` and are distinguishable from every other
//! failure class: callers treat them as terminal while transfer failures are
//! retried. `ObjectNotFound` is an expected state in manifest and delete
//! paths, not a hard error.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` bounds to support concurrent usage across
//! async tasks.

pub mod error;
pub mod http;
pub mod store;

pub use error::{Result, StoreError};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use store::{ObjectEntry, ObjectStore, StoreFactory};
