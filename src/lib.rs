//! Workspace facade crate.
//!
//! This crate exists to expose the individual wheelhouse crates behind a
//! single package. Host tooling can depend on `wheelhouse` and reach the
//! artifact engine, the sync engine and the storage adapters without wiring
//! each workspace member individually.

pub use core_artifact as artifact;
pub use core_runtime as runtime;
pub use core_sync as sync;
pub use provider_swift as swift;
pub use store_reqwest as reqwest_bridge;
pub use store_traits as traits;
