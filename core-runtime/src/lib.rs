//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the wheelhouse tools:
//! - Logging and tracing initialization
//! - Configuration resolution (credentials, CI environment)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the binaries depend on. It
//! establishes the logging conventions and the credential/CI policies shared
//! by every entry point.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
