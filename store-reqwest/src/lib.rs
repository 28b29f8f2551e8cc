//! # Reqwest HTTP Bridge
//!
//! Reqwest-backed implementation of the [`store_traits::HttpClient`]
//! capability: buffered request execution, streaming downloads and streaming
//! uploads, with an opt-out for TLS certificate verification used by CI
//! environments behind interception proxies.

pub mod http;

pub use http::ReqwestHttpClient;
