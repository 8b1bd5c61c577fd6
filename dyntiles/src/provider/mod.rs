//! Remote tile fetching
//!
//! This module provides the HTTP client abstraction used to download web
//! tiles and to probe whether a remote tile exists.
//!
//! # Example
//!
//! ```ignore
//! use dyntiles::provider::{HttpClient, ReqwestClient};
//!
//! let client = ReqwestClient::with_timeout(30)?;
//! let png = client.get("http://tiles.example.com/3/4/2.png")?;
//! ```

mod http;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockHttpClient;
