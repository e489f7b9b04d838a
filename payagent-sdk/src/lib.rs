//! Shared types for the Payment Agent.
//!
//! The server and its callers exchange the objects defined in [`objects`].
//! Token amounts travel as decimal strings and are converted to base units
//! with [`amount`]. A typed HTTP client is available behind the `client`
//! feature.

#![forbid(unsafe_code)]

pub mod amount;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
