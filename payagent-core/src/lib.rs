//! Core of the Payment Agent.
//!
//! A payment request spawns a [`processors::PaymentListener`] that watches
//! the chain for a matching USDC mint. Once the mint lands, the
//! [`processors::Distributor`] splits the received amount between two
//! parties and reports the outcome through the completion channel.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod agent;
pub mod chain;
pub mod config;
pub mod entities;
pub mod events;
pub mod processors;
pub mod utils;
