//! Plaid-backed [`engine::TransactionProvider`].

pub use client::{LinkConfig, PlaidClient, PlaidError};
pub use environment::PlaidEnvironment;

mod client;
mod environment;
mod wire;
