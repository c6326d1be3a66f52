//! Core types and trait definitions for the Cursus training store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod agent;
pub mod aggregate;
pub mod attendance;
pub mod batch;
pub mod cabinet;
pub mod catalogue;
pub mod error;
pub mod evaluation;
pub mod session;
pub mod store;

pub use error::{Error, Result};
