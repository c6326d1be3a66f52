//! SQLite backend for the Cursus training store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write is a [`UnitOfWork`] that
//! runs entirely inside one connection call, so transactions never
//! interleave.

mod cascade;
mod encode;
mod reconcile;
mod schema;
mod store;

pub mod error;
pub mod gateway;

pub use error::{Error, Result, TransactionState};
pub use gateway::UnitOfWork;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
