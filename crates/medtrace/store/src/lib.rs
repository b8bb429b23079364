//! medtrace world-state storage.
//!
//! This crate defines the key-value substrate the provenance contract runs on:
//! - [`WorldState`]: live values, range scans, per-key history, atomic commits
//! - [`TransactionContext`]: one invocation's view of the world state, which
//!   records what it read and buffers what it writes
//! - [`ReadWriteSet`]: the unit a backend validates and commits
//!
//! Design stance:
//! - Backends own ordering. A commit is rejected when any key it read has
//!   changed since the read (optimistic concurrency); callers resubmit.
//! - History is append-only. Deletes remove the live value and append a
//!   tombstone; earlier versions stay readable.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![warn(rust_2018_idioms)]

mod context;
mod error;
pub mod memory;
mod model;
#[cfg(feature = "postgres")]
pub mod postgres;
mod traits;

pub use context::TransactionContext;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryWorldState;
pub use model::{
    CommitReceipt, KeyModification, KeyValue, ReadWriteSet, TxId, Version, VersionedValue,
};
#[cfg(feature = "postgres")]
pub use postgres::PostgresWorldState;
pub use traits::WorldState;
