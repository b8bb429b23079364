//! medtrace provenance contract
//!
//! The contract is the only place business rules live: existence checks,
//! custody transfer, journey completion, listing and history reconstruction.
//! It holds no state between invocations; everything durable goes through
//! the [`TransactionContext`](medtrace_store::TransactionContext) it is given.
//!
//! [`Gateway`] runs invocations either as submissions (committed, visible in
//! history) or evaluations (simulated, writes discarded).

#![deny(unsafe_code)]

mod contract;
mod error;
mod gateway;
mod invocation;

pub use contract::{HistoryRecord, MedicineContract};
pub use error::{ContractError, ContractResult};
pub use gateway::Gateway;
pub use invocation::Invocation;
