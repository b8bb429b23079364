//! medtrace daemon library
//!
//! HTTP front end for the medicine provenance contract:
//! - REST handlers mapping each route to a submitted or evaluated invocation
//! - Configuration loading and world state selection
//! - Server lifecycle with signal and HTTP-triggered graceful shutdown

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod timestamp;

pub use config::{DaemonConfig, StorageConfig};
pub use error::{ApiError, DaemonError};
pub use server::Server;
