//! invoicerelay core: transport-agnostic wire types and the shared error type.
//!
//! This crate defines the envelope, endpoint vocabularies and typed event
//! payloads used by the channel client. It carries no transport or runtime
//! dependencies.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here. Fallible paths
//! surface as `RelayError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, RelayError, Result};
pub use protocol::Envelope;
