//! Top-level facade crate for invoicerelay.
//!
//! Re-exports core wire types and the client library so users can depend on a single crate.

pub mod core {
    pub use invoicerelay_core::*;
}

pub mod client {
    pub use invoicerelay_client::*;
}
