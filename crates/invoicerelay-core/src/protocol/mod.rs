//! Protocol modules.
//!
//! - `envelope`: the JSON envelope every frame carries.
//! - `events`: endpoint names, kind vocabularies and typed payloads.
//!
//! Parsing is panic-free: malformed input is reported as `RelayError`.

pub mod envelope;
pub mod events;

pub use envelope::Envelope;
