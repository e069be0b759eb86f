//! Frame codec: text frame <-> `Envelope`.

use invoicerelay_core::{error::Result, Envelope};

pub fn decode(frame: &str) -> Result<Envelope> {
    let env = Envelope::parse(frame)?;
    tracing::trace!(kind = %env.kind, bytes_len = frame.len(), "decoded frame");
    Ok(env)
}

pub fn encode(env: &Envelope) -> Result<String> {
    env.to_json()
}
