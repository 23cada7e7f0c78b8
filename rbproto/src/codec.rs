//! Codec collaborator contract
//!
//! The codec owns the wire shape of the protocol: it turns a logical
//! [`Operation`] into a physical request and interprets response bodies,
//! depositing results into the operation's payload. Continuation state that
//! must survive between rounds of one logical operation lives either in the
//! payload (login step counter) or in the codec itself (session tokens).

use crate::error::Result;
use crate::ops::Operation;

/// One physical request ready for submission by a [`Transport`]
///
/// [`Transport`]: crate::Transport
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalRequest {
    /// Remote method name, e.g. `station.getPlaylist`
    pub method: String,
    /// JSON body
    pub body: serde_json::Value,
}

/// Outcome of interpreting one response body.
///
/// Protocol failures other than an expired session are reported through the
/// `Err` channel of [`ProtocolCodec::interpret`] and are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The logical operation is complete
    Ok,
    /// Another physical round is required (multi-step handshake, pagination)
    Continue,
    /// The service rejected the session token; the executor may re-login and
    /// replay the original operation
    AuthExpired,
}

/// Remote-call collaborator: serialization and response interpretation
pub trait ProtocolCodec: Send {
    /// Serialize the operation's next physical round.
    ///
    /// A serialization error is terminal for the logical call; the executor
    /// does not retry it.
    fn serialize(&self, op: &Operation) -> Result<PhysicalRequest>;

    /// Interpret a response body, depositing results into `op`.
    fn interpret(&mut self, body: &str, op: &mut Operation) -> Result<Status>;
}
