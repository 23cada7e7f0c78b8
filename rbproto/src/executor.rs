//! Resilient executor for logical tuner operations
//!
//! One logical operation may need several physical request/response rounds:
//! multi-step handshakes and paginated responses come back as
//! [`Status::Continue`], transport failures are retried with the same
//! physical request, and an expired session token triggers an embedded
//! re-login followed by a replay of the original operation.
//!
//! The re-login is deliberately modeled as loop state rather than a
//! recursive call: `reauth` holds the embedded login operation while it is
//! in flight, and a request-kind guard keeps a login from re-authenticating
//! against itself, so both the retry count and the re-auth depth are bounded.

use crate::codec::{ProtocolCodec, Status};
use crate::error::{Error, Result};
use crate::ops::Operation;
use crate::transport::Transport;
use tracing::{debug, info, warn};

/// Physical submissions allowed per logical call before a transport failure
/// becomes terminal
pub const NETWORK_ATTEMPTS: u32 = 3;

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Drives logical operations through the codec and transport collaborators
pub struct RequestExecutor {
    codec: Box<dyn ProtocolCodec>,
    transport: Box<dyn Transport>,
    credentials: Option<Credentials>,
}

impl RequestExecutor {
    pub fn new(codec: Box<dyn ProtocolCodec>, transport: Box<dyn Transport>) -> Self {
        Self {
            codec,
            transport,
            credentials: None,
        }
    }

    /// Cache credentials for transparent re-authentication.
    ///
    /// Without cached credentials an expired session is surfaced as
    /// [`Error::AuthExpired`] instead of being recovered.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
    }

    /// Execute one logical operation to completion.
    ///
    /// On success the results are found in the operation's payload, deposited
    /// there by the codec. Failures are reported, never retried beyond the
    /// transport budget and the single re-auth chain.
    pub async fn execute(&mut self, op: &mut Operation) -> Result<()> {
        let mut attempts = NETWORK_ATTEMPTS;
        // embedded re-login in flight, None while the original op runs
        let mut reauth: Option<Operation> = None;
        let mut reauth_done = false;

        debug!(op = op.kind(), "executing");

        loop {
            let current = match reauth.as_mut() {
                Some(login) => login,
                None => &mut *op,
            };

            let request = self.codec.serialize(current)?;

            // retry the same physical request on transport failure
            let body = loop {
                match self.transport.submit(&request).await {
                    Ok(body) => break body,
                    Err(e) => {
                        attempts -= 1;
                        if attempts == 0 {
                            return Err(e);
                        }
                        warn!(error = %e, "transport failure, trying again");
                    }
                }
            };

            match self.codec.interpret(&body, current)? {
                Status::Continue => {}
                Status::Ok => {
                    if reauth.take().is_some() {
                        debug!("re-login complete, replaying original request");
                    } else {
                        return Ok(());
                    }
                }
                Status::AuthExpired => {
                    // a login cannot recover its own expiry, and one re-auth
                    // chain per call is the limit
                    if current.is_login() || reauth_done {
                        return Err(Error::AuthExpired);
                    }
                    let Some(credentials) = self.credentials.clone() else {
                        return Err(Error::AuthExpired);
                    };
                    info!("session expired, re-authenticating");
                    reauth_done = true;
                    reauth = Some(Operation::login(credentials.username, credentials.password));
                }
            }
        }
    }
}
