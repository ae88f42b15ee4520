//! Registration Authority collaborator (§6): the sink a completed
//! `Authorization` is reported back to.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::authorization::Authorization;

#[async_trait]
pub trait RegistrationAuthority: Send + Sync {
    async fn on_validation_update(&self, authz: Authorization);
}

/// Test double that forwards every reported `Authorization` onto an
/// `mpsc` channel, so tests can assert on the final state without
/// standing up a real RA.
pub struct ChannelRegistrationAuthority {
    sender: mpsc::UnboundedSender<Authorization>,
}

impl ChannelRegistrationAuthority {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Authorization>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelRegistrationAuthority { sender }, receiver)
    }
}

#[async_trait]
impl RegistrationAuthority for ChannelRegistrationAuthority {
    async fn on_validation_update(&self, authz: Authorization) {
        // A closed receiver means the test has already stopped caring;
        // nothing for the VA to do about it.
        let _ = self.sender.send(authz);
    }
}
