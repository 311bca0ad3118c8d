use std::time::Duration;

use async_trait::async_trait;
use rust_p2p_reach_core::host::{MemoryReservation, P2pStream, StreamHandler};
use tokio::io::AsyncWriteExt;

use crate::autonat::nonce::NonceCorrelator;
use crate::autonat::{DIAL_BACK_PROTOCOL, SERVICE_NAME};
use crate::error::Error;
use crate::protocol::{read_msg, DialBack};

/// Serves inbound dial-back streams and hands the address they arrived on
/// to the request that is waiting for them.
pub struct DialBackHandler {
    queues: NonceCorrelator,
    timeout: Duration,
    max_msg_size: usize,
}

impl DialBackHandler {
    pub fn new(queues: NonceCorrelator, timeout: Duration, max_msg_size: usize) -> Self {
        Self {
            queues,
            timeout,
            max_msg_size,
        }
    }
}

#[async_trait]
impl StreamHandler for DialBackHandler {
    async fn handle(&self, mut stream: Box<dyn P2pStream>) {
        let scope = stream.scope();
        if let Err(e) = scope.set_service(SERVICE_NAME) {
            log::debug!("failed to attach stream to service {SERVICE_NAME}: {e}");
            stream.reset();
            return;
        }
        let _reservation = match MemoryReservation::reserve(scope, self.max_msg_size) {
            Ok(reservation) => reservation,
            Err(e) => {
                log::debug!("failed to reserve memory for stream {DIAL_BACK_PROTOCOL}: {e}");
                stream.reset();
                return;
            }
        };

        let rs = tokio::time::timeout(
            self.timeout,
            read_msg::<_, DialBack>(stream.as_mut(), self.max_msg_size),
        )
        .await
        .unwrap_or(Err(Error::Timeout));
        let msg = match rs {
            Ok(msg) => msg,
            Err(e) => {
                log::debug!(
                    "failed to read dial-back msg from {}: {e}",
                    stream.remote_peer()
                );
                stream.reset();
                return;
            }
        };
        if !self.queues.deliver(msg.nonce, stream.local_multiaddr()) {
            log::debug!("dropped dial-back with nonce {}", msg.nonce);
        }
        match tokio::time::timeout(self.timeout, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::debug!("closing dial-back stream from {}: {e}", stream.remote_peer());
                stream.reset();
            }
            Err(_) => {
                log::debug!("closing dial-back stream from {} timed out", stream.remote_peer());
                stream.reset();
            }
        }
    }
}
