use std::mem::discriminant;
use std::sync::Arc;

use bytes::Bytes;
use multiaddr::Multiaddr;
use rust_p2p_reach_core::host::{Host, MemoryReservation, P2pStream};
use rust_p2p_reach_core::peer_id::PeerId;
use tokio::io::AsyncWriteExt;
use tokio::time::{timeout_at, Instant};

use crate::autonat::dial_back::DialBackHandler;
use crate::autonat::nonce::NonceCorrelator;
use crate::autonat::{
    Reachability, ReachabilityResult, DIAL_BACK_PROTOCOL, DIAL_PROTOCOL, SERVICE_NAME,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::{
    read_msg, write_msg, DialDataRequest, DialDataResponse, DialRequest, DialResponse,
    DialStatus, Message, ResponseStatus,
};

/// Asks remote peers to dial our addresses and reports what they saw.
#[derive(Clone)]
pub struct Client {
    host: Arc<dyn Host>,
    config: ClientConfig,
    dial_data: Bytes,
    queues: NonceCorrelator,
}

impl Client {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, ClientConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: ClientConfig) -> Self {
        let dial_data = Bytes::from(vec![0u8; config.dial_data_chunk.max(1)]);
        Self {
            host,
            config,
            dial_data,
            queues: NonceCorrelator::new(),
        }
    }

    /// Install the dial-back handler on the host.
    pub fn register(&self) {
        let handler = DialBackHandler::new(
            self.queues.clone(),
            self.config.dial_back_timeout,
            self.config.max_msg_size,
        );
        self.host
            .set_stream_handler(DIAL_BACK_PROTOCOL, Arc::new(handler));
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn nonce_correlator(&self) -> &NonceCorrelator {
        &self.queues
    }

    /// Ask `peer` to dial one of `high` or `low` and report its reachability.
    ///
    /// The server may only ask for dial data on a high priority address. The
    /// returned index counts `high` first, then `low`.
    pub async fn check_reachability(
        &self,
        peer: &PeerId,
        high: &[Multiaddr],
        low: &[Multiaddr],
    ) -> Result<ReachabilityResult> {
        let deadline = Instant::now() + self.config.stream_timeout;
        let mut stream = timeout_at(deadline, self.host.new_stream(peer, DIAL_PROTOCOL))
            .await
            .map_err(|_| Error::Timeout)??;
        let scope = stream.scope();
        if let Err(e) = scope.set_service(SERVICE_NAME) {
            log::debug!("failed to attach stream to service {SERVICE_NAME}: {e}");
            stream.reset();
            return Err(e.into());
        }
        let _reservation = match MemoryReservation::reserve(scope, self.config.max_msg_size) {
            Ok(reservation) => reservation,
            Err(e) => {
                log::debug!("failed to reserve memory for stream {DIAL_PROTOCOL}: {e}");
                stream.reset();
                return Err(e.into());
            }
        };

        let nonce: u64 = rand::random();
        let mut registration = self.queues.register(nonce);

        let exchange = self.dial_request(stream.as_mut(), nonce, high, low);
        let rs = timeout_at(deadline, exchange).await;
        let response = match rs {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                stream.reset();
                return Err(e);
            }
            Err(_) => {
                stream.reset();
                return Err(Error::Timeout);
            }
        };
        match timeout_at(deadline, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::debug!("closing stream {DIAL_PROTOCOL} to {peer}: {e}");
                stream.reset();
            }
            Err(_) => {
                log::debug!("closing stream {DIAL_PROTOCOL} to {peer} timed out");
                stream.reset();
            }
        }

        match response.status {
            ResponseStatus::Ok => {}
            ResponseStatus::DialRefused => return Err(Error::DialRefused),
            status => return Err(Error::Status(status)),
        }
        if response.dial_status == DialStatus::Unused {
            return Err(Error::InvalidDialStatus);
        }

        let mut dial_back_addr = None;
        if response.dial_status == DialStatus::Ok
            && (response.addr_idx as usize) < high.len() + low.len()
        {
            let wait_until = deadline.min(Instant::now() + self.config.dial_back_timeout);
            match timeout_at(wait_until, registration.recv()).await {
                Ok(addr) => dial_back_addr = addr,
                Err(_) => log::debug!("no dial-back for nonce {nonce} from {peer}"),
            }
        }
        new_result(&response, high, low, dial_back_addr.as_ref())
    }

    async fn dial_request(
        &self,
        stream: &mut dyn P2pStream,
        nonce: u64,
        high: &[Multiaddr],
        low: &[Multiaddr],
    ) -> Result<DialResponse> {
        let addrs = high
            .iter()
            .chain(low)
            .map(|addr| Bytes::from(addr.to_vec()))
            .collect();
        let request = Message::DialRequest(DialRequest { addrs, nonce });
        write_msg(&mut *stream, &request, self.config.max_msg_size).await?;

        let max_msg_size = self.config.max_msg_size;
        match read_msg(&mut *stream, max_msg_size).await? {
            Message::DialResponse(response) => Ok(response),
            Message::DialDataRequest(request) => {
                if request.addr_idx as usize >= high.len() {
                    return Err(Error::DialDataLowPriority {
                        index: request.addr_idx,
                    });
                }
                if request.num_bytes > self.config.max_handshake_size_bytes {
                    return Err(Error::DialDataTooLarge(request.num_bytes));
                }
                self.send_dial_data(stream, &request).await?;
                match read_msg(&mut *stream, max_msg_size).await? {
                    Message::DialResponse(response) => Ok(response),
                    msg => Err(Error::UnexpectedMessage(msg.kind())),
                }
            }
            msg => Err(Error::UnexpectedMessage(msg.kind())),
        }
    }

    async fn send_dial_data(
        &self,
        stream: &mut dyn P2pStream,
        request: &DialDataRequest,
    ) -> Result<()> {
        debug_assert!(!self.dial_data.is_empty());
        let mut remain = request.num_bytes as usize;
        while remain > 0 {
            let end = remain.min(self.dial_data.len());
            let msg = Message::DialDataResponse(DialDataResponse {
                data: self.dial_data.slice(..end),
            });
            write_msg(&mut *stream, &msg, self.config.max_msg_size).await?;
            remain -= end;
        }
        Ok(())
    }
}

fn new_result(
    response: &DialResponse,
    high: &[Multiaddr],
    low: &[Multiaddr],
    dial_back_addr: Option<&Multiaddr>,
) -> Result<ReachabilityResult> {
    let idx = response.addr_idx as usize;
    let addr = match high.iter().chain(low).nth(idx) {
        Some(addr) => addr.clone(),
        None => {
            return Err(Error::AddrIndexOutOfRange {
                index: response.addr_idx,
                len: high.len() + low.len(),
            })
        }
    };

    let mut status = response.dial_status;
    let mut reachability = Reachability::Unknown;
    match status {
        DialStatus::Ok => {
            if are_addrs_consistent(dial_back_addr, Some(&addr)) {
                reachability = Reachability::Public;
            } else {
                status = DialStatus::DialBackError;
            }
        }
        DialStatus::DialError => reachability = Reachability::Private,
        _ => {}
    }
    Ok(ReachabilityResult {
        idx,
        addr,
        reachability,
        status,
    })
}

/// Two addresses are consistent when they are made of the same protocols in
/// the same order. Values are not compared and IPv4/IPv6 translation is not
/// taken into account.
pub fn are_addrs_consistent(a: Option<&Multiaddr>, b: Option<&Multiaddr>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    if a.iter().count() != b.iter().count() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(pa, pb)| discriminant(&pa) == discriminant(&pb))
}
