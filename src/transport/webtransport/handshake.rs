use multiaddr::Multiaddr;
use rust_p2p_reach_core::addr::to_webtransport_multiaddr;
use rust_p2p_reach_core::peer_id::PeerId;
use rust_p2p_reach_core::policy::ConnAddrs;
use rust_p2p_reach_core::security::NoiseExtensions;
use rust_p2p_reach_core::session::Session;

use crate::error::Result;
use crate::transport::webtransport::WebTransport;

/// Identities and addresses of an authenticated session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnSecurityAddrs {
    pub local_peer: PeerId,
    pub remote_peer: PeerId,
    pub local: Multiaddr,
    pub remote: Multiaddr,
}

impl ConnSecurityAddrs {
    pub fn conn_addrs(&self) -> ConnAddrs {
        ConnAddrs {
            local: self.local.clone(),
            remote: self.remote.clone(),
        }
    }
}

/// Run the responder side of the secure handshake on the first stream the
/// remote opens.
pub(crate) async fn handshake(
    transport: &WebTransport,
    session: &dyn Session,
    static_tls: bool,
) -> Result<ConnSecurityAddrs> {
    let local = to_webtransport_multiaddr(session.local_addr());
    let remote = to_webtransport_multiaddr(session.remote_addr());

    let stream = session.accept_stream().await?;
    let early_data = match transport.cert_manager() {
        Some(cert_manager) if !static_tls => Some(NoiseExtensions {
            webtransport_certhashes: cert_manager.serialized_cert_hashes(),
        }),
        _ => None,
    };
    let secured = transport.noise().secure_inbound(stream, early_data).await?;
    Ok(ConnSecurityAddrs {
        local_peer: secured.local_peer,
        remote_peer: secured.remote_peer,
        local,
        remote,
    })
}
