use async_trait::async_trait;
use multiaddr::Multiaddr;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::peer_id::PeerId;
use crate::session::BiStream;

/// Extension payload carried in the secure handshake's early data.
///
/// When the transport's TLS certificates are generated on the fly, the
/// listener sends their hashes here so the dialer can bind the certificate it
/// saw at the QUIC layer to the authenticated peer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct NoiseExtensions {
    pub webtransport_certhashes: Vec<Vec<u8>>,
}

/// Result of a successful secure handshake.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecuredConn {
    pub local_peer: PeerId,
    pub remote_peer: PeerId,
}

#[async_trait]
pub trait SecureTransport: Send + Sync {
    /// Run the responder side of the handshake over `stream`.
    async fn secure_inbound(
        &self,
        stream: Box<dyn BiStream>,
        early_data: Option<NoiseExtensions>,
    ) -> Result<SecuredConn>;
}

/// Source of the dynamically generated TLS certificates.
pub trait CertManager: Send + Sync {
    fn serialized_cert_hashes(&self) -> Vec<Vec<u8>>;
    /// The `/certhash/...` components to advertise with listen addresses.
    fn addr_component(&self) -> Multiaddr;
}
