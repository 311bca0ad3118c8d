//! Inbound side of the webtransport transport.
//!
//! Sessions handed over by the HTTP/3 layer are admitted, authenticated with
//! a secure handshake and queued for [`Listener::accept`].

use std::sync::Arc;

use dashmap::DashMap;
use rust_p2p_reach_core::peer_id::PeerId;
use rust_p2p_reach_core::policy::{ConnectionGater, NullResourceManager, ResourceManager};
use rust_p2p_reach_core::security::{CertManager, SecureTransport};
use rust_p2p_reach_core::session::SessionListener;

use crate::config::ListenerConfig;

mod conn;
mod handshake;
mod listener;

pub use conn::WebTransportConn;
pub use handshake::ConnSecurityAddrs;
pub use listener::Listener;

/// Session close code used when the gater refuses an authenticated peer
/// ("GATE" in ASCII).
pub const ERROR_CODE_CONNECTION_GATING: u32 = 0x47415445;

#[derive(Clone)]
pub struct WebTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    gater: Option<Arc<dyn ConnectionGater>>,
    rcmgr: Arc<dyn ResourceManager>,
    noise: Arc<dyn SecureTransport>,
    cert_manager: Option<Arc<dyn CertManager>>,
    conns: DashMap<u64, PeerId>,
}

impl WebTransport {
    pub fn builder(noise: Arc<dyn SecureTransport>) -> WebTransportBuilder {
        WebTransportBuilder {
            gater: None,
            rcmgr: None,
            noise,
            cert_manager: None,
        }
    }

    /// Start accepting sessions from `session_listener`.
    ///
    /// Must be called within a tokio runtime.
    pub fn listen(
        &self,
        session_listener: Arc<dyn SessionListener>,
        config: ListenerConfig,
    ) -> Listener {
        Listener::new(self.clone(), session_listener, config)
    }

    pub(crate) fn gater(&self) -> Option<&Arc<dyn ConnectionGater>> {
        self.inner.gater.as_ref()
    }
    pub(crate) fn resource_manager(&self) -> &Arc<dyn ResourceManager> {
        &self.inner.rcmgr
    }
    pub(crate) fn noise(&self) -> &Arc<dyn SecureTransport> {
        &self.inner.noise
    }
    pub(crate) fn cert_manager(&self) -> Option<&Arc<dyn CertManager>> {
        self.inner.cert_manager.as_ref()
    }

    pub(crate) fn add_conn(&self, session_id: u64, peer: PeerId) {
        self.inner.conns.insert(session_id, peer);
    }
    pub(crate) fn remove_conn(&self, session_id: u64) {
        self.inner.conns.remove(&session_id);
    }

    /// Peer of the established connection running on `session_id`.
    pub fn conn_peer(&self, session_id: u64) -> Option<PeerId> {
        self.inner.conns.get(&session_id).map(|v| *v.value())
    }
    /// Number of established connections that are not closed yet.
    pub fn conn_count(&self) -> usize {
        self.inner.conns.len()
    }
}

pub struct WebTransportBuilder {
    gater: Option<Arc<dyn ConnectionGater>>,
    rcmgr: Option<Arc<dyn ResourceManager>>,
    noise: Arc<dyn SecureTransport>,
    cert_manager: Option<Arc<dyn CertManager>>,
}

impl WebTransportBuilder {
    pub fn gater(mut self, gater: Arc<dyn ConnectionGater>) -> Self {
        self.gater = Some(gater);
        self
    }
    pub fn resource_manager(mut self, rcmgr: Arc<dyn ResourceManager>) -> Self {
        self.rcmgr = Some(rcmgr);
        self
    }
    /// Set when the TLS certificates are generated by the transport.
    pub fn cert_manager(mut self, cert_manager: Arc<dyn CertManager>) -> Self {
        self.cert_manager = Some(cert_manager);
        self
    }
    pub fn build(self) -> WebTransport {
        WebTransport {
            inner: Arc::new(TransportInner {
                gater: self.gater,
                rcmgr: self.rcmgr.unwrap_or_else(|| Arc::new(NullResourceManager)),
                noise: self.noise,
                cert_manager: self.cert_manager,
                conns: DashMap::new(),
            }),
        }
    }
}
