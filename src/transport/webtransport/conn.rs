use std::fmt;
use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;
use multiaddr::Multiaddr;
use parking_lot::Mutex;
use rust_p2p_reach_core::peer_id::PeerId;
use rust_p2p_reach_core::policy::ScopeGuard;
use rust_p2p_reach_core::session::Session;

use crate::transport::webtransport::{ConnSecurityAddrs, WebTransport};

/// An authenticated inbound webtransport connection.
///
/// Holds the connection's resource reservation until closed. Closing is
/// idempotent and also happens on drop.
pub struct WebTransportConn {
    transport: WebTransport,
    session: Arc<dyn Session>,
    security: ConnSecurityAddrs,
    scope: Mutex<ScopeGuard>,
    closed: AtomicCell<bool>,
}

impl WebTransportConn {
    pub(crate) fn new(
        transport: WebTransport,
        session: Arc<dyn Session>,
        security: ConnSecurityAddrs,
        scope: ScopeGuard,
    ) -> Self {
        transport.add_conn(session.id(), security.remote_peer);
        Self {
            transport,
            session,
            security,
            scope: Mutex::new(scope),
            closed: AtomicCell::new(false),
        }
    }

    pub fn local_peer(&self) -> PeerId {
        self.security.local_peer
    }
    pub fn remote_peer(&self) -> PeerId {
        self.security.remote_peer
    }
    pub fn local_multiaddr(&self) -> &Multiaddr {
        &self.security.local
    }
    pub fn remote_multiaddr(&self) -> &Multiaddr {
        &self.security.remote
    }
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }
    pub fn is_closed(&self) -> bool {
        self.closed.load()
    }

    pub fn close(&self) {
        self.close_with_error(0);
    }

    pub fn close_with_error(&self, code: u32) {
        if self.closed.swap(true) {
            return;
        }
        self.transport.remove_conn(self.session.id());
        self.session.close_with_error(code, "");
        self.scope.lock().release();
    }
}

impl Drop for WebTransportConn {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for WebTransportConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebTransportConn")
            .field("session", &self.session.id())
            .field("remote_peer", &self.security.remote_peer)
            .field("remote", &self.security.remote)
            .field("closed", &self.closed.load())
            .finish()
    }
}
