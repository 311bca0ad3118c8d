use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_shutdown::ShutdownManager;
use multiaddr::Multiaddr;
use rust_p2p_reach_core::addr::{
    encapsulate, string_to_webtransport_multiaddr, to_webtransport_multiaddr,
};
use rust_p2p_reach_core::policy::{ConnAddrs, Direction, ScopeGuard};
use rust_p2p_reach_core::session::{SessionListener, SessionRequest, StatusCode};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::task::JoinHandle;

use crate::config::ListenerConfig;
use crate::error::{Error, Result};
use crate::transport::webtransport::handshake::handshake;
use crate::transport::webtransport::{
    WebTransport, WebTransportConn, ERROR_CODE_CONNECTION_GATING,
};

pub struct Listener {
    transport: WebTransport,
    shutdown_manager: ShutdownManager<()>,
    session_listener: Arc<dyn SessionListener>,
    addr: SocketAddr,
    multiaddr: Multiaddr,
    static_tls: bool,
    queue: tokio::sync::Mutex<Receiver<WebTransportConn>>,
    accept_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Listener {
    pub(crate) fn new(
        transport: WebTransport,
        session_listener: Arc<dyn SessionListener>,
        config: ListenerConfig,
    ) -> Self {
        let addr = session_listener.local_addr();
        let multiaddr = to_webtransport_multiaddr(addr);
        let shutdown_manager = ShutdownManager::<()>::new();
        let (sender, receiver) = channel(config.queue_len.max(1));
        let upgrader = Upgrader {
            transport: transport.clone(),
            shutdown_manager: shutdown_manager.clone(),
            multiaddr: multiaddr.clone(),
            handshake_timeout: config.handshake_timeout,
            static_tls: config.static_tls,
            sender,
        };
        let accept_task = tokio::spawn(accept_loop(
            session_listener.clone(),
            shutdown_manager.clone(),
            upgrader,
        ));
        Self {
            transport,
            shutdown_manager,
            session_listener,
            addr,
            multiaddr,
            static_tls: config.static_tls,
            queue: tokio::sync::Mutex::new(receiver),
            accept_task: parking_lot::Mutex::new(Some(accept_task)),
        }
    }

    /// Wait for the next established connection, in the order they were
    /// established. Returns [`Error::Closed`] once the listener is shut down.
    pub async fn accept(&self) -> Result<WebTransportConn> {
        if self.shutdown_manager.is_shutdown_triggered() {
            return Err(Error::Closed);
        }
        let mut queue = self.queue.lock().await;
        match self.shutdown_manager.wrap_cancel(queue.recv()).await {
            Ok(Some(conn)) => Ok(conn),
            _ => Err(Error::Closed),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn multiaddrs(&self) -> Vec<Multiaddr> {
        match self.transport.cert_manager() {
            Some(cert_manager) if !self.static_tls => {
                vec![encapsulate(&self.multiaddr, &cert_manager.addr_component())]
            }
            _ => vec![self.multiaddr.clone()],
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown_manager.is_shutdown_triggered()
    }

    /// Stop accepting sessions and wait for the accept loop to exit.
    pub async fn close(&self) {
        _ = self.shutdown_manager.trigger_shutdown(());
        self.session_listener.close().await;
        let accept_task = self.accept_task.lock().take();
        if let Some(accept_task) = accept_task {
            if let Err(e) = accept_task.await {
                log::warn!("webtransport accept loop {}: {e}", self.addr);
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        _ = self.shutdown_manager.trigger_shutdown(());
    }
}

async fn accept_loop(
    session_listener: Arc<dyn SessionListener>,
    shutdown_manager: ShutdownManager<()>,
    upgrader: Upgrader,
) {
    loop {
        let request = match shutdown_manager.wrap_cancel(session_listener.accept()).await {
            Ok(Ok(request)) => request,
            Ok(Err(e)) => {
                log::debug!("serving failed {}: {e}", session_listener.local_addr());
                break;
            }
            Err(_) => break,
        };
        let upgrader = upgrader.clone();
        tokio::spawn(async move { upgrader.handle(request).await });
    }
    _ = shutdown_manager.trigger_shutdown(());
}

#[derive(Clone)]
struct Upgrader {
    transport: WebTransport,
    shutdown_manager: ShutdownManager<()>,
    multiaddr: Multiaddr,
    handshake_timeout: Duration,
    static_tls: bool,
    sender: Sender<WebTransportConn>,
}

impl Upgrader {
    async fn handle(&self, mut request: Box<dyn SessionRequest>) {
        if !is_noise_query(request.query()) {
            request.reject(StatusCode::BadRequest);
            return;
        }
        let remote = match string_to_webtransport_multiaddr(request.remote_addr()) {
            Ok(remote) => remote,
            Err(e) => {
                log::error!("converting remote address {} failed: {e}", request.remote_addr());
                request.reject(StatusCode::InternalServerError);
                return;
            }
        };
        if let Some(gater) = self.transport.gater() {
            let addrs = ConnAddrs {
                local: self.multiaddr.clone(),
                remote: remote.clone(),
            };
            if !gater.intercept_accept(&addrs) {
                request.reject(StatusCode::Forbidden);
                return;
            }
        }

        let rcmgr = self.transport.resource_manager();
        let mut scope = match rcmgr.open_connection(Direction::Inbound, false, &remote) {
            Ok(scope) => ScopeGuard::new(scope),
            Err(e) => {
                log::debug!(
                    "resource manager blocked incoming connection {}: {e}",
                    request.remote_addr()
                );
                request.reject(StatusCode::ServiceUnavailable);
                return;
            }
        };

        let session = match request.upgrade().await {
            Ok(session) => session,
            Err(e) => {
                log::debug!("upgrade failed {}: {e}", request.remote_addr());
                request.reject(StatusCode::InternalServerError);
                scope.release();
                return;
            }
        };

        let rs = self
            .shutdown_manager
            .wrap_cancel(tokio::time::timeout(
                self.handshake_timeout,
                handshake(&self.transport, session.as_ref(), self.static_tls),
            ))
            .await;
        let security = match rs {
            Ok(Ok(Ok(security))) => security,
            rs => {
                let e = match rs {
                    Ok(Ok(Err(e))) => e,
                    Ok(Err(_)) => Error::Timeout,
                    _ => Error::Closed,
                };
                log::debug!("handshake failed {}: {e}", request.remote_addr());
                session.close_with_error(1, "");
                scope.release();
                return;
            }
        };

        if let Some(gater) = self.transport.gater() {
            let addrs = security.conn_addrs();
            if !gater.intercept_secured(Direction::Inbound, &security.remote_peer, &addrs) {
                session.close_with_error(ERROR_CODE_CONNECTION_GATING, "");
                scope.release();
                return;
            }
        }

        if let Err(e) = scope.set_peer(&security.remote_peer) {
            log::debug!(
                "resource manager blocked incoming connection for peer {} {}: {e}",
                security.remote_peer,
                request.remote_addr()
            );
            session.close_with_error(1, "");
            scope.release();
            return;
        }

        let peer = security.remote_peer;
        let conn = WebTransportConn::new(self.transport.clone(), session, security, scope);
        match self.sender.try_send(conn) {
            Ok(()) => {}
            Err(TrySendError::Full(conn)) => {
                log::debug!(
                    "accept queue full, dropping incoming connection {peer} {}",
                    request.remote_addr()
                );
                conn.close_with_error(1);
            }
            Err(TrySendError::Closed(conn)) => {
                log::debug!("listener closed, dropping incoming connection {peer}");
                conn.close_with_error(1);
            }
        }
    }
}

/// The upgrade request must carry exactly one `type=noise` query parameter.
fn is_noise_query(query: &str) -> bool {
    let mut types = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "type")
        .map(|(_, value)| value);
    matches!((types.next(), types.next()), (Some(v), None) if v == "noise")
}
