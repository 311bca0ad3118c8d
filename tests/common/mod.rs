#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustp2p_reach::rust_p2p_reach_core::error::{Error as CoreError, Result as CoreResult};
use rustp2p_reach::rust_p2p_reach_core::host::{Host, P2pStream, StreamHandler, StreamScope};
use rustp2p_reach::rust_p2p_reach_core::multiaddr::Multiaddr;
use rustp2p_reach::rust_p2p_reach_core::peer_id::PeerId;
use rustp2p_reach::rust_p2p_reach_core::policy::{
    ConnAddrs, ConnScope, ConnectionGater, Direction, ResourceManager,
};
use rustp2p_reach::rust_p2p_reach_core::security::{
    CertManager, NoiseExtensions, SecureTransport, SecuredConn,
};
use rustp2p_reach::rust_p2p_reach_core::session::{
    BiStream, Session, SessionListener, SessionRequest, StatusCode,
};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const CERTHASH: &str = "/certhash/uEiAAAQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHw";

pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ma(s: &str) -> Multiaddr {
    s.parse().unwrap()
}

/// Poll `cond` until it holds, failing the test after a few seconds.
pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

// ---- protocol streams ----

#[derive(Default)]
pub struct CountingScope {
    pub services: Mutex<Vec<String>>,
    pub reserved: AtomicUsize,
    pub reserve_calls: AtomicUsize,
    pub deny_reserve: AtomicBool,
}

impl StreamScope for CountingScope {
    fn set_service(&self, service: &str) -> CoreResult<()> {
        self.services.lock().push(service.to_string());
        Ok(())
    }
    fn reserve_memory(&self, size: usize) -> CoreResult<()> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_reserve.load(Ordering::SeqCst) {
            return Err(CoreError::ResourceLimit("memory".into()));
        }
        self.reserved.fetch_add(size, Ordering::SeqCst);
        Ok(())
    }
    fn release_memory(&self, size: usize) {
        self.reserved.fetch_sub(size, Ordering::SeqCst);
    }
}

/// Handles a test keeps on a stream after giving it away.
#[derive(Clone)]
pub struct StreamState {
    pub scope: Arc<CountingScope>,
    pub reset: Arc<AtomicBool>,
    /// While set, closing the write side never completes.
    pub stall_shutdown: Arc<AtomicBool>,
}

impl StreamState {
    pub fn is_reset(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }
    pub fn reserved(&self) -> usize {
        self.scope.reserved.load(Ordering::SeqCst)
    }
}

pub struct MemStream {
    inner: DuplexStream,
    scope: Arc<CountingScope>,
    remote_peer: PeerId,
    local_multiaddr: Multiaddr,
    reset: Arc<AtomicBool>,
    stall_shutdown: Arc<AtomicBool>,
}

impl MemStream {
    pub fn pair(local_multiaddr: Multiaddr) -> (MemStream, MemStream) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let new = |inner| MemStream {
            inner,
            scope: Arc::new(CountingScope::default()),
            remote_peer: PeerId::random(),
            local_multiaddr: local_multiaddr.clone(),
            reset: Arc::new(AtomicBool::new(false)),
            stall_shutdown: Arc::new(AtomicBool::new(false)),
        };
        (new(a), new(b))
    }

    pub fn state(&self) -> StreamState {
        StreamState {
            scope: self.scope.clone(),
            reset: self.reset.clone(),
            stall_shutdown: self.stall_shutdown.clone(),
        }
    }
}

impl AsyncRead for MemStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MemStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }
    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.stall_shutdown.load(Ordering::SeqCst) {
            return Poll::Pending;
        }
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl P2pStream for MemStream {
    fn scope(&self) -> Arc<dyn StreamScope> {
        self.scope.clone()
    }
    fn remote_peer(&self) -> PeerId {
        self.remote_peer
    }
    fn local_multiaddr(&self) -> Multiaddr {
        self.local_multiaddr.clone()
    }
    fn reset(&mut self) {
        self.reset.store(true, Ordering::SeqCst);
    }
}

pub struct MockHost {
    id: PeerId,
    local_multiaddr: Multiaddr,
    pub deny_reserve: AtomicBool,
    pub stall_shutdown: AtomicBool,
    pub streams: Mutex<Vec<StreamState>>,
    pub handlers: Mutex<HashMap<String, Arc<dyn StreamHandler>>>,
    incoming: UnboundedSender<(String, MemStream)>,
}

impl MockHost {
    /// The receiver yields the remote half of every stream the host opens.
    pub fn new(local_multiaddr: Multiaddr) -> (Arc<Self>, UnboundedReceiver<(String, MemStream)>) {
        let (incoming, receiver) = unbounded_channel();
        let host = Arc::new(Self {
            id: PeerId::random(),
            local_multiaddr,
            deny_reserve: AtomicBool::new(false),
            stall_shutdown: AtomicBool::new(false),
            streams: Mutex::new(Vec::new()),
            handlers: Mutex::new(HashMap::new()),
            incoming,
        });
        (host, receiver)
    }

    pub fn handler(&self, protocol: &str) -> Option<Arc<dyn StreamHandler>> {
        self.handlers.lock().get(protocol).cloned()
    }

    pub fn last_stream(&self) -> StreamState {
        self.streams.lock().last().cloned().unwrap()
    }
}

#[async_trait]
impl Host for MockHost {
    fn id(&self) -> PeerId {
        self.id
    }
    async fn new_stream(&self, _peer: &PeerId, protocol: &str) -> CoreResult<Box<dyn P2pStream>> {
        let (local, remote) = MemStream::pair(self.local_multiaddr.clone());
        local
            .scope
            .deny_reserve
            .store(self.deny_reserve.load(Ordering::SeqCst), Ordering::SeqCst);
        local
            .stall_shutdown
            .store(self.stall_shutdown.load(Ordering::SeqCst), Ordering::SeqCst);
        self.streams.lock().push(local.state());
        self.incoming
            .send((protocol.to_string(), remote))
            .map_err(|_| CoreError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))?;
        Ok(Box::new(local))
    }
    fn set_stream_handler(&self, protocol: &str, handler: Arc<dyn StreamHandler>) {
        self.handlers.lock().insert(protocol.to_string(), handler);
    }
}

// ---- sessions ----

pub type RequestSender = UnboundedSender<io::Result<Box<dyn SessionRequest>>>;

pub struct MockSessionListener {
    addr: SocketAddr,
    requests: tokio::sync::Mutex<UnboundedReceiver<io::Result<Box<dyn SessionRequest>>>>,
    pub close_calls: AtomicUsize,
}

impl MockSessionListener {
    pub fn new() -> (Arc<Self>, RequestSender) {
        let (sender, receiver) = unbounded_channel();
        let listener = Arc::new(Self {
            addr: "127.0.0.1:4433".parse().unwrap(),
            requests: tokio::sync::Mutex::new(receiver),
            close_calls: AtomicUsize::new(0),
        });
        (listener, sender)
    }
}

#[async_trait]
impl SessionListener for MockSessionListener {
    async fn accept(&self) -> io::Result<Box<dyn SessionRequest>> {
        match self.requests.lock().await.recv().await {
            Some(request) => request,
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        }
    }
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }
    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockSession {
    id: u64,
    remote: SocketAddr,
    pub close_code: Mutex<Option<u32>>,
    pub close_calls: AtomicUsize,
}

impl MockSession {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            remote: format!("1.2.3.4:{}", 1000 + id).parse().unwrap(),
            close_code: Mutex::new(None),
            close_calls: AtomicUsize::new(0),
        })
    }
    pub fn close_code(&self) -> Option<u32> {
        *self.close_code.lock()
    }
}

#[async_trait]
impl Session for MockSession {
    fn id(&self) -> u64 {
        self.id
    }
    fn local_addr(&self) -> SocketAddr {
        "127.0.0.1:4433".parse().unwrap()
    }
    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
    async fn accept_stream(&self) -> io::Result<Box<dyn BiStream>> {
        let (stream, _) = tokio::io::duplex(1024);
        Ok(Box::new(stream))
    }
    fn close_with_error(&self, code: u32, _reason: &str) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        *self.close_code.lock() = Some(code);
    }
}

pub struct MockRequest {
    query: String,
    remote_addr: String,
    session: Option<Arc<MockSession>>,
    rejected: Arc<Mutex<Option<StatusCode>>>,
}

impl MockRequest {
    /// A well formed request upgrading into `session`.
    pub fn noise(session: &Arc<MockSession>) -> (Box<dyn SessionRequest>, Arc<Mutex<Option<StatusCode>>>) {
        Self::build("type=noise", "1.2.3.4:5678", Some(session.clone()))
    }

    pub fn build(
        query: &str,
        remote_addr: &str,
        session: Option<Arc<MockSession>>,
    ) -> (Box<dyn SessionRequest>, Arc<Mutex<Option<StatusCode>>>) {
        let rejected = Arc::new(Mutex::new(None));
        let request = MockRequest {
            query: query.to_string(),
            remote_addr: remote_addr.to_string(),
            session,
            rejected: rejected.clone(),
        };
        (Box::new(request), rejected)
    }
}

#[async_trait]
impl SessionRequest for MockRequest {
    fn query(&self) -> &str {
        &self.query
    }
    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }
    fn reject(&mut self, status: StatusCode) {
        *self.rejected.lock() = Some(status);
    }
    async fn upgrade(&mut self) -> io::Result<Arc<dyn Session>> {
        match &self.session {
            Some(session) => Ok(session.clone()),
            None => Err(io::Error::new(io::ErrorKind::Other, "upgrade failed")),
        }
    }
}

// ---- security ----

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NoiseMode {
    Succeed,
    Fail,
    Hang,
}

pub struct MockNoise {
    pub local_peer: PeerId,
    pub mode: Mutex<NoiseMode>,
    pub early_data: Mutex<Vec<Option<NoiseExtensions>>>,
    pub peers: Mutex<Vec<PeerId>>,
}

impl MockNoise {
    pub fn new(mode: NoiseMode) -> Arc<Self> {
        Arc::new(Self {
            local_peer: PeerId::random(),
            mode: Mutex::new(mode),
            early_data: Mutex::new(Vec::new()),
            peers: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SecureTransport for MockNoise {
    async fn secure_inbound(
        &self,
        _stream: Box<dyn BiStream>,
        early_data: Option<NoiseExtensions>,
    ) -> CoreResult<SecuredConn> {
        self.early_data.lock().push(early_data);
        let mode = *self.mode.lock();
        match mode {
            NoiseMode::Succeed => {
                let remote_peer = PeerId::random();
                self.peers.lock().push(remote_peer);
                Ok(SecuredConn {
                    local_peer: self.local_peer,
                    remote_peer,
                })
            }
            NoiseMode::Fail => Err(CoreError::Handshake("bad handshake".into())),
            NoiseMode::Hang => std::future::pending().await,
        }
    }
}

pub struct MockCertManager;

impl CertManager for MockCertManager {
    fn serialized_cert_hashes(&self) -> Vec<Vec<u8>> {
        vec![vec![1, 2, 3], vec![4, 5, 6]]
    }
    fn addr_component(&self) -> Multiaddr {
        ma(CERTHASH)
    }
}

// ---- policy ----

#[derive(Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub dones: AtomicUsize,
    pub set_peers: AtomicUsize,
}

#[derive(Default)]
pub struct CountingResourceManager {
    pub counters: Arc<Counters>,
    pub deny_open: AtomicBool,
    pub deny_peer: Arc<AtomicBool>,
}

impl CountingResourceManager {
    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }
    pub fn dones(&self) -> usize {
        self.counters.dones.load(Ordering::SeqCst)
    }
    pub fn set_peers(&self) -> usize {
        self.counters.set_peers.load(Ordering::SeqCst)
    }
}

struct CountingConnScope {
    counters: Arc<Counters>,
    deny_peer: Arc<AtomicBool>,
}

impl ConnScope for CountingConnScope {
    fn set_peer(&self, _peer: &PeerId) -> CoreResult<()> {
        if self.deny_peer.load(Ordering::SeqCst) {
            return Err(CoreError::ResourceLimit("peer".into()));
        }
        self.counters.set_peers.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn done(&self) {
        self.counters.dones.fetch_add(1, Ordering::SeqCst);
    }
}

impl ResourceManager for CountingResourceManager {
    fn open_connection(
        &self,
        direction: Direction,
        use_fd: bool,
        _remote: &Multiaddr,
    ) -> CoreResult<Box<dyn ConnScope>> {
        assert_eq!(direction, Direction::Inbound);
        assert!(!use_fd);
        if self.deny_open.load(Ordering::SeqCst) {
            return Err(CoreError::ResourceLimit("connections".into()));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingConnScope {
            counters: self.counters.clone(),
            deny_peer: self.deny_peer.clone(),
        }))
    }
}

pub struct MockGater {
    pub allow_accept: bool,
    pub allow_secured: bool,
    pub accepted: Mutex<Vec<ConnAddrs>>,
}

impl MockGater {
    pub fn new(allow_accept: bool, allow_secured: bool) -> Arc<Self> {
        Arc::new(Self {
            allow_accept,
            allow_secured,
            accepted: Mutex::new(Vec::new()),
        })
    }
}

impl ConnectionGater for MockGater {
    fn intercept_accept(&self, addrs: &ConnAddrs) -> bool {
        self.accepted.lock().push(addrs.clone());
        self.allow_accept
    }
    fn intercept_secured(&self, direction: Direction, _peer: &PeerId, _addrs: &ConnAddrs) -> bool {
        assert_eq!(direction, Direction::Inbound);
        self.allow_secured
    }
}
