//! Protocol streams between authenticated peers.

use std::sync::Arc;

use async_trait::async_trait;
use multiaddr::Multiaddr;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::peer_id::PeerId;

/// Per-stream resource accounting.
pub trait StreamScope: Send + Sync {
    /// Attach the stream to a named service so its usage is accounted there.
    fn set_service(&self, service: &str) -> Result<()>;
    fn reserve_memory(&self, size: usize) -> Result<()>;
    fn release_memory(&self, size: usize);
}

/// Memory reserved on a stream scope, given back on drop.
pub struct MemoryReservation {
    scope: Arc<dyn StreamScope>,
    size: usize,
}

impl MemoryReservation {
    pub fn reserve(scope: Arc<dyn StreamScope>, size: usize) -> Result<Self> {
        scope.reserve_memory(size)?;
        Ok(Self { scope, size })
    }
}

impl Drop for MemoryReservation {
    fn drop(&mut self) {
        self.scope.release_memory(self.size);
    }
}

pub trait P2pStream: AsyncRead + AsyncWrite + Send + Unpin {
    fn scope(&self) -> Arc<dyn StreamScope>;
    fn remote_peer(&self) -> PeerId;
    /// Local address of the connection this stream runs on, as observed by us.
    fn local_multiaddr(&self) -> Multiaddr;
    /// Abort the stream in both directions.
    fn reset(&mut self);
}

#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn handle(&self, stream: Box<dyn P2pStream>);
}

#[async_trait]
pub trait Host: Send + Sync {
    fn id(&self) -> PeerId;
    async fn new_stream(&self, peer: &PeerId, protocol: &str) -> Result<Box<dyn P2pStream>>;
    fn set_stream_handler(&self, protocol: &str, handler: Arc<dyn StreamHandler>);
}
