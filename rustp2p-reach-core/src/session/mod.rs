//! Boundary of the multiplexed-session transport.
//!
//! The QUIC/HTTP3 machinery lives behind these traits. A [`SessionListener`]
//! yields [`SessionRequest`]s (the HTTP-style upgrade requests), which become
//! [`Session`]s once accepted.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// A bidirectional byte stream opened inside a session.
pub trait BiStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> BiStream for T {}

/// Status codes the listener answers upgrade requests with.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u16)]
pub enum StatusCode {
    BadRequest = 400,
    Forbidden = 403,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

#[async_trait]
pub trait SessionListener: Send + Sync {
    /// Wait for the next inbound upgrade request. An error means the
    /// underlying socket is gone and no further requests will arrive.
    async fn accept(&self) -> io::Result<Box<dyn SessionRequest>>;
    fn local_addr(&self) -> SocketAddr;
    async fn close(&self);
}

#[async_trait]
pub trait SessionRequest: Send {
    /// Raw query string of the request URL, without the leading `?`.
    fn query(&self) -> &str;
    /// Remote end as reported by the HTTP layer, in `host:port` form.
    fn remote_addr(&self) -> &str;
    /// Answer the request with an error status. The request is dead afterwards.
    fn reject(&mut self, status: StatusCode);
    /// Accept the request and turn it into a session.
    async fn upgrade(&mut self) -> io::Result<Arc<dyn Session>>;
}

#[async_trait]
pub trait Session: Send + Sync {
    /// Identifier unique among the sessions of one transport.
    fn id(&self) -> u64;
    fn local_addr(&self) -> SocketAddr;
    fn remote_addr(&self) -> SocketAddr;
    /// Accept the next stream opened by the remote.
    async fn accept_stream(&self) -> io::Result<Box<dyn BiStream>>;
    fn close_with_error(&self, code: u32, reason: &str);
}
