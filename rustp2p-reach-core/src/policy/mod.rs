//! Admission control and resource accounting collaborators.

use multiaddr::Multiaddr;

use crate::error::Result;
use crate::peer_id::PeerId;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnAddrs {
    pub local: Multiaddr,
    pub remote: Multiaddr,
}

pub trait ConnectionGater: Send + Sync {
    /// Called before any resources are spent on an inbound connection.
    fn intercept_accept(&self, addrs: &ConnAddrs) -> bool;
    /// Called once the remote peer has been authenticated.
    fn intercept_secured(&self, direction: Direction, peer: &PeerId, addrs: &ConnAddrs) -> bool;
}

pub trait ResourceManager: Send + Sync {
    fn open_connection(
        &self,
        direction: Direction,
        use_fd: bool,
        remote: &Multiaddr,
    ) -> Result<Box<dyn ConnScope>>;
}

pub trait ConnScope: Send + Sync {
    fn set_peer(&self, peer: &PeerId) -> Result<()>;
    /// Release the reservation. Must be called exactly once.
    fn done(&self);
}

/// Owns a connection reservation and releases it exactly once, either
/// through [`ScopeGuard::release`] or on drop.
pub struct ScopeGuard {
    scope: Option<Box<dyn ConnScope>>,
}

impl ScopeGuard {
    pub fn new(scope: Box<dyn ConnScope>) -> Self {
        Self { scope: Some(scope) }
    }

    pub fn set_peer(&self, peer: &PeerId) -> Result<()> {
        match &self.scope {
            Some(scope) => scope.set_peer(peer),
            None => Ok(()),
        }
    }

    pub fn release(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.done();
        }
    }

    pub fn is_released(&self) -> bool {
        self.scope.is_none()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A resource manager without limits.
#[derive(Copy, Clone, Default, Debug)]
pub struct NullResourceManager;

struct NullScope;

impl ConnScope for NullScope {
    fn set_peer(&self, _peer: &PeerId) -> Result<()> {
        Ok(())
    }
    fn done(&self) {}
}

impl ResourceManager for NullResourceManager {
    fn open_connection(
        &self,
        _direction: Direction,
        _use_fd: bool,
        _remote: &Multiaddr,
    ) -> Result<Box<dyn ConnScope>> {
        Ok(Box::new(NullScope))
    }
}
