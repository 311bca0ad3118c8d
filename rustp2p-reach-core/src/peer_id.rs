use std::fmt;

use crate::error::Error;

pub const PEER_ID_LEN: usize = 32;

/// Identity of a remote peer, as authenticated by the secure channel.
///
/// `PeerId` is the 32-byte digest of the peer's public key. It is only ever
/// trusted after a successful handshake; before that, sessions are known by
/// their addresses alone.
///
/// # Examples
///
/// ```rust
/// use rust_p2p_reach_core::peer_id::PeerId;
///
/// let id = PeerId::from([7u8; 32]);
/// let parsed: PeerId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[repr(transparent)]
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    /// Returns a random PeerId, mostly useful for tests and ephemeral identities.
    pub fn random() -> PeerId {
        PeerId(rand::random())
    }

    pub fn is_unspecified(&self) -> bool {
        self.0.iter().all(|v| *v == 0)
    }
}

impl AsRef<[u8]> for PeerId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PEER_ID_LEN]> for PeerId {
    fn from(value: [u8; PEER_ID_LEN]) -> Self {
        PeerId(value)
    }
}

impl From<PeerId> for [u8; PEER_ID_LEN] {
    fn from(value: PeerId) -> Self {
        value.0
    }
}

impl TryFrom<&[u8]> for PeerId {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let buf: [u8; PEER_ID_LEN] = value
            .try_into()
            .map_err(|_| Error::InvalidPeerId { len: value.len() })?;
        Ok(PeerId(buf))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PeerId {
    // short form, logs only need to tell peers apart
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId(")?;
        for b in &self.0[..6] {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

impl std::str::FromStr for PeerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != PEER_ID_LEN * 2 || !s.is_ascii() {
            return Err(Error::InvalidPeerId { len: s.len() / 2 });
        }
        let mut buf = [0u8; PEER_ID_LEN];
        for (i, v) in buf.iter_mut().enumerate() {
            *v = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidPeerId { len: PEER_ID_LEN })?;
        }
        Ok(PeerId(buf))
    }
}
