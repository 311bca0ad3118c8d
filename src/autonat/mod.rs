//! AutoNAT v2 client: verifies that local addresses are reachable by asking
//! a remote peer to dial them back.
//!
//! The remote answers on the dial request stream and, for a successful dial,
//! opens a separate dial-back stream carrying the request's nonce. The two
//! are joined through the [`NonceCorrelator`].

use std::fmt;

use multiaddr::Multiaddr;

use crate::protocol::DialStatus;

mod client;
mod dial_back;
mod nonce;

pub use client::{are_addrs_consistent, Client};
pub use dial_back::DialBackHandler;
pub use nonce::{DialBackRegistration, NonceCorrelator};

pub const SERVICE_NAME: &str = "libp2p.autonatv2";
pub const DIAL_PROTOCOL: &str = "/libp2p/autonat/2/dial-request";
pub const DIAL_BACK_PROTOCOL: &str = "/libp2p/autonat/2/dial-back";

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Reachability {
    #[default]
    Unknown,
    Public,
    Private,
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reachability::Unknown => write!(f, "unknown"),
            Reachability::Public => write!(f, "public"),
            Reachability::Private => write!(f, "private"),
        }
    }
}

/// Outcome of one reachability check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReachabilityResult {
    /// Index of the dialed address, counting high priority addresses first.
    pub idx: usize,
    pub addr: Multiaddr,
    pub reachability: Reachability,
    pub status: DialStatus,
}
