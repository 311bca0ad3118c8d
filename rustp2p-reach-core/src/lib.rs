//! # rust-p2p-reach-core - Boundary types for rustp2p-reach
//!
//! This crate holds everything `rustp2p-reach` needs from the outside world,
//! expressed as plain types and traits:
//!
//! - [`peer_id`] - authenticated peer identity
//! - [`addr`] - socket address to webtransport multiaddr translation
//! - [`session`] - the multiplexed-session transport (listener, upgrade
//!   requests, sessions)
//! - [`security`] - the secure-channel negotiator and certificate manager
//! - [`policy`] - connection gating and resource accounting
//! - [`host`] - protocol streams between peers
//!
//! Implementations of the traits are supplied by the embedding node; the
//! protocol logic in `rustp2p-reach` only talks to them through this crate.
//!
//! ## Translating addresses
//!
//! ```rust
//! use rust_p2p_reach_core::addr::{from_webtransport_multiaddr, to_webtransport_multiaddr};
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:4433".parse().unwrap();
//! let ma = to_webtransport_multiaddr(addr);
//! assert_eq!(ma.to_string(), "/ip4/127.0.0.1/udp/4433/quic-v1/webtransport");
//! assert_eq!(from_webtransport_multiaddr(&ma).unwrap(), addr);
//! ```

pub mod addr;
pub mod error;
pub mod host;
pub mod peer_id;
pub mod policy;
pub mod security;
pub mod session;

pub use multiaddr;
