//! Translation between socket addresses and webtransport multiaddrs.
//!
//! A webtransport address has the shape
//! `/ip4/<ip>/udp/<port>/quic-v1/webtransport`, optionally followed by
//! `/certhash/<hash>` components and a trailing `/p2p/<id>`.

use std::net::{IpAddr, SocketAddr};

use multiaddr::{Multiaddr, Protocol};

use crate::error::{Error, Result};

/// Build the webtransport multiaddr for a UDP socket address.
pub fn to_webtransport_multiaddr(addr: SocketAddr) -> Multiaddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) => Protocol::Ip4(ip),
        IpAddr::V6(ip) => Protocol::Ip6(ip),
    };
    Multiaddr::empty()
        .with(ip)
        .with(Protocol::Udp(addr.port()))
        .with(Protocol::QuicV1)
        .with(Protocol::WebTransport)
}

/// Parse a `host:port` string, as reported by the HTTP layer for a request's
/// remote end, into a webtransport multiaddr.
pub fn string_to_webtransport_multiaddr(addr: &str) -> Result<Multiaddr> {
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::InvalidAddr(format!("{addr}: {e}")))?;
    Ok(to_webtransport_multiaddr(socket_addr))
}

/// Extract the UDP socket address from a webtransport multiaddr.
///
/// Trailing certhash and p2p components are accepted and ignored; anything
/// else makes the address invalid.
pub fn from_webtransport_multiaddr(addr: &Multiaddr) -> Result<SocketAddr> {
    let invalid = || Error::InvalidAddr(format!("not a webtransport multiaddr: {addr}"));
    let mut iter = addr.iter();
    let ip: IpAddr = match iter.next() {
        Some(Protocol::Ip4(ip)) => ip.into(),
        Some(Protocol::Ip6(ip)) => ip.into(),
        _ => return Err(invalid()),
    };
    let port = match iter.next() {
        Some(Protocol::Udp(port)) => port,
        _ => return Err(invalid()),
    };
    if !matches!(iter.next(), Some(Protocol::QuicV1)) {
        return Err(invalid());
    }
    if !matches!(iter.next(), Some(Protocol::WebTransport)) {
        return Err(invalid());
    }
    for rest in iter {
        match rest {
            Protocol::Certhash(_) | Protocol::P2p(_) => {}
            _ => return Err(invalid()),
        }
    }
    Ok(SocketAddr::new(ip, port))
}

pub fn is_webtransport_multiaddr(addr: &Multiaddr) -> bool {
    from_webtransport_multiaddr(addr).is_ok()
}

/// Append every component of `suffix` to `base`.
pub fn encapsulate(base: &Multiaddr, suffix: &Multiaddr) -> Multiaddr {
    let mut addr = base.clone();
    for p in suffix.iter() {
        addr.push(p);
    }
    addr
}
