use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("multiaddr: {0}")]
    Multiaddr(#[from] multiaddr::Error),
    #[error("invalid address: {0}")]
    InvalidAddr(String),
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
    #[error("handshake: {0}")]
    Handshake(String),
    #[error("invalid peer id: len is {len}")]
    InvalidPeerId { len: usize },
}

pub type Result<T, E = Error> = ::std::result::Result<T, E>;
