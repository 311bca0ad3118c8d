use std::io;

use thiserror::Error;

use crate::protocol::ResponseStatus;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] rust_p2p_reach_core::error::Error),
    #[error("closed")]
    Closed,
    #[error("timeout")]
    Timeout,
    #[error("dial request: dial refused")]
    DialRefused,
    #[error("dial request: status {0}")]
    Status(ResponseStatus),
    #[error("dial request failed: received invalid dial status 0")]
    InvalidDialStatus,
    #[error("dial data requested for low priority address: index {index}")]
    DialDataLowPriority { index: u32 },
    #[error("dial data requested too high: {0}")]
    DialDataTooLarge(u64),
    #[error("invalid msg type: {0}")]
    UnexpectedMessage(&'static str),
    #[error("addr_idx out of range: {index} 0-{len}")]
    AddrIndexOutOfRange { index: u32, len: usize },
    #[error("message too large: {len} exceeds {max}")]
    MessageTooLarge { len: usize, max: usize },
    #[error("encode: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("decode: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

impl Error {
    /// Whether the remote broke the reachability protocol, as opposed to an
    /// I/O failure or an explicit refusal.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidDialStatus
                | Error::DialDataLowPriority { .. }
                | Error::DialDataTooLarge(_)
                | Error::UnexpectedMessage(_)
                | Error::AddrIndexOutOfRange { .. }
                | Error::MessageTooLarge { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
