use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::protocol::{DialStatus, ResponseStatus};

/// Messages exchanged on the dial request stream.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub enum Message {
    DialRequest(DialRequest),
    DialResponse(DialResponse),
    DialDataRequest(DialDataRequest),
    DialDataResponse(DialDataResponse),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::DialRequest(_) => "DialRequest",
            Message::DialResponse(_) => "DialResponse",
            Message::DialDataRequest(_) => "DialDataRequest",
            Message::DialDataResponse(_) => "DialDataResponse",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct DialRequest {
    /// Binary multiaddrs, high priority first.
    pub addrs: Vec<Bytes>,
    pub nonce: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct DialResponse {
    pub status: ResponseStatus,
    pub addr_idx: u32,
    pub dial_status: DialStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct DialDataRequest {
    pub addr_idx: u32,
    pub num_bytes: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct DialDataResponse {
    pub data: Bytes,
}

/// The only message on a dial-back stream.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct DialBack {
    pub nonce: u64,
}
