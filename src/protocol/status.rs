use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall outcome of a dial request, as reported by the server.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ResponseStatus {
    InternalError,
    RequestRejected,
    DialRefused,
    Ok,
    Unknown(u32),
}

impl From<u32> for ResponseStatus {
    fn from(value: u32) -> Self {
        match value {
            0 => ResponseStatus::InternalError,
            100 => ResponseStatus::RequestRejected,
            101 => ResponseStatus::DialRefused,
            200 => ResponseStatus::Ok,
            v => ResponseStatus::Unknown(v),
        }
    }
}

impl From<ResponseStatus> for u32 {
    fn from(value: ResponseStatus) -> Self {
        match value {
            ResponseStatus::InternalError => 0,
            ResponseStatus::RequestRejected => 100,
            ResponseStatus::DialRefused => 101,
            ResponseStatus::Ok => 200,
            ResponseStatus::Unknown(v) => v,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseStatus::InternalError => "E_INTERNAL_ERROR",
            ResponseStatus::RequestRejected => "E_REQUEST_REJECTED",
            ResponseStatus::DialRefused => "E_DIAL_REFUSED",
            ResponseStatus::Ok => "OK",
            ResponseStatus::Unknown(_) => "UNKNOWN",
        };
        write!(f, "{} {}", u32::from(*self), name)
    }
}

/// Outcome of dialing the one address the server picked.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DialStatus {
    /// Never valid on the wire.
    Unused,
    DialError,
    DialBackError,
    Ok,
    Unknown(u32),
}

impl From<u32> for DialStatus {
    fn from(value: u32) -> Self {
        match value {
            0 => DialStatus::Unused,
            100 => DialStatus::DialError,
            101 => DialStatus::DialBackError,
            200 => DialStatus::Ok,
            v => DialStatus::Unknown(v),
        }
    }
}

impl From<DialStatus> for u32 {
    fn from(value: DialStatus) -> Self {
        match value {
            DialStatus::Unused => 0,
            DialStatus::DialError => 100,
            DialStatus::DialBackError => 101,
            DialStatus::Ok => 200,
            DialStatus::Unknown(v) => v,
        }
    }
}
