use std::time::Duration;

pub(crate) const ACCEPT_QUEUE_LEN: usize = 16;
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const STREAM_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const DIAL_BACK_STREAM_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const MAX_MSG_SIZE: usize = 8192;
pub(crate) const MAX_HANDSHAKE_SIZE_BYTES: u64 = 100_000;
pub(crate) const DIAL_DATA_CHUNK: usize = 4096;

#[derive(Clone, Debug)]
pub struct ListenerConfig {
    pub queue_len: usize,
    pub handshake_timeout: Duration,
    /// The TLS certificate was supplied by the caller rather than generated,
    /// so there are no certificate hashes to announce.
    pub static_tls: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            queue_len: ACCEPT_QUEUE_LEN,
            handshake_timeout: HANDSHAKE_TIMEOUT,
            static_tls: false,
        }
    }
}

impl ListenerConfig {
    pub fn set_queue_len(mut self, queue_len: usize) -> Self {
        self.queue_len = queue_len.max(1);
        self
    }
    pub fn set_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }
    pub fn set_static_tls(mut self, static_tls: bool) -> Self {
        self.static_tls = static_tls;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Upper bound for a whole dial request exchange.
    pub stream_timeout: Duration,
    /// How long to wait for the dial-back after the server reported success.
    /// Also bounds reading an inbound dial-back message.
    pub dial_back_timeout: Duration,
    pub max_msg_size: usize,
    /// Largest amount of dial data we agree to send for one request.
    pub max_handshake_size_bytes: u64,
    pub dial_data_chunk: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            stream_timeout: STREAM_TIMEOUT,
            dial_back_timeout: DIAL_BACK_STREAM_TIMEOUT,
            max_msg_size: MAX_MSG_SIZE,
            max_handshake_size_bytes: MAX_HANDSHAKE_SIZE_BYTES,
            dial_data_chunk: DIAL_DATA_CHUNK,
        }
    }
}

impl ClientConfig {
    pub fn set_stream_timeout(mut self, stream_timeout: Duration) -> Self {
        self.stream_timeout = stream_timeout;
        self
    }
    pub fn set_dial_back_timeout(mut self, dial_back_timeout: Duration) -> Self {
        self.dial_back_timeout = dial_back_timeout;
        self
    }
    pub fn set_max_msg_size(mut self, max_msg_size: usize) -> Self {
        self.max_msg_size = max_msg_size;
        self
    }
    pub fn set_max_handshake_size_bytes(mut self, max_handshake_size_bytes: u64) -> Self {
        self.max_handshake_size_bytes = max_handshake_size_bytes;
        self
    }
    pub fn set_dial_data_chunk(mut self, dial_data_chunk: usize) -> Self {
        self.dial_data_chunk = dial_data_chunk.max(1);
        self
    }
}
