use std::collections::HashMap;
use std::sync::Arc;

use multiaddr::Multiaddr;
use parking_lot::Mutex;
use tokio::sync::mpsc::{channel, Receiver, Sender};

type DialBackQueues = Arc<Mutex<HashMap<u64, Sender<Multiaddr>>>>;

/// Maps the nonce of an outstanding dial request to the slot its dial-back
/// address is delivered into.
#[derive(Clone, Default)]
pub struct NonceCorrelator {
    queues: DialBackQueues,
}

impl NonceCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a single-slot queue for `nonce`. The entry lives as long as the
    /// returned registration.
    pub fn register(&self, nonce: u64) -> DialBackRegistration {
        let (sender, receiver) = channel(1);
        self.queues.lock().insert(nonce, sender);
        DialBackRegistration {
            nonce,
            receiver,
            queues: self.queues.clone(),
        }
    }

    /// Hand `addr` to the request waiting on `nonce`, if any. Never blocks;
    /// returns false when nobody waits or the slot is already taken.
    pub fn deliver(&self, nonce: u64, addr: Multiaddr) -> bool {
        let sender = self.queues.lock().get(&nonce).cloned();
        match sender {
            Some(sender) => sender.try_send(addr).is_ok(),
            None => false,
        }
    }

    pub fn contains(&self, nonce: u64) -> bool {
        self.queues.lock().contains_key(&nonce)
    }

    pub fn len(&self) -> usize {
        self.queues.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct DialBackRegistration {
    nonce: u64,
    receiver: Receiver<Multiaddr>,
    queues: DialBackQueues,
}

impl DialBackRegistration {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub async fn recv(&mut self) -> Option<Multiaddr> {
        self.receiver.recv().await
    }
}

impl Drop for DialBackRegistration {
    fn drop(&mut self) {
        self.queues.lock().remove(&self.nonce);
    }
}
