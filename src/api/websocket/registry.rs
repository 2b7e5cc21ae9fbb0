//! Registry of connected dashboard clients

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

/// Identifier of one accepted socket upgrade
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client_{}", self.0)
    }
}

/// Output sinks of every live connection.
///
/// Add, remove and the broadcast snapshot all happen under one mutex; the
/// sends themselves run outside it.
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    queue: usize,
}

impl ClientRegistry {
    /// `queue` is the number of frames buffered per client
    pub fn new(queue: usize) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue: queue.max(1),
        }
    }

    /// Register a new client and return its ID + frame receiver
    pub fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(self.queue);
        self.clients.lock().insert(id, tx);
        (id, rx)
    }

    /// Remove a client. Returns false if it was already gone.
    pub fn unregister(&self, id: &ClientId) -> bool {
        self.clients.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.lock().contains_key(id)
    }

    /// Number of connected clients
    pub fn count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send `frame` to every registered client, returning how many got it.
    ///
    /// Clients whose receiver has been dropped are removed.
    pub async fn broadcast(&self, frame: &str) -> usize {
        let targets: Vec<(ClientId, mpsc::Sender<String>)> = self
            .clients
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            if tx.send(frame.to_string()).await.is_ok() {
                delivered += 1;
            } else if self.unregister(&id) {
                debug!(client_id = %id, "dropped closed client during broadcast");
            }
        }
        delivered
    }
}
