//! PeerHub: the connected-client set.
//!
//! Each WebSocket connection registers here and gets an unbounded channel;
//! the socket task drains it onto the wire.  Broadcasting only pushes into
//! channels, so the frame loop never waits on the network.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use hand_gesture::Transport;

#[derive(Default)]
pub struct PeerHub {
    peers: Mutex<HashMap<Uuid, mpsc::UnboundedSender<String>>>,
}

impl PeerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client; the receiver yields every broadcast payload.
    pub fn on_peer_connected(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let count = {
            let mut peers = self.lock();
            peers.insert(id, tx);
            peers.len()
        };
        info!(peer = %id, peers = count, "client connected");
        (id, rx)
    }

    /// Returns `false` if the peer was already gone (e.g. pruned).
    pub fn on_peer_disconnected(&self, id: &Uuid) -> bool {
        let (removed, count) = {
            let mut peers = self.lock();
            (peers.remove(id).is_some(), peers.len())
        };
        if removed {
            info!(peer = %id, peers = count, "client disconnected");
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::UnboundedSender<String>>> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for PeerHub {
    /// Queue `payload` for every peer.  Peers whose socket task has ended
    /// are dropped from the set.
    fn broadcast(&self, payload: &str) {
        let mut peers = self.lock();
        peers.retain(|id, tx| match tx.send(payload.to_string()) {
            Ok(()) => true,
            Err(_) => {
                warn!(peer = %id, "peer channel closed, dropping peer");
                false
            }
        });
    }

    fn peer_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_and_disconnect_track_count() {
        let hub = PeerHub::new();
        let (a, _rx_a) = hub.on_peer_connected();
        let (b, _rx_b) = hub.on_peer_connected();
        assert_eq!(hub.peer_count(), 2);
        assert!(hub.on_peer_disconnected(&a));
        assert!(!hub.on_peer_disconnected(&a));
        assert_eq!(hub.peer_count(), 1);
        assert!(hub.on_peer_disconnected(&b));
        assert_eq!(hub.peer_count(), 0);
    }

    #[test]
    fn broadcast_reaches_every_peer() {
        let hub = PeerHub::new();
        let (_, mut rx_a) = hub.on_peer_connected();
        let (_, mut rx_b) = hub.on_peer_connected();
        hub.broadcast("OPEN_PALM");
        assert_eq!(rx_a.try_recv().unwrap(), "OPEN_PALM");
        assert_eq!(rx_b.try_recv().unwrap(), "OPEN_PALM");
    }

    #[test]
    fn closed_peer_is_pruned_on_broadcast() {
        let hub = PeerHub::new();
        let (_, rx_dead) = hub.on_peer_connected();
        let (_, mut rx_live) = hub.on_peer_connected();
        drop(rx_dead);
        hub.broadcast("FIST");
        assert_eq!(hub.peer_count(), 1);
        assert_eq!(rx_live.try_recv().unwrap(), "FIST");
    }

    #[test]
    fn concurrent_connects_are_not_lost() {
        use std::sync::Arc;
        use std::thread;

        let hub = Arc::new(PeerHub::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || hub.on_peer_connected())
            })
            .collect();
        let receivers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(hub.peer_count(), 16);
        drop(receivers);
    }
}
