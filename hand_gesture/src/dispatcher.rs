//! Per-label cooldown gate in front of the transport.
//!
//! The [`Dispatcher`] is shared between the frame loop (which calls
//! [`Dispatcher::dispatch`]) and anything that wants to inspect cooldowns,
//! so the cooldown map lives behind a mutex.  The lookup and the update of
//! one label happen under a single lock acquisition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::DispatchConfig;
use crate::event::GestureEvent;

// ════════════════════════════════════════════════════════════════════════════
// Transport: the outbound seam
// ════════════════════════════════════════════════════════════════════════════

/// Whatever delivers labels to connected consumers.
///
/// `broadcast` is fire-and-forget: delivery failures are the transport's
/// business and are never reported back to the dispatcher.
pub trait Transport: Send + Sync {
    fn broadcast(&self, payload: &str);
    fn peer_count(&self) -> usize;
}

// ════════════════════════════════════════════════════════════════════════════
// CooldownState
// ════════════════════════════════════════════════════════════════════════════

/// Last successful dispatch time per label.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_sent: HashMap<GestureEvent, Instant>,
}

impl CooldownState {
    pub fn last_sent(&self, event: GestureEvent) -> Option<Instant> {
        self.last_sent.get(&event).copied()
    }

    /// Record `now` for `event` unless the label was sent less than
    /// `window` ago.  A `now` earlier than the recorded time counts as
    /// inside the window.
    pub fn try_acquire(&mut self, event: GestureEvent, now: Instant, window: Duration) -> bool {
        if let Some(&last) = self.last_sent.get(&event) {
            let inside = now
                .checked_duration_since(last)
                .map_or(true, |elapsed| elapsed < window);
            if inside {
                return false;
            }
        }
        self.last_sent.insert(event, now);
        true
    }

    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ════════════════════════════════════════════════════════════════════════════

pub struct Dispatcher<T: Transport + ?Sized> {
    config:    DispatchConfig,
    cooldowns: Mutex<CooldownState>,
    transport: Arc<T>,
}

impl<T: Transport + ?Sized> Dispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_config(transport, DispatchConfig::default())
    }

    pub fn with_config(transport: Arc<T>, config: DispatchConfig) -> Self {
        Dispatcher {
            config,
            cooldowns: Mutex::new(CooldownState::default()),
            transport,
        }
    }

    /// Forward `event` unless the same label went out within the cooldown
    /// window.
    ///
    /// An admitted event consumes the cooldown even when nobody is
    /// connected, so a burst of identical gestures is not replayed the
    /// moment a client (re)connects.  Returns `true` only when the label
    /// was actually broadcast.
    pub fn dispatch(&self, event: GestureEvent, now: Instant) -> bool {
        let admitted = self.lock().try_acquire(event, now, self.config.cooldown);
        if !admitted {
            debug!(gesture = %event, "suppressed by cooldown");
            return false;
        }

        let peers = self.transport.peer_count();
        if peers == 0 {
            debug!(gesture = %event, "no peers connected, not sent");
            return false;
        }

        self.transport.broadcast(event.as_str());
        info!(gesture = %event, peers, "gesture sent");
        true
    }

    pub fn last_sent(&self, event: GestureEvent) -> Option<Instant> {
        self.lock().last_sent(event)
    }

    /// Copy of the whole cooldown map.
    pub fn cooldowns(&self) -> CooldownState {
        self.lock().clone()
    }

    pub fn cooldown(&self) -> Duration {
        self.config.cooldown
    }

    fn lock(&self) -> MutexGuard<'_, CooldownState> {
        self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingTransport: in-memory transport for tests and dry runs
// ════════════════════════════════════════════════════════════════════════════

/// Keeps every broadcast payload in memory and reports a settable peer
/// count.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    peers: AtomicUsize,
    sent:  Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn with_peers(peers: usize) -> Self {
        RecordingTransport { peers: AtomicUsize::new(peers), sent: Mutex::default() }
    }

    pub fn set_peers(&self, peers: usize) {
        self.peers.store(peers, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Transport for RecordingTransport {
    fn broadcast(&self, payload: &str) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.to_string());
    }

    fn peer_count(&self) -> usize {
        self.peers.load(Ordering::SeqCst)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn setup(peers: usize) -> (Arc<RecordingTransport>, Dispatcher<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::with_peers(peers));
        let dispatcher = Dispatcher::new(Arc::clone(&transport));
        (transport, dispatcher)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn repeat_inside_window_is_dropped() {
        let (transport, d) = setup(1);
        let t = Instant::now();
        assert!(d.dispatch(GestureEvent::Fist, t));
        assert!(!d.dispatch(GestureEvent::Fist, t + ms(500)));
        assert_eq!(d.last_sent(GestureEvent::Fist), Some(t));
        assert_eq!(transport.sent(), vec!["FIST"]);
    }

    #[test]
    fn repeat_after_window_is_sent() {
        let (transport, d) = setup(1);
        let t = Instant::now();
        assert!(d.dispatch(GestureEvent::Fist, t));
        assert!(d.dispatch(GestureEvent::Fist, t + ms(1300)));
        assert_eq!(d.last_sent(GestureEvent::Fist), Some(t + ms(1300)));
        assert_eq!(transport.sent(), vec!["FIST", "FIST"]);
    }

    #[test]
    fn window_edge_is_released() {
        let (_, d) = setup(1);
        let t = Instant::now();
        assert!(d.dispatch(GestureEvent::Pinch, t));
        assert!(!d.dispatch(GestureEvent::Pinch, t + ms(1199)));
        assert!(d.dispatch(GestureEvent::Pinch, t + ms(1200)));
    }

    #[test]
    fn labels_cool_down_independently() {
        let (transport, d) = setup(1);
        let t = Instant::now();
        assert!(d.dispatch(GestureEvent::SwipeLeft, t));
        assert!(d.dispatch(GestureEvent::SwipeRight, t + ms(10)));
        assert!(d.dispatch(GestureEvent::OpenPalm, t + ms(20)));
        assert_eq!(transport.sent(), vec!["SWIPE_LEFT", "SWIPE_RIGHT", "OPEN_PALM"]);
        assert_eq!(d.cooldowns().len(), 3);
    }

    #[test]
    fn no_peers_still_consumes_cooldown() {
        let (transport, d) = setup(0);
        let t = Instant::now();
        assert!(!d.dispatch(GestureEvent::Pinch, t));
        assert_eq!(d.last_sent(GestureEvent::Pinch), Some(t));

        transport.set_peers(1);
        assert!(!d.dispatch(GestureEvent::Pinch, t + ms(100)));
        assert!(transport.sent().is_empty());
        assert_eq!(d.last_sent(GestureEvent::Pinch), Some(t));
    }

    #[test]
    fn clock_going_backwards_stays_suppressed() {
        let (_, d) = setup(1);
        let t = Instant::now() + ms(5000);
        assert!(d.dispatch(GestureEvent::Fist, t));
        assert!(!d.dispatch(GestureEvent::Fist, t - ms(3000)));
        assert_eq!(d.last_sent(GestureEvent::Fist), Some(t));
    }

    #[test]
    fn custom_window() {
        let transport = Arc::new(RecordingTransport::with_peers(1));
        let d = Dispatcher::with_config(
            Arc::clone(&transport),
            DispatchConfig { cooldown: ms(200) },
        );
        let t = Instant::now();
        assert!(d.dispatch(GestureEvent::OpenPalm, t));
        assert!(d.dispatch(GestureEvent::OpenPalm, t + ms(250)));
        assert_eq!(d.cooldown(), ms(200));
    }

    #[test]
    fn concurrent_dispatch_admits_exactly_one() {
        let (transport, d) = setup(1);
        let d = Arc::new(d);
        let t = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let d = Arc::clone(&d);
                thread::spawn(move || d.dispatch(GestureEvent::Fist, t))
            })
            .collect();
        let sent = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&sent| sent)
            .count();
        assert_eq!(sent, 1);
        assert_eq!(transport.sent().len(), 1);
    }
}
