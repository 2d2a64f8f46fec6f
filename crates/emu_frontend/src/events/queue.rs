//! Process-wide host event queue

use crossbeam_channel::{Receiver, Sender};

use super::RawEvent;

/// Host event-queue primitive
///
/// Implementations must be internally synchronized: several window
/// controllers may poll and push from their own threads.
pub trait EventQueue: Send + Sync {
    /// Take the oldest pending event
    fn poll_event(&self) -> Option<RawEvent>;

    /// Append an event at the tail of the queue
    fn push_event(&self, event: RawEvent);

    /// Number of pending events
    fn len(&self) -> usize;

    /// Whether no events are pending
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process event queue on an unbounded MPMC channel
///
/// Cloning produces another handle to the same queue.
#[derive(Clone)]
pub struct SharedEventQueue {
    tx: Sender<RawEvent>,
    rx: Receiver<RawEvent>,
}

impl SharedEventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
}

impl Default for SharedEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventQueue")
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl EventQueue for SharedEventQueue {
    #[inline]
    fn poll_event(&self) -> Option<RawEvent> {
        self.rx.try_recv().ok()
    }

    #[inline]
    fn push_event(&self, event: RawEvent) {
        // Both ends live in `self`, so the channel can never be disconnected.
        let _ = self.tx.send(event);
    }

    #[inline]
    fn len(&self) -> usize {
        self.rx.len()
    }
}
