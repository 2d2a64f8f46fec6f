//! Re-push event router

use std::sync::Arc;

use super::{EventQueue, RawEvent, WindowId};

/// Foreign events re-queued in one pass before the router warns about a
/// window that is not being polled
pub const BACKLOG_WARN_THRESHOLD: usize = 4096;

/// Outcome of one routing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    /// Events handed to the owner
    pub dispatched: usize,
    /// Foreign events pushed back for other windows
    pub requeued: usize,
}

/// Supplies a window with the events addressed to it
pub trait EventSource: Send {
    /// Deliver every pending event for `owner`, plus window-less events, to
    /// `dispatch` in arrival order
    fn poll_for(&mut self, owner: WindowId, dispatch: &mut dyn FnMut(RawEvent)) -> RouteStats;
}

/// Splits a shared host queue between windows by re-queueing foreign events
///
/// One router per window. A pass drains the whole queue: events for the
/// owner (and window-less events) are dispatched immediately, the rest are
/// held and pushed back to the tail once the queue is empty, so their
/// relative order is preserved and no event is lost or delivered twice.
pub struct EventRouter {
    queue: Arc<dyn EventQueue>,
    held: Vec<RawEvent>,
    backlog_warned: bool,
}

impl EventRouter {
    /// Create a router over a shared queue
    pub fn new(queue: Arc<dyn EventQueue>) -> Self {
        Self {
            queue,
            held: Vec::new(),
            backlog_warned: false,
        }
    }

    /// The queue this router drains
    pub fn queue(&self) -> &Arc<dyn EventQueue> {
        &self.queue
    }

    /// Drain the queue once, dispatching the owner's events
    ///
    /// Events pushed by `dispatch` itself are seen in the same pass.
    pub fn poll_and_dispatch<F>(&mut self, owner: WindowId, mut dispatch: F) -> RouteStats
    where
        F: FnMut(RawEvent),
    {
        let mut stats = RouteStats::default();

        while let Some(event) = self.queue.poll_event() {
            if event.is_for(owner) {
                dispatch(event);
                stats.dispatched += 1;
            } else {
                self.held.push(event);
            }
        }

        stats.requeued = self.held.len();
        for event in self.held.drain(..) {
            self.queue.push_event(event);
        }

        if stats.requeued >= BACKLOG_WARN_THRESHOLD {
            if !self.backlog_warned {
                log::warn!(
                    "{owner}: re-queued {} events addressed to other windows; a window is not polling its events",
                    stats.requeued
                );
                self.backlog_warned = true;
            }
        } else {
            self.backlog_warned = false;
        }

        stats
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl EventSource for EventRouter {
    fn poll_for(&mut self, owner: WindowId, dispatch: &mut dyn FnMut(RawEvent)) -> RouteStats {
        self.poll_and_dispatch(owner, dispatch)
    }
}
