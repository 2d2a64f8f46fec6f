//! Per-window event demultiplexer
//!
//! Drains the host queue once and forwards each event to the channel of the
//! window it is addressed to, so no event is ever pushed back onto the shared
//! queue. Events for a window that has not registered yet are held and
//! retried on later pumps; events for a window whose handle was dropped are
//! discarded with a debug log until the host reports the window destroyed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use super::{EventQueue, EventSource, RawEvent, RouteStats, WindowEventKind, WindowId};

/// Closed windows remembered at most; the lowest ids are forgotten first
pub const RETIRED_CAPACITY: usize = 256;

struct Registration {
    generation: u64,
    tx: Sender<RawEvent>,
}

#[derive(Default)]
struct Routes {
    windows: BTreeMap<WindowId, Registration>,
    /// Registration order; the first live entry receives window-less events
    order: Vec<WindowId>,
    retired: BTreeSet<WindowId>,
    orphans: Vec<RawEvent>,
    next_generation: u64,
}

impl Routes {
    fn default_window(&self) -> Option<WindowId> {
        self.order.first().copied()
    }

    /// Forward one event, or hand it back if it has no destination yet
    fn route(&mut self, event: RawEvent) -> Option<RawEvent> {
        let target = match event.window_id() {
            Some(id) => id,
            None => match self.default_window() {
                Some(id) => id,
                None => return Some(event),
            },
        };

        if let Some(registration) = self.windows.get(&target) {
            // The receiver lives as long as the registration.
            let _ = registration.tx.send(event);
            None
        } else if self.retired.contains(&target) {
            if matches!(
                event,
                RawEvent::Window {
                    event: WindowEventKind::Destroyed,
                    ..
                }
            ) {
                self.retired.remove(&target);
            }
            log::debug!("Discarding event for closed {target}: {event:?}");
            None
        } else {
            Some(event)
        }
    }

    fn retire(&mut self, window: WindowId) {
        self.retired.insert(window);
        while self.retired.len() > RETIRED_CAPACITY {
            self.retired.pop_first();
        }
    }
}

/// Host-level event demultiplexer
pub struct EventDemux {
    source: Arc<dyn EventQueue>,
    routes: Mutex<Routes>,
}

impl EventDemux {
    /// Create a demultiplexer over the host queue
    pub fn new(source: Arc<dyn EventQueue>) -> Arc<Self> {
        Arc::new(Self {
            source,
            routes: Mutex::new(Routes::default()),
        })
    }

    /// Register a window and get its event stream
    ///
    /// Registering an id twice replaces the previous stream; dropping the
    /// replaced handle leaves the new registration in place.
    pub fn register(self: &Arc<Self>, window: WindowId) -> WindowEvents {
        let (tx, rx) = crossbeam_channel::unbounded();
        let generation = {
            let mut routes = self.routes.lock();
            let generation = routes.next_generation;
            routes.next_generation += 1;
            if routes
                .windows
                .insert(window, Registration { generation, tx })
                .is_some()
            {
                log::warn!("{window} registered twice; previous event stream detached");
            } else {
                routes.order.push(window);
            }
            routes.retired.remove(&window);
            generation
        };
        log::debug!("Registered {window} with event demultiplexer");

        WindowEvents {
            window,
            generation,
            rx,
            demux: Arc::clone(self),
        }
    }

    fn unregister(&self, window: WindowId, generation: u64) {
        let mut routes = self.routes.lock();
        match routes.windows.get(&window) {
            Some(registration) if registration.generation == generation => {}
            _ => return,
        }
        routes.windows.remove(&window);
        routes.order.retain(|id| *id != window);
        routes.retire(window);
    }

    /// Drain the host queue into the per-window streams
    ///
    /// Returns the number of events forwarded, including held events that
    /// found their window on this pump.
    pub fn pump(&self) -> usize {
        let mut routes = self.routes.lock();
        let mut forwarded = 0;

        let pending = std::mem::take(&mut routes.orphans);
        for event in pending {
            match routes.route(event) {
                Some(event) => routes.orphans.push(event),
                None => forwarded += 1,
            }
        }

        while let Some(event) = self.source.poll_event() {
            match routes.route(event) {
                Some(event) => routes.orphans.push(event),
                None => forwarded += 1,
            }
        }

        forwarded
    }

    /// Events still waiting for their window to register
    pub fn held(&self) -> usize {
        self.routes.lock().orphans.len()
    }
}

impl std::fmt::Debug for EventDemux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes = self.routes.lock();
        f.debug_struct("EventDemux")
            .field("windows", &routes.order)
            .field("held", &routes.orphans.len())
            .finish_non_exhaustive()
    }
}

/// One window's event stream from an [`EventDemux`]
///
/// Dropping the handle unregisters the window.
pub struct WindowEvents {
    window: WindowId,
    generation: u64,
    rx: Receiver<RawEvent>,
    demux: Arc<EventDemux>,
}

impl WindowEvents {
    /// Window this stream belongs to
    pub const fn window(&self) -> WindowId {
        self.window
    }

    /// Take the next event already forwarded to this window
    pub fn try_next(&self) -> Option<RawEvent> {
        self.rx.try_recv().ok()
    }
}

impl std::fmt::Debug for WindowEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowEvents")
            .field("window", &self.window)
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl EventSource for WindowEvents {
    /// Pumps the demultiplexer, then drains this window's stream
    fn poll_for(&mut self, owner: WindowId, dispatch: &mut dyn FnMut(RawEvent)) -> RouteStats {
        debug_assert_eq!(owner, self.window, "event stream polled by the wrong window");

        self.demux.pump();
        let mut stats = RouteStats::default();
        while let Ok(event) = self.rx.try_recv() {
            dispatch(event);
            stats.dispatched += 1;
        }
        stats
    }
}

impl Drop for WindowEvents {
    fn drop(&mut self) {
        self.demux.unregister(self.window, self.generation);
    }
}
