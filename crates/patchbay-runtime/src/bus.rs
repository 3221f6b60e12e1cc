//! EventBus - ordered publish/subscribe, decoupled from the dataflow.
//!
//! Anything in the system may fire an event; independent listeners
//! consume it without participating in the wire dataflow. Dispatch
//! decisions are made on the control loop (one inline job per fire),
//! and every listener invocation is then submitted as its own job:
//! firing never blocks on listener completion.
//!
//! # Ordering
//!
//! On each fire, wildcard ([`MATCH_ALL`]) listeners are submitted
//! before type-specific listeners, each group in registration order.
//! That submission order is deterministic; completion order across
//! listeners is not, once the jobs run concurrently.

use crate::scheduler::{Job, Scheduler};
use parking_lot::RwLock;
use patchbay_event::{Event, EventContext, MATCH_ALL};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A registered listener callback.
pub type Listener = Arc<dyn Fn(Event) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    listener: Listener,
    /// Present for one-shot listeners: set once the listener has run
    /// (or is about to), so queued duplicate dispatches skip it.
    once: Option<Arc<AtomicBool>>,
}

struct BusInner {
    listeners: RwLock<HashMap<String, Vec<ListenerEntry>>>,
    next_id: AtomicU64,
}

impl BusInner {
    /// Removes one listener entry. `quiet` suppresses the warning for
    /// removals the bus performs on its own behalf.
    fn remove(&self, event_type: &str, id: u64, quiet: bool) {
        let mut listeners = self.listeners.write();
        let mut removed = false;
        if let Some(entries) = listeners.get_mut(event_type) {
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            removed = entries.len() != before;
            // No dangling empty entries: listener counts stay honest.
            if entries.is_empty() {
                listeners.remove(event_type);
            }
        }
        if !removed && !quiet {
            warn!(event_type, "unable to remove unknown listener");
        }
    }
}

/// Handle that removes exactly one listener.
///
/// Safe to call more than once: after the first removal every further
/// call is a silent no-op.
pub struct Subscription {
    inner: Arc<BusInner>,
    event_type: String,
    id: u64,
    removed: AtomicBool,
}

impl Subscription {
    /// Unsubscribes the listener this handle was returned for.
    pub fn unsubscribe(&self) {
        if self.removed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.remove(&self.event_type, self.id, false);
    }
}

/// Thread-safe publish/subscribe hub.
///
/// Cloning is cheap; all clones share one listener table and one
/// scheduler.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
    scheduler: Scheduler,
}

impl EventBus {
    /// Creates a bus dispatching through `scheduler`.
    #[must_use]
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(BusInner {
                listeners: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
            scheduler,
        }
    }

    /// Fires an event. Callable from any thread; the dispatch decision
    /// runs on the control loop.
    pub fn fire(&self, event_type: impl Into<String>, data: Map<String, Value>) {
        self.fire_with_context(event_type, data, EventContext::new());
    }

    /// Fires an event that shares the provenance of an earlier one.
    pub fn fire_with_context(
        &self,
        event_type: impl Into<String>,
        data: Map<String, Value>,
        context: EventContext,
    ) {
        let event = Event::with_context(event_type, data, context);
        let inner = Arc::clone(&self.inner);
        self.scheduler.submit(Job::inline(move |ctx| {
            Self::dispatch(&inner, ctx, event);
        }));
    }

    /// Registers `listener` for `event_type` (or [`MATCH_ALL`]).
    pub fn listen(
        &self,
        event_type: impl Into<String>,
        listener: impl Fn(Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.register(event_type.into(), Arc::new(listener), None)
    }

    /// Registers a listener that runs at most once.
    ///
    /// Even when several dispatches are already queued before the
    /// listener first runs, only one of them invokes it; the rest find
    /// the ran-flag set and skip.
    pub fn listen_once(
        &self,
        event_type: impl Into<String>,
        listener: impl Fn(Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.register(
            event_type.into(),
            Arc::new(listener),
            Some(Arc::new(AtomicBool::new(false))),
        )
    }

    /// Live listener count per event type.
    ///
    /// Types whose last listener unsubscribed do not appear.
    #[must_use]
    pub fn listener_counts(&self) -> HashMap<String, usize> {
        self.inner
            .listeners
            .read()
            .iter()
            .map(|(event_type, entries)| (event_type.clone(), entries.len()))
            .collect()
    }

    fn register(&self, event_type: String, listener: Listener, once: Option<Arc<AtomicBool>>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .entry(event_type.clone())
            .or_default()
            .push(ListenerEntry { id, listener, once });
        debug!(%event_type, id, "listener registered");
        Subscription {
            inner: Arc::clone(&self.inner),
            event_type,
            id,
            removed: AtomicBool::new(false),
        }
    }

    /// Runs on the control loop: picks the listeners for this event
    /// and submits one job per listener, wildcard group first.
    fn dispatch(inner: &Arc<BusInner>, ctx: &mut crate::scheduler::LoopCtx<'_>, event: Event) {
        struct Picked {
            listener: Listener,
            once: Option<(String, u64, Arc<AtomicBool>)>,
        }

        let picked: Vec<Picked> = {
            let listeners = inner.listeners.read();
            let wildcard = listeners.get(MATCH_ALL).into_iter().flatten();
            let specific = (event.event_type != MATCH_ALL)
                .then(|| listeners.get(&event.event_type))
                .flatten()
                .into_iter()
                .flatten();
            wildcard
                .map(|entry| (MATCH_ALL, entry))
                .chain(specific.map(|entry| (event.event_type.as_str(), entry)))
                .map(|(key, entry)| Picked {
                    listener: Arc::clone(&entry.listener),
                    once: entry
                        .once
                        .as_ref()
                        .map(|flag| (key.to_string(), entry.id, Arc::clone(flag))),
                })
                .collect()
        };

        if picked.is_empty() {
            return;
        }
        debug!(event_type = %event.event_type, listeners = picked.len(), "dispatching");

        for pick in picked {
            if let Some((key, id, flag)) = pick.once {
                // Checked before removal and invocation: a second
                // queued dispatch must find the flag already set.
                if flag.swap(true, Ordering::SeqCst) {
                    continue;
                }
                inner.remove(&key, id, true);
            }
            let listener = pick.listener;
            let event = event.clone();
            ctx.submit(Job::task(async move {
                listener(event);
            }));
        }
    }
}
