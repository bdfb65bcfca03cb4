//! Ordered event fan-out.
//!
//! The registry maps an event kind to an ordered list of subscribers and
//! keeps one separate catch-all list. For each event, kind-specific
//! subscribers run first, then catch-all subscribers, each in registration
//! order and each awaited before the next starts.
//!
//! Subscribing is expected to happen before the run loop starts. A
//! subscription added while an event is being dispatched is guarded by the
//! registry lock and takes effect from the next event.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{error, trace, warn};

use crate::protocol::InboundEvent;

use super::subscriber::EventHandler;

// ============================================================================
// DispatchOutcome
// ============================================================================

/// Counters for one dispatched event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Subscribers invoked.
    pub invoked: usize,
    /// Subscribers that returned an error or panicked.
    pub failed: usize,
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
struct Registry {
    by_kind: FxHashMap<String, Vec<EventHandler>>,
    catch_all: Vec<EventHandler>,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Subscriber registry with sequential dispatch.
#[derive(Default)]
pub struct Dispatcher {
    registry: RwLock<Registry>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for one event kind.
    pub fn subscribe(&self, kind: impl Into<String>, handler: EventHandler) {
        let kind = kind.into();
        trace!(%kind, "Subscriber registered");
        self.registry
            .write()
            .by_kind
            .entry(kind)
            .or_default()
            .push(handler);
    }

    /// Registers a subscriber for every event.
    pub fn subscribe_all(&self, handler: EventHandler) {
        trace!("Catch-all subscriber registered");
        self.registry.write().catch_all.push(handler);
    }

    /// Returns the number of kind-specific subscribers for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: &str) -> usize {
        self.registry.read().by_kind.get(kind).map_or(0, Vec::len)
    }

    /// Returns the number of catch-all subscribers.
    #[must_use]
    pub fn catch_all_count(&self) -> usize {
        self.registry.read().catch_all.len()
    }

    /// Dispatches one event to its subscribers.
    ///
    /// Failures are logged and counted; they never stop the remaining
    /// subscribers.
    pub async fn dispatch(&self, event: &InboundEvent) -> DispatchOutcome {
        let handlers = self.snapshot(&event.kind);
        let mut outcome = DispatchOutcome::default();

        for handler in handlers {
            outcome.invoked += 1;

            match AssertUnwindSafe(handler.on_event(event.clone()))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    outcome.failed += 1;
                    warn!(kind = %event.kind, error = %e, "Subscriber failed");
                }
                Err(panic) => {
                    outcome.failed += 1;
                    error!(
                        kind = %event.kind,
                        panic = panic_message(panic.as_ref()),
                        "Subscriber panicked"
                    );
                }
            }
        }

        trace!(kind = %event.kind, invoked = outcome.invoked, failed = outcome.failed, "Event dispatched");
        outcome
    }

    /// Copies the handler list so no lock is held across an await.
    fn snapshot(&self, kind: &str) -> Vec<EventHandler> {
        let registry = self.registry.read();
        registry
            .by_kind
            .get(kind)
            .into_iter()
            .flatten()
            .chain(registry.catch_all.iter())
            .cloned()
            .collect()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic"
    }
}

// ============================================================================
// Tests
// ============================================================================
