//! Subscriber trait and closure adapter.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::InboundEvent;

// ============================================================================
// Types
// ============================================================================

/// Shared subscriber handle stored in the registry.
pub type EventHandler = Arc<dyn Subscriber>;

// ============================================================================
// Subscriber
// ============================================================================

/// Receives dispatched events.
///
/// Each call is awaited to completion before the next subscriber runs.
/// Returning an error is reported and does not stop dispatch.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Handles one event.
    async fn on_event(&self, event: InboundEvent) -> Result<()>;
}

// ============================================================================
// FnSubscriber
// ============================================================================

/// Adapts an async closure into a [`Subscriber`].
pub struct FnSubscriber<F> {
    func: F,
}

#[async_trait]
impl<F, Fut> Subscriber for FnSubscriber<F>
where
    F: Fn(InboundEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn on_event(&self, event: InboundEvent) -> Result<()> {
        (self.func)(event).await
    }
}

/// Wraps an async closure as an [`EventHandler`].
///
/// # Example
///
/// ```ignore
/// let handler = handler_fn(|event| async move {
///     tracing::info!(kind = %event.kind, "got event");
///     Ok(())
/// });
/// ```
#[must_use]
pub fn handler_fn<F, Fut>(func: F) -> EventHandler
where
    F: Fn(InboundEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnSubscriber { func })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::Error;

    struct Counting {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscriber for Counting {
        async fn on_event(&self, _event: InboundEvent) -> Result<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn event(kind: &str) -> InboundEvent {
        serde_json::from_value(serde_json::json!({ "event": kind })).expect("event")
    }

    #[tokio::test]
    async fn test_struct_subscriber() {
        let counting = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let handler: EventHandler = counting.clone();

        handler.on_event(event("keyDown")).await.expect("ok");
        handler.on_event(event("keyUp")).await.expect("ok");
        assert_eq!(counting.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_closure_subscriber_propagates_error() {
        let handler = handler_fn(|event| async move {
            Err(Error::handler(event.kind, "rejected"))
        });

        let err = handler.on_event(event("keyDown")).await.unwrap_err();
        assert!(matches!(err, Error::Handler { ref kind, .. } if kind == "keyDown"));
    }
}
