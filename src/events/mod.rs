//! Event subscription and dispatch.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Subscriber registry and ordered fan-out |
//! | `subscriber` | [`Subscriber`] trait and closure adapter |

// ============================================================================
// Submodules
// ============================================================================

/// Subscriber registry and ordered fan-out.
pub mod dispatcher;

/// Subscriber trait and closure adapter.
pub mod subscriber;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use subscriber::{EventHandler, FnSubscriber, Subscriber, handler_fn};
