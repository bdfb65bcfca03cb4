//! Parse and dispatch loop.
//!
//! Consumes message buffers from the ingestion channel, splits them into
//! documents, decodes each document and dispatches the resulting event.
//! Malformed documents are reported and skipped; the rest of the buffer is
//! still processed.
//!
//! Every buffer is one complete WebSocket message. A document left open at
//! the end of a buffer is reported as malformed and never joined with the
//! next buffer.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::events::Dispatcher;
use crate::protocol::decode_document;

use super::scanner::{DocumentScanner, Fragment};

// ============================================================================
// PipelineStats
// ============================================================================

/// Counters collected over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Message buffers consumed.
    pub buffers: usize,
    /// Events dispatched.
    pub dispatched: usize,
    /// Documents or byte runs discarded as malformed.
    pub malformed: usize,
    /// Subscriber invocations that failed.
    pub handler_failures: usize,
}

// ============================================================================
// EventPipeline
// ============================================================================

/// Scanner plus dispatcher, driven one buffer at a time.
pub struct EventPipeline {
    scanner: DocumentScanner,
    dispatcher: Arc<Dispatcher>,
    stats: PipelineStats,
}

impl EventPipeline {
    /// Creates a pipeline dispatching into `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            scanner: DocumentScanner::new(),
            dispatcher,
            stats: PipelineStats::default(),
        }
    }

    /// Returns the counters so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Processes one buffer.
    ///
    /// Returns `false` if `cancel` fired while a subscriber was running;
    /// the remaining documents of the buffer are then dropped.
    pub async fn process(&mut self, buffer: &[u8], cancel: &CancellationToken) -> bool {
        self.stats.buffers += 1;

        let mut fragments = self.scanner.feed(buffer);
        fragments.extend(self.scanner.finish());

        for fragment in fragments {
            let bytes = match fragment {
                Fragment::Document(bytes) => bytes,
                other => {
                    self.report_discarded(&other);
                    continue;
                }
            };

            let event = match decode_document(&bytes) {
                Ok(event) => event,
                Err(e) => {
                    self.stats.malformed += 1;
                    warn!(error = %e, bytes = bytes.len(), "Discarding malformed document");
                    continue;
                }
            };

            trace!(kind = %event.kind, context = ?event.context, "Event decoded");

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return false,
                outcome = self.dispatcher.dispatch(&event) => outcome,
            };

            self.stats.dispatched += 1;
            self.stats.handler_failures += outcome.failed;
        }

        true
    }

    /// Runs until the channel closes or `cancel` fires.
    ///
    /// Buffers already queued when ingestion stops are still processed.
    pub async fn run(
        mut self,
        mut buffers: mpsc::Receiver<Vec<u8>>,
        cancel: CancellationToken,
    ) -> PipelineStats {
        loop {
            let buffer = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                buffer = buffers.recv() => buffer,
            };

            let Some(buffer) = buffer else {
                break;
            };

            if !self.process(&buffer, &cancel).await {
                break;
            }
        }

        debug!(stats = ?self.stats, "Pipeline terminated");
        self.stats
    }

    fn report_discarded(&mut self, fragment: &Fragment) {
        self.stats.malformed += 1;

        match fragment {
            Fragment::Stray(bytes) => {
                warn!(bytes = bytes.len(), "Discarding bytes outside any document");
            }
            Fragment::Oversized { discarded } => {
                warn!(bytes = discarded, "Discarding oversized document");
            }
            Fragment::Incomplete(bytes) => {
                warn!(bytes = bytes.len(), "Discarding unterminated document");
            }
            Fragment::Document(bytes) => {
                warn!(bytes = bytes.len(), "Discarding document");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
