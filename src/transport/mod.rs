//! WebSocket transport layer.
//!
//! This module owns the socket once the connection is registered and
//! turns raw frames into dispatched events.
//!
//! # Architecture
//!
//! ```text
//!   socket read half                                   socket write half
//!         │                                                    ▲
//!         ▼                                                    │
//! ┌────────────────┐  bounded   ┌────────────────┐     ┌───────────────┐
//! │ Ingestion loop │──channel──►│ Event pipeline │     │ Writer loop   │
//! │ (reassembly)   │  Vec<u8>   │ scan + decode  │     │ (one send at  │
//! └────────────────┘            │ + dispatch     │     │  a time)      │
//!                               └────────────────┘     └───────────────┘
//!                                       │                      ▲
//!                                       ▼                      │
//!                                  subscribers ──────────► Sender handles
//! ```
//!
//! All three loops select on a cancellation token at every suspension
//! point. A full channel pauses ingestion instead of dropping buffers.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ingest` | Frame reassembly and the ingestion loop |
//! | `outbound` | [`Sender`] handle and writer loop |
//! | `pipeline` | Parse and dispatch loop |
//! | `scanner` | Concatenated JSON document splitter |

// ============================================================================
// Submodules
// ============================================================================

/// Frame reassembly and the ingestion loop.
pub mod ingest;

/// Outbound sender and writer loop.
pub mod outbound;

/// Parse and dispatch loop.
pub mod pipeline;

/// Concatenated JSON document splitter.
pub mod scanner;

// ============================================================================
// Re-exports
// ============================================================================

pub use ingest::{FrameAssembler, run_ingestion};
pub use outbound::Sender;
pub use pipeline::{EventPipeline, PipelineStats};
pub use scanner::{DocumentScanner, Fragment};
