//! Frame ingestion loop.
//!
//! Reads frames from the socket, reassembles fragmented messages and hands
//! each completed message buffer to the parser through a bounded channel.
//! A full channel pauses ingestion; buffers are never dropped.
//!
//! # Exit conditions
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Cancellation | `Ok(())` |
//! | Close frame or end of stream | [`Error::ConnectionClosed`] |
//! | Non-transient socket error | [`Error::WebSocket`] |
//! | Too many consecutive transient errors | [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::mem;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Consecutive transient receive errors tolerated before giving up.
pub const MAX_CONSECUTIVE_RECEIVE_ERRORS: u32 = 16;

// ============================================================================
// FrameAssembler
// ============================================================================

/// Accumulates frame payloads until the end-of-message flag is seen.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
}

impl FrameAssembler {
    /// Creates an empty assembler.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk. Returns the completed message when
    /// `end_of_message` is set and the message is not empty.
    pub fn push(&mut self, chunk: &[u8], end_of_message: bool) -> Option<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        if !end_of_message {
            return None;
        }

        let message = mem::take(&mut self.buffer);
        (!message.is_empty()).then_some(message)
    }

    /// Returns the number of bytes waiting for the end of a message.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

// ============================================================================
// Ingestion Loop
// ============================================================================

/// Runs the ingestion loop until cancellation or connection loss.
///
/// `shutdown` is cancelled on exit so the other session tasks stop too.
pub async fn run_ingestion<S>(
    mut stream: S,
    buffers: mpsc::Sender<Vec<u8>>,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    let result = ingest(&mut stream, &buffers, &shutdown).await;
    shutdown.cancel();
    debug!(ok = result.is_ok(), "Ingestion loop terminated");
    result
}

async fn ingest<S>(
    stream: &mut S,
    buffers: &mpsc::Sender<Vec<u8>>,
    shutdown: &CancellationToken,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    let mut assembler = FrameAssembler::new();
    let mut consecutive_errors = 0u32;

    loop {
        let message = tokio::select! {
            biased;
            () = shutdown.cancelled() => return Ok(()),
            message = stream.next() => message,
        };

        let completed = match message {
            Some(Ok(Message::Text(text))) => assembler.push(text.as_bytes(), true),

            Some(Ok(Message::Binary(data))) => assembler.push(&data, true),

            Some(Ok(Message::Frame(frame))) => {
                let end_of_message = frame.header().is_final;
                assembler.push(&frame.payload()[..], end_of_message)
            }

            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "WebSocket closed by remote");
                return Err(Error::ConnectionClosed);
            }

            // Pong replies are queued by tungstenite itself
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => None,

            Some(Err(e)) if is_transient(&e) && consecutive_errors < MAX_CONSECUTIVE_RECEIVE_ERRORS => {
                consecutive_errors += 1;
                warn!(error = %e, consecutive_errors, "Transient receive error");
                continue;
            }

            Some(Err(e)) => {
                error!(error = %e, "WebSocket receive failed");
                return Err(Error::WebSocket(e));
            }

            None => {
                debug!("WebSocket stream ended");
                return Err(Error::ConnectionClosed);
            }
        };

        consecutive_errors = 0;

        let Some(buffer) = completed else {
            continue;
        };

        trace!(bytes = buffer.len(), "Message assembled");

        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Ok(()),
            sent = buffers.send(buffer) => {
                if sent.is_err() {
                    debug!("Parser stopped, ending ingestion");
                    return Ok(());
                }
            }
        }
    }
}

/// Errors after which the socket is still usable.
fn is_transient(error: &WsError) -> bool {
    match error {
        WsError::Capacity(_) => true,
        WsError::Io(e) => matches!(
            e.kind(),
            ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
        ),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use futures_util::stream;
    use tokio_tungstenite::tungstenite::error::CapacityError;

    type Item = std::result::Result<Message, WsError>;

    fn text(s: &str) -> Item {
        Ok(Message::Text(s.to_string().into()))
    }

    fn too_long() -> Item {
        Err(WsError::Capacity(CapacityError::MessageTooLong {
            size: 10,
            max_size: 5,
        }))
    }

    async fn collect(items: Vec<Item>) -> (Result<()>, Vec<Vec<u8>>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = run_ingestion(stream::iter(items), tx, CancellationToken::new()).await;

        let mut received = Vec::new();
        while let Ok(buffer) = rx.try_recv() {
            received.push(buffer);
        }
        (result, received)
    }

    #[test]
    fn test_assembler_accumulates_until_final() {
        let mut assembler = FrameAssembler::new();

        assert_eq!(assembler.push(b"{\"event\":", false), None);
        assert_eq!(assembler.push(b"", false), None);
        assert_eq!(assembler.pending_len(), 9);
        assert_eq!(
            assembler.push(b"\"keyUp\"}", true),
            Some(b"{\"event\":\"keyUp\"}".to_vec())
        );
        assert_eq!(assembler.pending_len(), 0);
    }

    #[test]
    fn test_assembler_skips_empty_messages() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.push(b"", true), None);
    }

    #[tokio::test]
    async fn test_messages_forwarded_in_order() {
        let (result, received) = collect(vec![
            text(r#"{"event":"a"}"#),
            Ok(Message::Binary(br#"{"event":"b"}"#.to_vec().into())),
            Ok(Message::Ping(Vec::new().into())),
            text(r#"{"event":"c"}{"event":"d"}"#),
        ])
        .await;

        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(
            received,
            vec![
                br#"{"event":"a"}"#.to_vec(),
                br#"{"event":"b"}"#.to_vec(),
                br#"{"event":"c"}{"event":"d"}"#.to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn test_transient_error_is_skipped() {
        let (result, received) = collect(vec![
            text(r#"{"event":"a"}"#),
            too_long(),
            text(r#"{"event":"b"}"#),
        ])
        .await;

        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_transient_error_ceiling() {
        let mut items: Vec<Item> = (0..=MAX_CONSECUTIVE_RECEIVE_ERRORS).map(|_| too_long()).collect();
        items.push(text(r#"{"event":"never"}"#));

        let (result, received) = collect(items).await;

        assert!(matches!(result, Err(Error::WebSocket(WsError::Capacity(_)))));
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_fatal_error_ends_loop() {
        let (result, received) = collect(vec![
            Err(WsError::ConnectionClosed),
            text(r#"{"event":"never"}"#),
        ])
        .await;

        assert!(matches!(result, Err(Error::WebSocket(_))));
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_close_frame_ends_loop() {
        let (result, received) = collect(vec![
            text(r#"{"event":"a"}"#),
            Ok(Message::Close(None)),
            text(r#"{"event":"never"}"#),
        ])
        .await;

        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_unblocks_pending_receive() {
        let (tx, _rx) = mpsc::channel(1);
        let shutdown = CancellationToken::new();
        let pending = stream::pending::<Item>();

        let handle = tokio::spawn(run_ingestion(pending, tx, shutdown.clone()));
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should observe cancellation")
            .expect("task should not panic");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_backpressure_without_loss() {
        const COUNT: usize = 50;

        let items: Vec<Item> = (0..COUNT)
            .map(|i| text(&format!(r#"{{"event":"e{i}"}}"#)))
            .collect();
        let (tx, mut rx) = mpsc::channel(1);
        let shutdown = CancellationToken::new();

        let ingestion = tokio::spawn(run_ingestion(stream::iter(items), tx, shutdown));

        let mut received = Vec::new();
        while let Some(buffer) = rx.recv().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
            received.push(String::from_utf8(buffer).expect("utf8"));
        }

        let result = ingestion.await.expect("task should not panic");
        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(received.len(), COUNT);
        for (i, buffer) in received.iter().enumerate() {
            assert_eq!(buffer, &format!(r#"{{"event":"e{i}"}}"#));
        }
    }
}
