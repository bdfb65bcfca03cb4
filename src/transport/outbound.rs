//! Outbound send path.
//!
//! [`Sender`] handles can be cloned freely and used from any task. Every
//! command goes through one writer task that owns the socket's write half,
//! so at most one send is in flight at a time. The receive path is not
//! involved.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::{Sink, SinkExt};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::protocol::{Command, OutboundCommand, Target, encode_command};

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for the close handshake when the session ends.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Outgoing
// ============================================================================

/// A queued frame and the channel that reports its fate.
pub(crate) struct Outgoing {
    text: String,
    done: oneshot::Sender<Result<()>>,
}

// ============================================================================
// Sender
// ============================================================================

/// Handle for sending commands to the hosting application.
///
/// Commands sent before the plugin is running are queued and written
/// right after registration.
#[derive(Clone)]
pub struct Sender {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl Sender {
    /// Creates a sender and the receiving end for the writer task.
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Encodes and sends a command.
    ///
    /// Resolves once the frame was written to the socket.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the command cannot be encoded
    /// - [`Error::ConnectionClosed`] if the session has ended
    /// - [`Error::Connection`] if the socket write fails
    pub async fn send(&self, command: impl Into<OutboundCommand>) -> Result<()> {
        let command = command.into();
        let text = encode_command(&command)?;
        let (done, done_rx) = oneshot::channel();

        self.tx
            .send(Outgoing { text, done })
            .map_err(|_| Error::ConnectionClosed)?;

        trace!(event = %command.event, "Command queued");

        done_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Sets the title of an action instance.
    pub async fn set_title(
        &self,
        context: impl Into<String>,
        title: impl Into<String>,
        target: Target,
    ) -> Result<()> {
        self.send(Command::SetTitle {
            context: context.into(),
            title: Some(title.into()),
            target,
        })
        .await
    }

    /// Clears the title of an action instance.
    pub async fn clear_title(&self, context: impl Into<String>, target: Target) -> Result<()> {
        self.send(Command::SetTitle {
            context: context.into(),
            title: None,
            target,
        })
        .await
    }

    /// Sets the image of an action instance from a base64 string or data URI.
    pub async fn set_image(
        &self,
        context: impl Into<String>,
        image: impl Into<String>,
        target: Target,
    ) -> Result<()> {
        self.send(Command::SetImage {
            context: context.into(),
            image: Some(image.into()),
            target,
        })
        .await
    }

    /// Restores the default image of an action instance.
    pub async fn reset_image(&self, context: impl Into<String>, target: Target) -> Result<()> {
        self.send(Command::SetImage {
            context: context.into(),
            image: None,
            target,
        })
        .await
    }

    /// Shows the alert indicator.
    pub async fn show_alert(&self, context: impl Into<String>) -> Result<()> {
        self.send(Command::ShowAlert {
            context: context.into(),
        })
        .await
    }

    /// Shows the OK indicator.
    pub async fn show_ok(&self, context: impl Into<String>) -> Result<()> {
        self.send(Command::ShowOk {
            context: context.into(),
        })
        .await
    }

    /// Persists settings for an action instance.
    pub async fn set_settings(&self, context: impl Into<String>, settings: Value) -> Result<()> {
        self.send(Command::SetSettings {
            context: context.into(),
            settings,
        })
        .await
    }

    /// Changes the state of a multi-state action.
    pub async fn set_state(&self, context: impl Into<String>, state: i64) -> Result<()> {
        self.send(Command::SetState {
            context: context.into(),
            state,
        })
        .await
    }

    /// Sends a payload to the property inspector.
    pub async fn send_to_property_inspector(
        &self,
        context: impl Into<String>,
        payload: Value,
    ) -> Result<()> {
        self.send(Command::SendToPropertyInspector {
            context: context.into(),
            payload,
        })
        .await
    }

    /// Switches a device to a bundled profile.
    pub async fn switch_to_profile(
        &self,
        context: impl Into<String>,
        device: impl Into<String>,
        profile: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::SwitchToProfile {
            context: context.into(),
            device: device.into(),
            profile: profile.into(),
        })
        .await
    }

    /// Opens a URL in the default browser.
    pub async fn open_url(&self, url: impl Into<String>) -> Result<()> {
        self.send(Command::OpenUrl { url: url.into() }).await
    }
}

// ============================================================================
// Writer Loop
// ============================================================================

/// Writes queued commands until `shutdown` fires or a write fails.
///
/// Queued commands left behind are failed with
/// [`Error::ConnectionClosed`] and the socket is closed.
pub(crate) async fn run_writer<W>(
    mut sink: W,
    mut commands: mpsc::UnboundedReceiver<Outgoing>,
    shutdown: CancellationToken,
) -> Result<()>
where
    W: Sink<Message, Error = WsError> + Unpin,
{
    let result = loop {
        let outgoing = tokio::select! {
            biased;
            () = shutdown.cancelled() => break Ok(()),
            outgoing = commands.recv() => outgoing,
        };

        let Some(Outgoing { text, done }) = outgoing else {
            break Ok(());
        };

        let sent = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                let _ = done.send(Err(Error::ConnectionClosed));
                break Ok(());
            }
            sent = sink.send(Message::Text(text.into())) => sent,
        };

        match sent {
            Ok(()) => {
                trace!("Command written");
                let _ = done.send(Ok(()));
            }
            Err(e) => {
                error!(error = %e, "Failed to send command");
                let _ = done.send(Err(Error::connection(e.to_string())));
                break Err(Error::WebSocket(e));
            }
        }
    };

    shutdown.cancel();
    fail_pending(&mut commands);

    if timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
        debug!("Close handshake timed out");
    }

    debug!(ok = result.is_ok(), "Writer loop terminated");
    result
}

/// Fails every queued command with `ConnectionClosed`.
fn fail_pending(commands: &mut mpsc::UnboundedReceiver<Outgoing>) {
    commands.close();

    let mut count = 0usize;
    while let Ok(Outgoing { done, .. }) = commands.try_recv() {
        let _ = done.send(Err(Error::ConnectionClosed));
        count += 1;
    }

    if count > 0 {
        debug!(count, "Failed pending commands on shutdown");
    }
}

// ============================================================================
// Tests
// ============================================================================
