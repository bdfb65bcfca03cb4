//! Plugin connection controller.
//!
//! [`Plugin`] owns the one connection of the process. [`Plugin::run`]
//! drives it through its lifecycle:
//!
//! ```text
//! Disconnected ──connect──► Registering ──registration sent──► Running ──cancel / fatal I/O──► Closed
//! ```
//!
//! Ingestion, parsing and dispatch only happen while `Running`.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::events::{Dispatcher, EventHandler, handler_fn};
use crate::protocol::{InboundEvent, RegistrationInfo, encode_registration};
use crate::transport::outbound::{Outgoing, run_writer};
use crate::transport::{EventPipeline, Sender, run_ingestion};

use super::builder::{PluginBuilder, PluginConfig};

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected yet.
    Disconnected,
    /// Socket open, registration being sent.
    Registering,
    /// Events are being received and dispatched.
    Running,
    /// Session ended. Terminal.
    Closed,
}

// ============================================================================
// Plugin
// ============================================================================

/// A Stream Deck plugin connection.
///
/// Register subscribers, grab a [`Sender`], then call [`Plugin::run`].
///
/// # Example
///
/// ```no_run
/// use streamdeck_plugin::{EventKind, LaunchArgs, Plugin, PluginBuilder, Target};
///
/// # async fn example() -> streamdeck_plugin::Result<()> {
/// let plugin = PluginBuilder::from_launch_args(LaunchArgs::from_env()?).build()?;
/// let sender = plugin.sender();
///
/// plugin.on(EventKind::KeyDown, move |event| {
///     let sender = sender.clone();
///     async move {
///         if let Some(context) = event.context {
///             sender.set_title(context, "pressed", Target::Both).await?;
///         }
///         Ok(())
///     }
/// });
///
/// plugin.run().await
/// # }
/// ```
pub struct Plugin {
    config: PluginConfig,
    dispatcher: Arc<Dispatcher>,
    sender: Sender,
    /// Taken by the first `run`.
    outgoing: Mutex<Option<mpsc::UnboundedReceiver<Outgoing>>>,
    state: Mutex<ConnectionState>,
    cancel: CancellationToken,
}

impl Plugin {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> PluginBuilder {
        PluginBuilder::new()
    }

    pub(crate) fn new(config: PluginConfig) -> Self {
        let (sender, outgoing) = Sender::channel();

        Self {
            config,
            dispatcher: Arc::new(Dispatcher::new()),
            sender,
            outgoing: Mutex::new(Some(outgoing)),
            state: Mutex::new(ConnectionState::Disconnected),
            cancel: CancellationToken::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the validated configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Returns the registration info passed at launch.
    #[inline]
    #[must_use]
    pub fn info(&self) -> &RegistrationInfo {
        &self.config.info
    }

    /// Returns a handle for sending commands.
    #[inline]
    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender.clone()
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Returns the dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Registers a subscriber for one event kind.
    ///
    /// Subscribers should be registered before [`Plugin::run`]; later
    /// registrations apply from the next event.
    pub fn subscribe(&self, kind: impl Into<String>, handler: EventHandler) {
        self.dispatcher.subscribe(kind, handler);
    }

    /// Registers a subscriber for every event, run after kind-specific ones.
    pub fn subscribe_all(&self, handler: EventHandler) {
        self.dispatcher.subscribe_all(handler);
    }

    /// Registers an async closure for one event kind.
    pub fn on<F, Fut>(&self, kind: impl Into<String>, func: F)
    where
        F: Fn(InboundEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.subscribe(kind, handler_fn(func));
    }

    /// Registers an async closure for every event.
    pub fn on_any<F, Fut>(&self, func: F)
    where
        F: Fn(InboundEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.subscribe_all(handler_fn(func));
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Requests shutdown. Every loop observes it within one iteration.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns the token that stops the session when cancelled.
    #[inline]
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ========================================================================
    // Run
    // ========================================================================

    /// Connects, registers and processes events until cancelled or the
    /// connection fails.
    ///
    /// Malformed documents, transient receive errors and subscriber
    /// failures are logged and do not end the session.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if called more than once
    /// - [`Error::ConnectionTimeout`] if connecting takes too long
    /// - [`Error::Connection`] if connect, registration or a send fails
    /// - [`Error::ConnectionClosed`] if the peer closes the connection
    /// - [`Error::WebSocket`] on a fatal socket error
    pub async fn run(&self) -> Result<()> {
        let outgoing = self.outgoing.lock().take().ok_or(Error::AlreadyRunning)?;

        let result = self.run_session(outgoing).await;
        self.set_state(ConnectionState::Closed);

        match &result {
            Ok(()) => info!("Plugin session closed"),
            Err(e) => error!(error = %e, "Plugin session failed"),
        }

        result
    }

    async fn run_session(&self, outgoing: mpsc::UnboundedReceiver<Outgoing>) -> Result<()> {
        let url = self.config.url.as_str();
        debug!(%url, "Connecting");

        let connect = timeout(self.config.connect_timeout, connect_async(url));
        let (mut ws_stream, _response) = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("Cancelled before connecting");
                return Ok(());
            }
            result = connect => result
                .map_err(|_| Error::connection_timeout(self.config.connect_timeout.as_millis() as u64))?
                .map_err(|e| Error::connection(format!("WebSocket connect failed: {e}")))?,
        };

        self.set_state(ConnectionState::Registering);

        let registration =
            encode_registration(&self.config.register_event, &self.config.plugin_uuid)?;
        ws_stream
            .send(Message::Text(registration.into()))
            .await
            .map_err(|e| Error::connection(format!("Registration failed: {e}")))?;

        info!(port = self.config.port, "Plugin registered");
        self.set_state(ConnectionState::Running);

        let (sink, stream) = ws_stream.split();
        let (buffer_tx, buffer_rx) = mpsc::channel(self.config.channel_capacity);

        // Fatal exits of ingestion or writer stop the other socket loop.
        // The pipeline only stops on user cancellation or once ingestion
        // is gone and the channel is drained.
        let shutdown = self.cancel.child_token();

        let (ingest_result, writer_result, stats) = tokio::join!(
            run_ingestion(stream, buffer_tx, shutdown.clone()),
            run_writer(sink, outgoing, shutdown.clone()),
            EventPipeline::new(Arc::clone(&self.dispatcher)).run(buffer_rx, self.cancel.clone()),
        );

        info!(
            buffers = stats.buffers,
            dispatched = stats.dispatched,
            malformed = stats.malformed,
            handler_failures = stats.handler_failures,
            "Session statistics"
        );

        ingest_result.and(writer_result)
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        debug!(?previous, current = ?state, "Connection state changed");
    }
}

// ============================================================================
// Tests
// ============================================================================
