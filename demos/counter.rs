//! Key press counter plugin.
//!
//! Demonstrates:
//! - Parsing the hosting application's launch flags
//! - Threading caller-owned state into a subscriber closure
//! - Answering `keyDown` with `setTitle`
//! - Logging every event through a catch-all subscriber
//!
//! The hosting application starts the binary with its own flags:
//!   counter -port 28196 -pluginUUID <uuid> -registerEvent registerPlugin -info '{...}'
//!
//! Add `--debug` for verbose logging.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use streamdeck_plugin::{EventKind, LaunchArgs, PluginBuilder, Result, Target};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = LaunchArgs::from_env()?;
    let plugin = PluginBuilder::from_launch_args(args).build()?;

    let info = plugin.info();
    tracing::info!(
        platform = %info.application.platform,
        version = %info.application.version,
        devices = info.devices.len(),
        "Starting counter plugin"
    );

    // ========================================================================
    // Subscribers
    // ========================================================================

    let count = Arc::new(AtomicU64::new(0));
    let sender = plugin.sender();

    plugin.on(EventKind::KeyDown, move |event| {
        let count = Arc::clone(&count);
        let sender = sender.clone();
        async move {
            let Some(context) = event.context else {
                return Ok(());
            };

            let value = count.fetch_add(1, Ordering::Relaxed) + 1;
            sender.set_title(context, value.to_string(), Target::Both).await
        }
    });

    plugin.on_any(|event| async move {
        tracing::debug!(kind = %event.kind, context = ?event.context, "Event");
        Ok(())
    });

    // ========================================================================
    // Run
    // ========================================================================

    let cancel = plugin.cancellation_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        cancel.cancel();
    });

    plugin.run().await
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "streamdeck_plugin=debug,counter=debug"
    } else {
        "streamdeck_plugin=info,counter=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
