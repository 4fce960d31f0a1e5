//! Signal handling for graceful server shutdown.

use tokio::signal;
use tracing::info;

/// Waits for a termination signal.
///
/// # Platform Support
///
/// * **Unix platforms**: Handles SIGINT and SIGTERM signals
/// * **Windows**: Handles Ctrl+C signal
///
/// # Returns
///
/// `Ok(())` once a signal arrives, or an error if the handlers could not be
/// installed.
pub async fn wait_for_shutdown_signal() -> Result<(), Box<dyn std::error::Error>> {
    wait_for_shutdown_signal_silent().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    Ok(())
}

/// Same as [`wait_for_shutdown_signal`] without logging.
pub async fn wait_for_shutdown_signal_silent() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    Ok(())
}
