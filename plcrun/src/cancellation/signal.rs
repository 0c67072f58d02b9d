//! Ctrl-C wiring.

use super::CancellationToken;
use std::io;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Cancels `token` on Ctrl-C until the returned task is aborted.
///
/// The handler is installed before this returns, so an interrupt that lands
/// while the first tool is spawning still reaches the token. Repeated
/// presses are absorbed. Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn listen_for_interrupts(token: Arc<CancellationToken>) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        while interrupts.recv().await.is_some() {
            if token.cancel("interrupt") {
                info!("Interrupt received");
            }
        }
    }))
}

/// Cancels `token` on Ctrl-C until the returned task is aborted.
#[cfg(windows)]
pub fn listen_for_interrupts(token: Arc<CancellationToken>) -> io::Result<JoinHandle<()>> {
    let mut interrupts = tokio::signal::windows::ctrl_c()?;
    Ok(tokio::spawn(async move {
        while interrupts.recv().await.is_some() {
            if token.cancel("interrupt") {
                info!("Interrupt received");
            }
        }
    }))
}
