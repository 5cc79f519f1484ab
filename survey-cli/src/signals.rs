use std::io;
use std::thread::JoinHandle;

use survey_common::Interrupt;

/// Raise `interrupt` on every SIGINT or SIGTERM.
///
/// The survey loop itself is blocking, so the listener runs on its own
/// thread with a single-threaded runtime.
pub fn spawn_listener(interrupt: Interrupt) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || runtime.block_on(forward_signals(interrupt)))
}

async fn forward_signals(interrupt: Interrupt) {
    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(sigterm) => Some(sigterm),
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                None
            }
        }
    };

    log::debug!("wait shutdown listeners");

    loop {
        #[cfg(unix)]
        let terminate = async {
            match sigterm.as_mut() {
                Some(sigterm) => {
                    sigterm.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                log::warn!("Stopping by Ctrl+C");
            },
            _ = terminate => {
                log::warn!("Stopping by terminate");
            },
        }

        interrupt.raise();
    }
}
