//! OS signal handling.

/// Resolve when a termination signal (SIGINT or SIGTERM) is delivered.
/// Returns the signal name for logging.
#[cfg(unix)]
pub async fn terminated() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
pub async fn terminated() -> &'static str {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    "ctrl-c"
}
