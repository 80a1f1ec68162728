use tokio::signal::unix::{SignalKind, signal};

/// Resolves once the process receives SIGINT or SIGTERM.
///
/// The main loop races this future against the ticker, so shutdown takes
/// effect between ticks. An in-flight tick runs to completion first.
pub async fn shutdown_signal() {
    let mut sigint =
        signal(SignalKind::interrupt()).expect("Unable to install the SIGINT handler");
    let mut sigterm =
        signal(SignalKind::terminate()).expect("Unable to install the SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}
