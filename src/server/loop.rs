// Server loop module
// Accepts connections until a shutdown is requested, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections on `listener` until `shutdown` is notified.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// After shutdown the listener is closed and this waits for in-flight
/// connections, each of which is bounded by its own timeout.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Listener closed, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections).await;
}

/// Wait until every counted connection has finished
async fn drain_connections(active: &AtomicUsize) {
    let remaining = active.load(Ordering::SeqCst);
    if remaining == 0 {
        return;
    }

    logger::log_info(&format!("Waiting for {remaining} connection(s) to finish"));
    while active.load(Ordering::SeqCst) > 0 {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
    logger::log_info("All connections closed");
}
