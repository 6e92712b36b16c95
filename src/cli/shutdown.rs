use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels `cancellation` on ctrl-c. Returns as soon as the token is cancelled from either side,
/// so it can be joined with the work it guards.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => {},
    };
}
