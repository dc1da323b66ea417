use crate::error::MigrationError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `token` fires first, in which case `fut` is dropped.
pub(crate) async fn cancellable<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, MigrationError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(MigrationError::Cancelled),
        output = fut => Ok(output),
    }
}

pub(crate) async fn sleep(token: &CancellationToken, delay: Duration) -> Result<(), MigrationError> {
    cancellable(token, tokio::time::sleep(delay)).await
}
