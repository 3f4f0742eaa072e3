//! Cancellation at network call boundaries.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{IntegrationError, IntegrationResult};

/// Run `fut` unless `token` is cancelled first.
///
/// A token that is already cancelled short-circuits without polling `fut`,
/// so no request is issued.
pub async fn guarded<F, T>(token: &CancellationToken, fut: F) -> IntegrationResult<T>
where
    F: Future<Output = IntegrationResult<T>>,
{
    if token.is_cancelled() {
        debug!("Cancellation requested, skipping call");
        return Err(IntegrationError::Cancelled);
    }

    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("Call cancelled in flight");
            Err(IntegrationError::Cancelled)
        }
        result = fut => result,
    }
}
