//! Retry policy for catalog page requests.
//!
//! Transient page failures are retried after a constant wait of twice the
//! inter-page delay. The wait never grows. The number of retries is unbounded
//! unless a cap is configured.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};

use crate::sync::{ProgressSender, SyncProgress, emit};

/// Configuration for page retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Wait between a failed attempt and the next one.
    pub delay: Duration,
    /// Cap on retries for a single page. `None` retries until the page succeeds
    /// or fails with a non-transient error.
    pub max_retries: Option<usize>,
}

impl RetryConfig {
    /// Retry policy derived from the inter-page delay: wait `delay * 2`.
    #[must_use]
    pub fn for_page_delay(delay: Duration, max_retries: Option<usize>) -> Self {
        Self {
            delay: delay.saturating_mul(2),
            max_retries,
        }
    }

    /// Build a constant backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries.unwrap_or(usize::MAX))
    }
}

/// Execute a page request, retrying transient failures.
///
/// Before each wait a [`SyncProgress::PageRetry`] event is emitted with the
/// number of failed attempts so far. Errors for which `is_transient` returns
/// false are returned immediately.
///
/// # Arguments
///
/// * `operation` - Issues one attempt of the request.
/// * `config` - Wait and cap for retries.
/// * `is_transient` - Whether an error is worth retrying.
/// * `status_of` - HTTP status carried by an error, if any.
/// * `short_message` - Short error message for logging.
/// * `page` - Page number, for progress and logs.
/// * `on_progress` - Optional progress channel.
pub async fn with_retry<T, E, F, Fut, IsTransient, StatusOf, ShortMsg>(
    mut operation: F,
    config: RetryConfig,
    is_transient: IsTransient,
    status_of: StatusOf,
    short_message: ShortMsg,
    page: u32,
    on_progress: Option<&ProgressSender>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsTransient: Fn(&E) -> bool + Send + Sync + 'static,
    StatusOf: Fn(&E) -> Option<u16> + Send + Sync + 'static,
    ShortMsg: Fn(&E) -> String + Send + Sync + 'static,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.into_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            emit(
                on_progress,
                SyncProgress::PageRetry {
                    page,
                    status: status_of(err),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                },
            );
            tracing::warn!(
                page,
                attempt = current_attempt,
                "Transient failure fetching page, retrying in {:?}: {}",
                dur,
                short_message(err)
            );
        })
        .when(is_transient)
        .await
}
