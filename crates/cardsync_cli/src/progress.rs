//! Progress reporting for sync operations.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bars using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing
//!
//! The library pushes events into a channel; [`ProgressReporter::spawn`]
//! drains it on a background task until every sender is dropped.

mod interactive;
mod logging;

use std::sync::Arc;

use cardsync::sync::{ProgressReceiver, SyncProgress};
use console::Term;
use tokio::task::JoinHandle;

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }

    /// Drain `rx` on a background task. The task ends, with bars finished,
    /// once every sender has been dropped.
    pub fn spawn(self: Arc<Self>, mut rx: ProgressReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.handle(event);
            }
            self.finish();
        })
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsync::sync::{ItemOutcome, emit, progress_channel};

    #[tokio::test]
    async fn spawned_reporter_stops_when_senders_drop() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let (tx, rx) = progress_channel();
        let handle = Arc::clone(&reporter).spawn(rx);

        emit(Some(&tx), SyncProgress::FetchStarted { name: None });
        emit(
            Some(&tx),
            SyncProgress::ItemReconciled {
                name: "Ember Drake".to_string(),
                outcome: ItemOutcome::Created,
                processed: 1,
                total: 1,
                saved: 1,
                updated: 0,
                errors: 0,
            },
        );
        drop(tx);

        handle.await.expect("reporter task should not panic");
    }

    #[tokio::test]
    async fn interactive_reporter_handles_full_run() {
        let reporter = Arc::new(ProgressReporter::Interactive(InteractiveReporter::hidden()));
        let (tx, rx) = progress_channel();
        let handle = Arc::clone(&reporter).spawn(rx);

        for event in [
            SyncProgress::FetchStarted {
                name: Some("Ember".to_string()),
            },
            SyncProgress::FetchedPage {
                page: 1,
                count: 2,
                fetched: 2,
                total: Some(3),
                percent: Some(67),
            },
            SyncProgress::PageRetry {
                page: 2,
                status: Some(503),
                retry_after_ms: 200,
                attempt: 1,
            },
            SyncProgress::FetchedPage {
                page: 2,
                count: 1,
                fetched: 3,
                total: Some(3),
                percent: Some(100),
            },
            SyncProgress::FetchComplete { fetched: 3 },
            SyncProgress::ReconcileStarted { total: 3 },
            SyncProgress::ItemReconciled {
                name: "Broken".to_string(),
                outcome: ItemOutcome::Failed {
                    error: "name is required".to_string(),
                },
                processed: 1,
                total: 3,
                saved: 0,
                updated: 0,
                errors: 1,
            },
            SyncProgress::ReconcileComplete {
                saved: 2,
                updated: 0,
                errors: 1,
            },
        ] {
            emit(Some(&tx), event);
        }
        drop(tx);

        handle.await.expect("reporter task should not panic");
        if let ProgressReporter::Interactive(r) = reporter.as_ref() {
            assert!(r.is_finished());
        }
    }
}
