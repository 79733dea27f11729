use cardsync::sync::{ItemOutcome, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchStarted { name } => {
                tracing::info!(name = ?name, "Fetching catalog");
            }

            SyncProgress::FetchedPage {
                page,
                count,
                fetched,
                total,
                percent,
            } => {
                tracing::info!(page, count, fetched, total = ?total, percent = ?percent, "Fetched page");
            }

            SyncProgress::PageRetry {
                page,
                status,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(page, status = ?status, retry_after_ms, attempt, "Page failed, backing off");
            }

            SyncProgress::FetchComplete { fetched } => {
                tracing::info!(fetched, "Fetch complete");
            }

            SyncProgress::DryRunComplete { fetched } => {
                tracing::info!(fetched, "Dry run, nothing saved");
            }

            SyncProgress::ReconcileStarted { total } => {
                tracing::info!(total, "Saving cards");
            }

            SyncProgress::ItemReconciled {
                name,
                outcome,
                processed,
                total,
                ..
            } => match outcome {
                ItemOutcome::Created => {
                    tracing::debug!(card = %name, processed, total, "Created");
                }
                ItemOutcome::Updated => {
                    tracing::debug!(card = %name, processed, total, "Updated");
                }
                ItemOutcome::Failed { error } => {
                    tracing::error!(card = %name, error = %error, "Failed to save");
                }
            },

            SyncProgress::ReconcileComplete {
                saved,
                updated,
                errors,
            } => {
                tracing::info!(saved, updated, errors, "Save complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
