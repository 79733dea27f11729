//! Progress reporting types for sync operations.
//!
//! Producers never call back into the consumer. They push [`SyncProgress`]
//! events into an unbounded channel and move on; whoever holds the
//! [`ProgressReceiver`] may render, log, or drop them. A closed receiver is
//! not an error.

use tokio::sync::mpsc;

/// Outcome of reconciling a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A new record was inserted.
    Created,
    /// An existing record was overwritten.
    Updated,
    /// The item could not be persisted.
    Failed {
        /// Failure message.
        error: String,
    },
}

/// Progress events emitted during fetch and reconcile.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to walk the remote listing.
    FetchStarted {
        /// Name filter applied to every page request, if any.
        name: Option<String>,
    },

    /// Fetched a non-empty page.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of items on this page.
        count: usize,
        /// Running total of items fetched so far.
        fetched: usize,
        /// Total reported by the first page, if the API reported one.
        total: Option<usize>,
        /// `round(fetched / total * 100)` capped at 100, when the total is known.
        percent: Option<u8>,
    },

    /// A page request failed transiently and will be retried.
    PageRetry {
        /// Page number being retried.
        page: u32,
        /// HTTP status of the failed attempt.
        status: Option<u16>,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Number of failed attempts so far for this page.
        attempt: u32,
    },

    /// Finished walking the remote listing.
    FetchComplete {
        /// Total number of items fetched.
        fetched: usize,
    },

    /// Dry run stopped after fetching; nothing was persisted.
    DryRunComplete {
        /// Number of items that would have been reconciled.
        fetched: usize,
    },

    /// Starting to reconcile fetched items.
    ReconcileStarted {
        /// Number of items to reconcile.
        total: usize,
    },

    /// Reconciled (or failed to reconcile) one item.
    ItemReconciled {
        /// Display name of the item.
        name: String,
        /// What happened to it.
        outcome: ItemOutcome,
        /// Items processed so far, including this one.
        processed: usize,
        /// Items offered to the run.
        total: usize,
        /// Running count of inserted records.
        saved: usize,
        /// Running count of updated records.
        updated: usize,
        /// Running count of failures.
        errors: usize,
    },

    /// Reconciliation finished.
    ReconcileComplete {
        /// Number of inserted records.
        saved: usize,
        /// Number of updated records.
        updated: usize,
        /// Number of failed items.
        errors: usize,
    },
}

/// Sending half of a progress channel.
pub type ProgressSender = mpsc::UnboundedSender<SyncProgress>;

/// Receiving half of a progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<SyncProgress>;

/// Create a progress channel.
///
/// The channel is unbounded so that producers never wait on a slow renderer.
#[must_use]
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Emit a progress event if a sender is provided.
///
/// A dropped receiver is ignored; progress is observability only.
#[inline]
pub fn emit(on_progress: Option<&ProgressSender>, event: SyncProgress) {
    if let Some(tx) = on_progress
        && tx.send(event).is_err()
    {
        tracing::trace!("Progress receiver dropped, discarding event");
    }
}

/// Percentage of `fetched` over `total`, rounded to the nearest integer.
///
/// The result never exceeds 100, even when the catalog grows past the total
/// its first page reported. A zero total reports 100: there is nothing left
/// to fetch.
#[must_use]
pub fn percent_complete(fetched: usize, total: usize) -> u8 {
    if total == 0 || fetched >= total {
        return 100;
    }
    let pct = (fetched as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_with_sender_delivers_events_in_order() {
        let (tx, mut rx) = progress_channel();

        emit(Some(&tx), SyncProgress::FetchStarted { name: None });
        emit(Some(&tx), SyncProgress::FetchComplete { fetched: 10 });

        assert_eq!(
            rx.try_recv().expect("first event"),
            SyncProgress::FetchStarted { name: None }
        );
        assert_eq!(
            rx.try_recv().expect("second event"),
            SyncProgress::FetchComplete { fetched: 10 }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_without_sender_is_a_no_op() {
        emit(None, SyncProgress::FetchComplete { fetched: 10 });
    }

    #[test]
    fn emit_ignores_dropped_receiver() {
        let (tx, rx) = progress_channel();
        drop(rx);
        emit(Some(&tx), SyncProgress::ReconcileStarted { total: 3 });
    }

    #[test]
    fn percent_complete_rounds_to_nearest() {
        assert_eq!(percent_complete(0, 250), 0);
        assert_eq!(percent_complete(100, 250), 40);
        assert_eq!(percent_complete(1, 3), 33);
        assert_eq!(percent_complete(2, 3), 67);
        assert_eq!(percent_complete(250, 250), 100);
    }

    #[test]
    fn percent_complete_with_zero_total_is_full() {
        assert_eq!(percent_complete(0, 0), 100);
        assert_eq!(percent_complete(5, 0), 100);
    }

    #[test]
    fn percent_complete_caps_at_full_when_fetched_exceeds_total() {
        assert_eq!(percent_complete(12, 10), 100);
        assert_eq!(percent_complete(30, 10), 100);
        assert_eq!(percent_complete(usize::MAX, 1), 100);
    }

    #[test]
    fn sync_progress_debug_includes_item_name() {
        let event = SyncProgress::ItemReconciled {
            name: "Ember Drake".to_string(),
            outcome: ItemOutcome::Created,
            processed: 1,
            total: 2,
            saved: 1,
            updated: 0,
            errors: 0,
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("Ember Drake"));
        assert!(debug_str.contains("Created"));
    }
}
