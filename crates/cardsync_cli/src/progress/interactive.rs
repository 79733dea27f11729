use std::sync::Mutex;
use std::time::Duration;

use cardsync::sync::{ItemOutcome, SyncProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Bars for the two phases of a run.
#[derive(Default)]
struct ProgressState {
    /// Fetch bar. A spinner until the first page reports a total.
    fetch_bar: Option<ProgressBar>,
    /// Reconcile bar, sized by `ReconcileStarted`.
    save_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// Reporter that draws nowhere.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::FetchStarted { name } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::counter_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_prefix(format!("{:10}", "Fetching"));
                pb.set_message(match name {
                    Some(name) => format!("cards matching '{name}'"),
                    None => "catalog".to_string(),
                });
                state.fetch_bar = Some(pb);
            }

            SyncProgress::FetchedPage {
                page,
                fetched,
                total,
                ..
            } => {
                if let Some(ref pb) = state.fetch_bar {
                    if let Some(total) = total
                        && pb.length().is_none()
                    {
                        pb.disable_steady_tick();
                        pb.set_length(total as u64);
                        pb.set_style(Self::bar_style());
                    }
                    pb.set_position(fetched as u64);
                    pb.set_message(format!("page {page}"));
                }
            }

            SyncProgress::PageRetry {
                page,
                status,
                retry_after_ms,
                attempt,
            } => {
                if let Some(ref pb) = state.fetch_bar {
                    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
                    pb.set_message(format!(
                        "page {page} failed ({status}), retry {attempt} in {retry_after_ms}ms"
                    ));
                }
            }

            SyncProgress::FetchComplete { fetched } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.set_length(fetched as u64);
                    pb.set_style(Self::bar_style());
                    pb.finish_with_message(format!("{fetched} cards"));
                }
            }

            SyncProgress::DryRunComplete { fetched } => {
                self.multi
                    .println(format!("Dry run: {fetched} cards fetched, nothing saved"))
                    .ok();
            }

            SyncProgress::ReconcileStarted { total } => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:10}", "Saving"));
                state.save_bar = Some(pb);
            }

            SyncProgress::ItemReconciled {
                name,
                outcome,
                processed,
                ..
            } => {
                if let ItemOutcome::Failed { error } = &outcome {
                    self.multi.println(format!("  ✗ {name}: {error}")).ok();
                }
                if let Some(ref pb) = state.save_bar {
                    pb.set_position(processed as u64);
                    pb.set_message(name);
                }
            }

            SyncProgress::ReconcileComplete {
                saved,
                updated,
                errors,
            } => {
                if let Some(ref pb) = state.save_bar {
                    pb.finish_with_message(format!(
                        "{saved} new, {updated} updated, {errors} failed"
                    ));
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.fetch_bar, &state.save_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    /// Whether every bar created so far has finished.
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        [&state.fetch_bar, &state.save_bar]
            .into_iter()
            .flatten()
            .all(ProgressBar::is_finished)
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>5} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
