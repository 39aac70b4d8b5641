//! Debounced location suggestions.
//!
//! Each keystroke goes through [`SuggestionSearch::input`]. Only input that
//! stays unchanged for the debounce delay reaches the provider, and every
//! result is tagged with a sequence number so [`SuggestionList`] can drop
//! answers that arrive after a newer one.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{model::LocationSuggestion, provider::SuggestionProvider};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Input shorter than this never reaches the provider.
pub const MIN_QUERY_CHARS: usize = 3;

pub fn should_fetch(partial: &str) -> bool {
    partial.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Runs a task after a quiet period; scheduling again restarts the wait.
///
/// Only the wait is cancellable. Once the delay has elapsed the task runs
/// detached and is never aborted.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    timer: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, timer: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drop the scheduled task if its delay has not elapsed yet.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One provider answer (or a clear) for the input with sequence `seq`.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBatch {
    pub seq: u64,
    pub query: String,
    pub suggestions: Vec<LocationSuggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// A fetch will run after the debounce delay.
    Scheduled { seq: u64 },
    /// Input too short; suggestions are cleared without a fetch.
    Suppressed { seq: u64 },
}

impl InputOutcome {
    /// Sequence number of the batch this input will produce.
    pub fn seq(&self) -> u64 {
        match self {
            InputOutcome::Scheduled { seq } | InputOutcome::Suppressed { seq } => *seq,
        }
    }
}

#[derive(Debug)]
pub struct SuggestionSearch {
    provider: Arc<dyn SuggestionProvider>,
    debouncer: Debouncer,
    seq: u64,
    tx: mpsc::UnboundedSender<SuggestionBatch>,
}

impl SuggestionSearch {
    pub fn new(
        provider: Arc<dyn SuggestionProvider>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let search = Self { provider, debouncer: Debouncer::new(delay), seq: 0, tx };
        (search, rx)
    }

    pub fn input(&mut self, text: &str) -> InputOutcome {
        self.seq += 1;
        let seq = self.seq;
        let query = text.trim().to_string();

        if !should_fetch(&query) {
            self.debouncer.cancel();
            // Receiver gone means nobody is displaying suggestions anymore.
            let _ = self.tx.send(SuggestionBatch { seq, query, suggestions: Vec::new() });
            return InputOutcome::Suppressed { seq };
        }

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.debouncer.schedule(async move {
            let suggestions = match provider.fetch_suggestions(&query).await {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(%err, %query, "suggestion fetch failed");
                    Vec::new()
                }
            };
            tracing::debug!(seq, %query, count = suggestions.len(), "suggestions ready");
            let _ = tx.send(SuggestionBatch { seq, query, suggestions });
        });

        InputOutcome::Scheduled { seq }
    }

    /// Forget any input still waiting out the debounce delay.
    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

/// Suggestions currently offered to the user.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    latest: u64,
    items: Vec<LocationSuggestion>,
    visible: bool,
}

impl SuggestionList {
    /// Apply a batch unless a newer one was applied already.
    pub fn apply(&mut self, batch: SuggestionBatch) -> bool {
        if batch.seq <= self.latest {
            tracing::debug!(seq = batch.seq, latest = self.latest, "stale suggestions dropped");
            return false;
        }

        self.latest = batch.seq;
        self.visible = !batch.suggestions.is_empty();
        self.items = batch.suggestions;
        true
    }

    pub fn items(&self) -> &[LocationSuggestion] {
        &self.items
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hide the list after a suggestion was picked.
    pub fn hide(&mut self) {
        self.visible = false;
    }
}
