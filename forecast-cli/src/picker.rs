//! Location suggestions for the terminal: a debounced lookup followed by a
//! selection prompt.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use forecast_core::{
    SuggestionList, SuggestionProvider, SuggestionSearch,
    suggest::{InputOutcome, SuggestionBatch},
};
use inquire::Select;
use tokio::sync::mpsc;

use crate::render;

#[derive(Debug)]
pub struct SuggestionPicker {
    search: SuggestionSearch,
    batches: mpsc::UnboundedReceiver<SuggestionBatch>,
    list: SuggestionList,
}

impl SuggestionPicker {
    pub fn new(provider: Arc<dyn SuggestionProvider>, delay: Duration) -> Self {
        let (search, batches) = SuggestionSearch::new(provider, delay);
        Self { search, batches, list: SuggestionList::default() }
    }

    pub fn list(&self) -> &SuggestionList {
        &self.list
    }

    /// Feed `partial` through the debounced search and wait until the list
    /// reflects it.
    pub async fn lookup(&mut self, partial: &str) -> InputOutcome {
        let outcome = self.search.input(partial);

        while let Some(batch) = self.batches.recv().await {
            let seq = batch.seq;
            self.list.apply(batch);
            if seq >= outcome.seq() {
                break;
            }
        }

        outcome
    }

    /// The name to search for once the suggestion at `index` is picked.
    /// Picking hides the list.
    pub fn take(&mut self, index: usize) -> Option<String> {
        let name = self.list.items().get(index)?.name.clone();
        self.list.hide();
        Some(name)
    }

    /// Look up `partial` and let the user choose one of the results.
    /// `None` when nothing matched or the prompt was skipped.
    pub async fn pick(&mut self, partial: &str) -> Result<Option<String>> {
        if let InputOutcome::Suppressed { .. } = self.lookup(partial).await {
            println!("{}", render::short_input_hint());
            return Ok(None);
        }

        if !self.list.is_visible() {
            print!("{}", render::render_suggestions(&[]));
            return Ok(None);
        }

        let labels: Vec<String> = self.list.items().iter().map(render::suggestion_label).collect();
        let choice = Select::new("Pick a location:", labels).raw_prompt_skippable()?;

        Ok(match choice {
            Some(option) => self.take(option.index),
            None => {
                self.list.hide();
                None
            }
        })
    }
}
