//! Grouping of normalized readings into per-series batches.

use fieldline_types::{Batch, Datapoint};
use std::collections::HashMap;

/// Groups readings into one [`Batch`] per external identifier.
///
/// Batches come out in first-seen order, and datapoints keep their
/// arrival order within each batch.
#[derive(Debug, Default)]
pub struct BatchAssembler {
    batches: Vec<Batch>,
    index: HashMap<String, usize>,
}

impl BatchAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch for this external id has been started.
    pub fn contains(&self, external_id: &str) -> bool {
        self.index.contains_key(external_id)
    }

    pub fn push(&mut self, external_id: &str, datapoint: Datapoint) {
        match self.index.get(external_id) {
            Some(&position) => self.batches[position].push(datapoint),
            None => {
                self.index
                    .insert(external_id.to_string(), self.batches.len());
                let mut batch = Batch::new(external_id);
                batch.push(datapoint);
                self.batches.push(batch);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn into_batches(self) -> Vec<Batch> {
        self.batches
    }
}
