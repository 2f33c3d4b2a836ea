use anyhow::Result;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

use crate::lookup::{Field, Lookup, LookupOutcome, Translations};

/// Successful lookups for the lifetime of one run.
#[derive(Debug, Default)]
pub struct ResultCache {
    map: HashMap<(Field, String), Translations>,
    lookups: usize,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, word: &str, field: Field) -> Option<&Translations> {
        self.map.get(&(field, word.to_string()))
    }

    /// Calls delegated to the backend, hits excluded. Words the backend
    /// answers locally (such as the empty word) still count.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub async fn resolve<L: Lookup>(
        &mut self,
        lookup: &L,
        word: &str,
        field: Field,
    ) -> Result<LookupOutcome> {
        if let Some(existing) = self.get(word, field) {
            return Ok(LookupOutcome::Found(existing.clone()));
        }
        self.lookups += 1;
        let outcome = lookup.lookup(word, field).await?;
        if let LookupOutcome::Found(translations) = &outcome {
            self.store(word, field, translations.clone());
        } else {
            debug!("'{}' not found; not caching", word);
        }
        Ok(outcome)
    }

    fn store(&mut self, word: &str, field: Field, translations: Translations) {
        // first write wins
        if let Entry::Vacant(slot) = self.map.entry((field, word.to_string())) {
            slot.insert(translations);
        }
    }
}
