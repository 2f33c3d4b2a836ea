use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::lookup::{Field, Lookup, LookupFuture, LookupOutcome, Translations};

const KEY_ENV_VARS: [&str; 3] = ["MW_LEARNERS_KEY", "MW_COLLEGIATE_KEY", "MW_API_KEY"];

/// Runs `func` with the API key variables unset, restoring them afterwards.
pub(crate) fn without_key_env<F, R>(func: F) -> R
where
    F: FnOnce() -> R,
{
    static ENV_MUTEX: Mutex<()> = Mutex::new(());
    let _guard = ENV_MUTEX
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let saved = KEY_ENV_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect::<Vec<_>>();
    for name in KEY_ENV_VARS {
        // SAFETY: serialized by ENV_MUTEX; only `run` reads these variables.
        unsafe { std::env::remove_var(name) };
    }
    let result = func();
    for (name, value) in saved {
        if let Some(value) = value {
            // SAFETY: as above.
            unsafe { std::env::set_var(name, value) };
        }
    }
    result
}

/// In-memory backend that counts calls per word.
#[derive(Debug, Default)]
pub(crate) struct FakeLookup {
    entries: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeLookup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, word: &str, translations: &[&str]) -> Self {
        self.entries.insert(
            word.to_string(),
            translations.iter().map(|item| item.to_string()).collect(),
        );
        self
    }

    pub(crate) fn failing(mut self, word: &str) -> Self {
        self.failing.insert(word.to_string());
        self
    }

    pub(crate) fn calls(&self, word: &str) -> usize {
        let calls = self.calls.lock().expect("calls lock");
        calls.get(word).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").values().sum()
    }
}

impl Lookup for FakeLookup {
    fn lookup<'a>(&'a self, word: &'a str, _field: Field) -> LookupFuture<'a> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(word.to_string())
            .or_insert(0) += 1;
        let result = if self.failing.contains(word) {
            Err(anyhow!("connection refused for '{}'", word))
        } else {
            Ok(self
                .entries
                .get(word)
                .cloned()
                .and_then(Translations::new)
                .map(LookupOutcome::Found)
                .unwrap_or_else(LookupOutcome::not_found))
        };
        Box::pin(async move { result })
    }
}
