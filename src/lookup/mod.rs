use anyhow::Result;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

mod client;
pub mod xml;

pub use client::MerriamWebster;

/// Dictionary resource addressed in the request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Learners,
    Collegiate,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Learners => "learners",
            Resource::Collegiate => "collegiate",
        }
    }

    pub(crate) fn key_env(&self) -> &'static str {
        match self {
            Resource::Learners => "MW_LEARNERS_KEY",
            Resource::Collegiate => "MW_COLLEGIATE_KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pronunciation,
    PartOfSpeech,
}

impl Field {
    /// Child element of `entry` holding this field.
    pub fn tag(&self) -> &'static str {
        match self {
            Field::Pronunciation => "pr",
            Field::PartOfSpeech => "fl",
        }
    }
}

/// Translations found for one word. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translations(Vec<String>);

impl Translations {
    pub fn new(items: Vec<String>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Translations),
    NotFound { alternatives: Vec<String> },
}

impl LookupOutcome {
    pub fn not_found() -> Self {
        LookupOutcome::NotFound {
            alternatives: Vec::new(),
        }
    }
}

pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<LookupOutcome>> + Send + 'a>>;

/// A dictionary backend answering one word at a time.
pub trait Lookup {
    fn lookup<'a>(&'a self, word: &'a str, field: Field) -> LookupFuture<'a>;
}
