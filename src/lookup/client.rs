use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{Field, Lookup, LookupFuture, LookupOutcome, Resource, xml};

/// Client for the Merriam-Webster XML reference API.
#[derive(Debug, Clone)]
pub struct MerriamWebster {
    client: reqwest::Client,
    base_url: String,
    resource: Resource,
    key: String,
}

impl MerriamWebster {
    pub fn new(
        base_url: impl Into<String>,
        resource: Resource,
        key: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, resource, key, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        resource: Resource,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "failed to build http client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            resource,
            key: key.into(),
        })
    }

    /// `{base}/references/{resource}/xml/{word}?key={key}`, with `word` encoded as one segment.
    pub fn request_url(&self, word: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid dictionary base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("dictionary base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["references", self.resource.as_str(), "xml", word]);
        url.query_pairs_mut().append_pair("key", &self.key);
        Ok(url)
    }

    async fn fetch(&self, word: &str, field: Field) -> Result<LookupOutcome> {
        if word.is_empty() {
            return Ok(LookupOutcome::not_found());
        }
        let url = self.request_url(word)?;
        debug!("querying {} for '{}'", self.resource.as_str(), word);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("dictionary request failed for '{}'", word))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read dictionary response for '{}'", word))?;
        if !status.is_success() {
            return Err(anyhow!(
                "dictionary API error ({}) for '{}': {}",
                status,
                word,
                body.trim()
            ));
        }
        xml::read_outcome(&body, word, field)
            .with_context(|| format!("unexpected dictionary response for '{}'", word))
    }
}

impl Lookup for MerriamWebster {
    fn lookup<'a>(&'a self, word: &'a str, field: Field) -> LookupFuture<'a> {
        Box::pin(self.fetch(word, field))
    }
}
