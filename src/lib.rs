use anyhow::{Context, Result, anyhow};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod cache;
pub mod logging;
pub mod lookup;
pub mod settings;
pub mod throttle;
pub mod translator;

#[cfg(test)]
mod test_util;

pub use cache::ResultCache;
pub use settings::SettingsScope;
pub use lookup::{
    Field, Lookup, LookupFuture, LookupOutcome, MerriamWebster, Resource, Translations,
};
pub use throttle::{NoPause, RandomPause, RateLimiter};
pub use translator::{LineStats, LineTranslator};

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub field: Field,
    pub key: Option<String>,
    pub resource: Option<Resource>,
    pub settings_path: Option<String>,
    /// Defaults to the current directory and `$HOME/.mw-ipa`.
    pub settings_scope: Option<SettingsScope>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub words: usize,
    pub untranslated: usize,
    /// Backend lookups, cache hits excluded.
    pub lookups: usize,
}

pub async fn run(config: Config) -> Result<RunSummary> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let scope = config
        .settings_scope
        .clone()
        .unwrap_or_else(SettingsScope::from_env);
    let settings = settings::load_settings_in(&scope, settings_path)?;
    let resource = config.resource.unwrap_or(settings.resource);
    let key = settings
        .resolve_key(resource, config.key.as_deref())
        .ok_or_else(|| {
            anyhow!(
                "no API key supplied for the {} dictionary (use --key, {}, MW_API_KEY or [keys] in settings)",
                resource.as_str(),
                resource.key_env()
            )
        })?;

    let client =
        MerriamWebster::with_timeout(settings.base_url.clone(), resource, key, settings.timeout)?;
    let mut translator = LineTranslator::new(client, config.field);
    let mut limiter = RandomPause::new(settings.throttle_probability, settings.throttle_delay);

    run_with(&config.input, &config.output, &mut translator, &mut limiter).await
}

/// Translates every line of `input` into `original\ttranslation` rows in `output`.
pub async fn run_with<L: Lookup, R: RateLimiter>(
    input: &Path,
    output: &Path,
    translator: &mut LineTranslator<L>,
    limiter: &mut R,
) -> Result<RunSummary> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("failed to read input: {}", input.display()))?;
    let file = File::create(output)
        .with_context(|| format!("failed to create output: {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let lines = content.lines().collect::<Vec<_>>();
    let total = lines.len();
    let lookups_before = translator.cache().lookups();
    let mut summary = RunSummary::default();

    for (index, line) in lines.iter().enumerate() {
        let line = line.trim();
        println!("{}/{}", index + 1, total);
        limiter.wait_before_next().await;

        let (rendered, stats) = translator.translate_line_with_stats(line).await?;
        writeln!(writer, "{}\t{}", line, rendered)
            .and_then(|_| writer.flush())
            .with_context(|| format!("failed to write output: {}", output.display()))?;

        summary.lines += 1;
        summary.words += stats.words;
        summary.untranslated += stats.untranslated;
    }

    summary.lookups = translator.cache().lookups() - lookups_before;
    info!(
        "wrote {} lines ({} words, {} untranslated, {} lookups)",
        summary.lines, summary.words, summary.untranslated, summary.lookups
    );
    Ok(summary)
}
