use anyhow::Result;
use tracing::debug;

use crate::cache::ResultCache;
use crate::lookup::{Field, Lookup, LookupOutcome};

/// Marks `word` as untranslated.
pub fn format_unknown(word: &str) -> String {
    format!("<<{}>>", word)
}

/// Marks `items` as alternative translations of one word.
pub fn format_alternatives(items: &[String]) -> String {
    format!("[ {} ]", items.join(" | "))
}

pub fn render_word(word: &str, outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found(translations) => match translations.as_slice() {
            [single] => single.clone(),
            many => format_alternatives(many),
        },
        LookupOutcome::NotFound { .. } => format_unknown(word),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub words: usize,
    pub untranslated: usize,
}

/// Translates lines word by word through a run-scoped cache.
#[derive(Debug)]
pub struct LineTranslator<L: Lookup> {
    lookup: L,
    field: Field,
    cache: ResultCache,
}

impl<L: Lookup> LineTranslator<L> {
    pub fn new(lookup: L, field: Field) -> Self {
        Self {
            lookup,
            field,
            cache: ResultCache::new(),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn backend(&self) -> &L {
        &self.lookup
    }

    pub async fn translate_line(&mut self, line: &str) -> Result<String> {
        let (rendered, _) = self.translate_line_with_stats(line).await?;
        Ok(rendered)
    }

    pub async fn translate_line_with_stats(&mut self, line: &str) -> Result<(String, LineStats)> {
        let mut rendered = Vec::new();
        let mut stats = LineStats::default();
        for word in line.split(' ') {
            let outcome = self.cache.resolve(&self.lookup, word, self.field).await?;
            if let LookupOutcome::NotFound { alternatives } = &outcome {
                stats.untranslated += 1;
                if !alternatives.is_empty() {
                    debug!("'{}' not found; suggestions: {}", word, alternatives.join(", "));
                }
            }
            stats.words += 1;
            rendered.push(render_word(word, &outcome));
        }
        Ok((rendered.join(" "), stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FakeLookup;

    fn translator(backend: FakeLookup) -> LineTranslator<FakeLookup> {
        LineTranslator::new(backend, Field::Pronunciation)
    }

    #[tokio::test]
    async fn single_translation_is_bare() {
        let mut translator = translator(FakeLookup::new().with("cat", &["kæt"]));
        assert_eq!(translator.translate_line("cat").await.expect("line"), "kæt");
    }

    #[tokio::test]
    async fn multiple_translations_keep_order() {
        let mut translator = translator(FakeLookup::new().with("a", &["t1", "t2", "t3"]));
        assert_eq!(
            translator.translate_line("a").await.expect("line"),
            "[ t1 | t2 | t3 ]"
        );
    }

    #[tokio::test]
    async fn unknown_words_are_marked() {
        let mut translator = translator(FakeLookup::new());
        assert_eq!(translator.translate_line("sat").await.expect("line"), "<<sat>>");
    }

    #[tokio::test]
    async fn mixed_line_renders_each_word() {
        let backend = FakeLookup::new()
            .with("the", &["ðə"])
            .with("cat", &["kæt"])
            .with("run", &["rʌn", "rən"]);
        let mut translator = translator(backend);
        let (rendered, stats) = translator
            .translate_line_with_stats("the cat sat run")
            .await
            .expect("line");
        insta::assert_snapshot!(rendered, @"ðə kæt <<sat>> [ rʌn | rən ]");
        assert_eq!(
            stats,
            LineStats {
                words: 4,
                untranslated: 1
            }
        );
    }

    #[tokio::test]
    async fn token_count_matches_word_count() {
        let line = "one two three four five";
        let mut translator = translator(FakeLookup::new().with("two", &["tuː"]));
        let rendered = translator.translate_line(line).await.expect("line");
        assert_eq!(
            rendered.split(' ').count(),
            line.split_whitespace().count()
        );
    }

    #[tokio::test]
    async fn double_spaces_yield_empty_placeholders() {
        let mut translator = translator(FakeLookup::new().with("a", &["ə"]));
        assert_eq!(
            translator.translate_line("a  a").await.expect("line"),
            "ə <<>> ə"
        );
        assert_eq!(translator.backend().calls("a"), 1);
    }

    #[tokio::test]
    async fn repeated_words_query_once_per_run() {
        let mut translator = translator(FakeLookup::new().with("la", &["lɑː"]));
        translator.translate_line("la la").await.expect("first");
        translator.translate_line("la").await.expect("second");
        assert_eq!(translator.backend().calls("la"), 1);
        assert_eq!(translator.cache().lookups(), 1);
    }

    #[tokio::test]
    async fn transport_failure_aborts_the_line() {
        let mut translator = translator(FakeLookup::new().with("ok", &["oʊ"]).failing("boom"));
        assert!(translator.translate_line("ok boom").await.is_err());
    }

    #[test]
    fn alternatives_format() {
        let items = vec!["x".to_string(), "y".to_string()];
        assert_eq!(format_alternatives(&items), "[ x | y ]");
        assert_eq!(format_unknown("zz"), "<<zz>>");
    }
}
