// Stop-word corpus: loaded from the `stop-words` crate.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Source of the stop-word corpus used by the `stopwords` exclusion mode.
pub trait StopwordSource {
    fn stopwords(&self) -> HashSet<String>;
}

/// English stop words from the `stop-words` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishStopwords;

impl StopwordSource for EnglishStopwords {
    fn stopwords(&self) -> HashSet<String> {
        let words: Vec<String> = get(LANGUAGE::English);
        words.into_iter().map(|w| w.to_lowercase()).collect()
    }
}

/// A fixed stop-word list, mostly useful in tests and for custom corpora.
#[derive(Debug, Clone, Default)]
pub struct FixedStopwords(pub Vec<String>);

impl StopwordSource for FixedStopwords {
    fn stopwords(&self) -> HashSet<String> {
        self.0.iter().map(|w| w.to_lowercase()).collect()
    }
}
