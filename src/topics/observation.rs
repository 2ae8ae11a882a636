// Noun observations: turning tagged records into (noun, context) pairs.
//
// A record yields one observation per noun or proper-noun token. The context
// of a noun is every other content token in the same sentence, in order.

use crate::error::{Result, TopicanError};
use crate::nlp::tagger::{TaggedToken, Tagger};

/// One noun occurrence and the content words around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Lower-cased noun lemma
    pub noun: String,
    pub context: Vec<String>,
}

impl Observation {
    pub fn new(noun: &str, context: &[&str]) -> Self {
        Self {
            noun: noun.to_string(),
            context: context.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// One input record as read from a file or handed in by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Text(String),
    /// Null or absent value; contributes nothing and is not an error
    Missing,
    /// A value that is not text (number, boolean, array); described for
    /// diagnostics
    NonText(String),
    /// A line or row the reader could not parse; the reason is kept
    Malformed(String),
}

impl From<&str> for Record {
    fn from(text: &str) -> Self {
        Record::Text(text.to_string())
    }
}

impl From<String> for Record {
    fn from(text: String) -> Self {
        Record::Text(text)
    }
}

impl From<Option<String>> for Record {
    fn from(text: Option<String>) -> Self {
        text.map_or(Record::Missing, Record::Text)
    }
}

/// Extracts observations from tagged records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NounObservationCollector {
    mark_negations: bool,
}

impl NounObservationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report context words after a negator as `not_<word>` / `no_<word>`.
    pub fn with_negation_marking(mut self, enabled: bool) -> Self {
        self.mark_negations = enabled;
        self
    }

    /// Observations for one record. Non-text records and tagger failures
    /// come back as `TopicanError::Input` for the caller to skip.
    pub fn collect(
        &self,
        tagger: &dyn Tagger,
        index: usize,
        record: &Record,
    ) -> Result<Vec<Observation>> {
        match record {
            Record::Missing => Ok(Vec::new()),
            Record::NonText(found) => Err(TopicanError::Input {
                index,
                reason: format!("expected text, found {found}"),
            }),
            Record::Malformed(reason) => Err(TopicanError::Input {
                index,
                reason: reason.clone(),
            }),
            Record::Text(text) => {
                let tokens = tagger.tag(text).map_err(|e| TopicanError::Input {
                    index,
                    reason: format!("tagging failed: {e}"),
                })?;
                Ok(self.observations_from_tokens(&tokens))
            }
        }
    }

    /// Observations from an already tagged token stream.
    pub fn observations_from_tokens(&self, tokens: &[TaggedToken]) -> Vec<Observation> {
        let mut observations = Vec::new();

        for sentence in tokens.chunk_by(|a, b| a.sentence == b.sentence) {
            // (position in sentence, context form) for every content token
            let content: Vec<(usize, String)> = sentence
                .iter()
                .enumerate()
                .filter(|(_, t)| t.category.is_content() && !t.lemma.trim().is_empty())
                .map(|(i, t)| (i, self.context_form(sentence, i)))
                .collect();

            for (pos, token) in sentence.iter().enumerate() {
                if !token.category.is_noun() {
                    continue;
                }
                let noun = token.lemma.trim().to_lowercase();
                if noun.is_empty() {
                    continue;
                }
                let context = content
                    .iter()
                    .filter(|(i, _)| *i != pos)
                    .map(|(_, w)| w.clone())
                    .collect();
                observations.push(Observation { noun, context });
            }
        }

        observations
    }

    fn context_form(&self, sentence: &[TaggedToken], pos: usize) -> String {
        let word = sentence[pos].lemma.trim().to_lowercase();
        if !self.mark_negations || pos == 0 {
            return word;
        }
        match negation_prefix(&sentence[pos - 1].text) {
            Some(prefix) => format!("{prefix}_{word}"),
            None => word,
        }
    }
}

fn negation_prefix(token: &str) -> Option<&'static str> {
    let lower = token.to_lowercase().replace('’', "'");
    match lower.as_str() {
        "no" => Some("no"),
        "not" | "never" => Some("not"),
        w if w.ends_with("n't") => Some("not"),
        _ => None,
    }
}
