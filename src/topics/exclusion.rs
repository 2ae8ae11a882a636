// Exclusion: dropping uninteresting nouns and context words.
//
// The set is resolved once per run and compared case-insensitively, which
// covers the capitalized variants of every stop word.

use std::collections::HashSet;
use std::str::FromStr;

use super::observation::Observation;
use crate::error::{Result, TopicanError};
use crate::nlp::stopwords::StopwordSource;

/// Where the exclusion set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExclusionMode {
    #[default]
    None,
    /// The stop-word corpus
    Stopwords,
    /// A caller-supplied word list
    Explicit(Vec<String>),
}

impl FromStr for ExclusionMode {
    type Err = TopicanError;

    /// `none`, `stopwords`, or a comma-separated word list.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Err(TopicanError::Configuration(
                "exclusion mode must be 'none', 'stopwords' or a word list".into(),
            )),
            "none" | "false" => Ok(ExclusionMode::None),
            "stopwords" | "true" => Ok(ExclusionMode::Stopwords),
            _ => Ok(ExclusionMode::Explicit(
                trimmed.split(',').map(|w| w.trim().to_string()).collect(),
            )),
        }
    }
}

/// Resolved, lower-cased exclusion words.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    words: HashSet<String>,
}

impl ExclusionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn resolve(mode: &ExclusionMode, stopwords: &dyn StopwordSource) -> Result<Self> {
        let words = match mode {
            ExclusionMode::None => HashSet::new(),
            ExclusionMode::Stopwords => stopwords
                .stopwords()
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
            ExclusionMode::Explicit(list) => {
                if list.iter().any(|w| w.trim().is_empty()) {
                    return Err(TopicanError::Configuration(
                        "explicit exclusion list contains an empty entry".into(),
                    ));
                }
                list.iter().map(|w| w.trim().to_lowercase()).collect()
            }
        };
        Ok(Self { words })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The observation with excluded context words removed, or None when
    /// the noun itself is excluded.
    pub fn filter(&self, mut observation: Observation) -> Option<Observation> {
        if self.contains(&observation.noun) {
            return None;
        }
        observation.context.retain(|w| !self.contains(w));
        Some(observation)
    }
}
