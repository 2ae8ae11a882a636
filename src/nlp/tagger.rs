// Part-of-speech tagging contract and a rule-based default tagger.
//
// RuleTagger is a closed-class function word list, a
// small table of common verbs and adjectives, suffix heuristics, and an
// optional JSON lexicon that overrides everything else. It is good enough for
// short free-text answers; a statistical tagger can replace it through the
// Tagger trait without touching the grouping code.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TopicanError};

/// Grammatical category of a token, as far as the grouping core cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosCategory {
    Noun,
    #[serde(rename = "propn")]
    ProperNoun,
    Verb,
    #[serde(rename = "adj")]
    Adjective,
    #[serde(rename = "adv")]
    Adverb,
    #[serde(rename = "num")]
    Numeral,
    /// Closed-class words: pronouns, determiners, auxiliaries, conjunctions...
    Function,
    #[serde(rename = "punct")]
    Punctuation,
    Other,
}

impl PosCategory {
    /// Common nouns and proper nouns both produce observations.
    pub fn is_noun(self) -> bool {
        matches!(self, PosCategory::Noun | PosCategory::ProperNoun)
    }

    /// Content-bearing tokens are eligible as context words.
    pub fn is_content(self) -> bool {
        !matches!(self, PosCategory::Function | PosCategory::Punctuation)
    }
}

impl FromStr for PosCategory {
    type Err = TopicanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noun" => Ok(PosCategory::Noun),
            "propn" | "proper" | "proper_noun" => Ok(PosCategory::ProperNoun),
            "verb" => Ok(PosCategory::Verb),
            "adj" | "adjective" => Ok(PosCategory::Adjective),
            "adv" | "adverb" => Ok(PosCategory::Adverb),
            "num" | "numeral" => Ok(PosCategory::Numeral),
            "function" | "det" | "pron" | "aux" | "cconj" | "sconj" | "adp" | "part" => {
                Ok(PosCategory::Function)
            }
            "punct" | "punctuation" => Ok(PosCategory::Punctuation),
            "other" | "x" => Ok(PosCategory::Other),
            other => Err(TopicanError::Configuration(format!(
                "unknown part-of-speech category '{other}'"
            ))),
        }
    }
}

/// One token as produced by a tagger.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    /// Surface form as it appeared in the text
    pub text: String,
    /// Dictionary form (lower-cased by the collector before grouping)
    pub lemma: String,
    pub category: PosCategory,
    /// Zero-based sentence index within the record
    pub sentence: usize,
}

impl TaggedToken {
    pub fn new(text: &str, lemma: &str, category: PosCategory, sentence: usize) -> Self {
        Self {
            text: text.to_string(),
            lemma: lemma.to_string(),
            category,
            sentence,
        }
    }
}

/// Trait for turning one text record into tagged tokens.
pub trait Tagger {
    /// Tag a record. An error skips the record; it never aborts the batch.
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>>;
}

/// A lexicon entry overriding the heuristics for one surface form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    #[serde(default)]
    pub lemma: Option<String>,
    pub category: PosCategory,
}

const FUNCTION_WORDS: &[&str] = &[
    // pronouns
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "he", "him", "his",
    "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us", "our", "ours",
    "ourselves", "they", "them", "their", "theirs", "themselves", "who", "whom", "whose", "which",
    "what", "this", "that", "these", "those", "i'm", "i've", "i'd", "i'll", "it's", "you're",
    "we're", "they're",
    // determiners and quantifiers
    "a", "an", "the", "any", "some", "no", "every", "each", "all", "both", "either", "neither",
    "more", "most", "much", "many", "few", "less", "least", "such", "other", "another", "own",
    // prepositions
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "out", "off",
    "over", "under", "around", "without", "within", "per", "via",
    // conjunctions
    "and", "but", "or", "nor", "so", "yet", "if", "because", "as", "until", "while", "than",
    "though", "although", "whether", "then", "when", "where", "why", "how",
    // auxiliaries and modals
    "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "will", "would", "shall", "should", "can", "could", "may",
    "might", "must", "ought",
    // negators and contracted auxiliaries
    "not", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't", "weren't",
    "haven't", "hasn't", "hadn't", "won't", "wouldn't", "can't", "cannot", "couldn't",
    "shouldn't", "mustn't",
    // particles and fillers
    "there", "here", "just", "only", "also", "too", "very", "again", "once", "ever",
];

const COMMON_VERBS: &[&str] = &[
    "like", "love", "hate", "prefer", "want", "need", "think", "know", "feel", "get", "got",
    "make", "made", "go", "went", "use", "used", "try", "find", "found", "give", "take", "see",
    "say", "said", "help", "enjoy", "dislike", "wish", "hope", "work", "learn", "keep", "let",
    "seem", "come", "came", "tell", "ask", "mean", "leave", "put", "run", "pay", "buy", "miss",
];

const COMMON_ADJECTIVES: &[&str] = &[
    "good", "bad", "great", "best", "better", "worse", "worst", "nice", "new", "old", "big",
    "small", "easy", "hard", "fast", "slow", "happy", "sad", "poor", "long", "short", "high",
    "low", "friendly", "helpful", "rude", "clean", "dirty", "cheap", "expensive",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ish"];

/// Heuristic tagger with an optional lexicon.
pub struct RuleTagger {
    token_re: Regex,
    function_words: HashSet<&'static str>,
    verbs: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
    lexicon: HashMap<String, LexiconEntry>,
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTagger {
    pub fn new() -> Self {
        // Words keep inner apostrophes, hyphens and trailing "++"/"#" ("C++",
        // "don't", "well-known"); each sentence or clause mark is its own token.
        let token_re = Regex::new(r#"[^\s.,;:!?()\[\]{}"“”…]+|[.,;:!?()\[\]{}"“”…]"#)
            .expect("token pattern is valid");
        Self {
            token_re,
            function_words: FUNCTION_WORDS.iter().copied().collect(),
            verbs: COMMON_VERBS.iter().copied().collect(),
            adjectives: COMMON_ADJECTIVES.iter().copied().collect(),
            lexicon: HashMap::new(),
        }
    }

    /// Add lexicon entries. Keys are matched case-insensitively.
    pub fn with_lexicon(mut self, lexicon: HashMap<String, LexiconEntry>) -> Self {
        for (word, entry) in lexicon {
            self.lexicon.insert(word.to_lowercase(), entry);
        }
        self
    }

    /// Load a lexicon from a JSON object `{ "word": {"lemma": "...", "category": "noun"} }`.
    pub fn load_lexicon(path: &Path) -> Result<HashMap<String, LexiconEntry>> {
        let raw =
            std::fs::read_to_string(path).map_err(|e| TopicanError::resource(path, e))?;
        let lexicon: HashMap<String, LexiconEntry> =
            serde_json::from_str(&raw).map_err(|e| TopicanError::invalid_data(path, e))?;
        debug!(entries = lexicon.len(), path = %path.display(), "Loaded tagger lexicon");
        Ok(lexicon)
    }

    fn classify(&self, word: &str, lower: &str, sentence_initial: bool) -> (String, PosCategory) {
        if let Some(entry) = self.lexicon.get(lower) {
            let lemma = entry.lemma.clone().unwrap_or_else(|| lower.to_string());
            return (lemma, entry.category);
        }

        if lower.ends_with("n't") || self.function_words.contains(lower) {
            return (lower.to_string(), PosCategory::Function);
        }
        if lower.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
            return (lower.to_string(), PosCategory::Numeral);
        }
        if self.verbs.contains(lower) {
            return (lower.to_string(), PosCategory::Verb);
        }
        if self.adjectives.contains(lower) {
            return (lower.to_string(), PosCategory::Adjective);
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return (lower.to_string(), PosCategory::Adverb);
        }

        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        if capitalized && !sentence_initial {
            return (lower.to_string(), PosCategory::ProperNoun);
        }
        if lower.len() > 5 && (lower.ends_with("ing") || lower.ends_with("ed")) {
            return (lower.to_string(), PosCategory::Verb);
        }
        if lower.len() > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return (lower.to_string(), PosCategory::Adjective);
        }

        // A capitalized noun keeps its surface form wherever it sits.
        if capitalized {
            return (lower.to_string(), PosCategory::Noun);
        }
        (singular(lower), PosCategory::Noun)
    }
}

impl Tagger for RuleTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let mut tokens = Vec::new();
        let mut sentence = 0;
        let mut sentence_initial = true;
        let mut sentence_has_words = false;

        for m in self.token_re.find_iter(text) {
            let raw = m.as_str();
            if is_punctuation(raw) {
                tokens.push(TaggedToken::new(raw, raw, PosCategory::Punctuation, sentence));
                if matches!(raw, "." | "!" | "?" | "…") && sentence_has_words {
                    sentence += 1;
                    sentence_initial = true;
                    sentence_has_words = false;
                }
                continue;
            }

            let word = raw.trim_matches(|c: char| c == '\'' || c == '’' || c == '-');
            if word.is_empty() {
                continue;
            }
            let lower = word.to_lowercase().replace('’', "'");
            let (lemma, category) = self.classify(word, &lower, sentence_initial);
            tokens.push(TaggedToken::new(word, &lemma, category, sentence));
            sentence_initial = false;
            sentence_has_words = true;
        }

        Ok(tokens)
    }
}

fn is_punctuation(token: &str) -> bool {
    token.chars().count() == 1 && !token.chars().all(char::is_alphanumeric)
}

/// Naive English singularization for nouns ("cities" -> "city").
fn singular(word: &str) -> String {
    let len = word.len();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..len - 3]);
    }
    if len > 4
        && (word.ends_with("sses")
            || word.ends_with("xes")
            || word.ends_with("ches")
            || word.ends_with("shes"))
    {
        return word[..len - 2].to_string();
    }
    if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..len - 1].to_string();
    }
    word.to_string()
}
