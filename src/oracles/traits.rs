// Oracle traits: the swap-ready abstraction over lexical resources.
//
// The grouping core asks two questions of the outside world: "is X a kind of
// Y?" and "how close are X and Y?". Absence of an answer is modeled as None
// and always means "fall through to the next strategy", never an error.

use std::collections::HashSet;

use crate::error::Result;

/// How far down the hyponym tree a lookup may walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HyponymDepth {
    Unbounded,
    /// Only relations within this many levels (1 = direct hyponyms).
    Levels(usize),
}

impl HyponymDepth {
    /// Map the CLI convention (0 = unbounded) onto a depth.
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            HyponymDepth::Unbounded
        } else {
            HyponymDepth::Levels(limit)
        }
    }

    /// Whether hyponyms at `level` (1-based) are within bounds.
    pub fn allows(self, level: usize) -> bool {
        match self {
            HyponymDepth::Unbounded => true,
            HyponymDepth::Levels(max) => level <= max,
        }
    }
}

/// Is-a relations between noun lemmas (a WordNet-style hyponym tree).
pub trait TaxonomicOracle {
    /// All hyponyms of `lemma` within `depth`, or None if the lemma is unknown.
    fn hyponyms_of(&self, lemma: &str, depth: HyponymDepth) -> Option<HashSet<String>>;

    /// Whether `hyponym` is-a `hypernym` anywhere in the tree.
    fn is_hyponym_relation(&self, hyponym: &str, hypernym: &str) -> bool {
        self.hyponyms_of(hypernym, HyponymDepth::Unbounded)
            .is_some_and(|set| set.contains(hyponym))
    }

    /// Whether the lemma exists in the taxonomy at all.
    fn knows(&self, lemma: &str) -> bool {
        self.hyponyms_of(lemma, HyponymDepth::Levels(1)).is_some()
    }

    /// Fails if the backend has nothing loaded.
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Pairwise semantic similarity between lemmas (word vectors, embeddings).
pub trait SimilarityOracle {
    /// Symmetric, deterministic score, or None when either word is unknown.
    fn similarity(&self, a: &str, b: &str) -> Option<f64>;

    /// Whether the oracle has a representation for the lemma.
    fn knows(&self, lemma: &str) -> bool;

    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Taxonomy that knows nothing, for similarity-only runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTaxonomy;

impl TaxonomicOracle for NoTaxonomy {
    fn hyponyms_of(&self, _lemma: &str, _depth: HyponymDepth) -> Option<HashSet<String>> {
        None
    }
}
