// Run-local memo of oracle answers.
//
// Every group head is asked the same questions once per noun placed, so
// without a memo the oracle call count grows with nouns x groups. The cache
// lives for a single analysis run; nothing crosses runs.

use std::collections::{HashMap, HashSet};

use crate::oracles::traits::{HyponymDepth, SimilarityOracle, TaxonomicOracle};

/// Lookup counters, logged at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized hyponym sets (per lemma, for the run's depth) and similarity
/// scores (per unordered pair).
#[derive(Debug)]
pub struct OracleCache {
    depth: HyponymDepth,
    hyponyms: HashMap<String, Option<HashSet<String>>>,
    similarity: HashMap<(String, String), Option<f64>>,
    known: HashMap<String, bool>,
    stats: CacheStats,
}

impl OracleCache {
    pub fn new(depth: HyponymDepth) -> Self {
        Self {
            depth,
            hyponyms: HashMap::new(),
            similarity: HashMap::new(),
            known: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn depth(&self) -> HyponymDepth {
        self.depth
    }

    pub fn hyponyms(
        &mut self,
        oracle: &dyn TaxonomicOracle,
        lemma: &str,
    ) -> Option<&HashSet<String>> {
        if self.hyponyms.contains_key(lemma) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let answer = oracle.hyponyms_of(lemma, self.depth);
            self.hyponyms.insert(lemma.to_string(), answer);
        }
        self.hyponyms.get(lemma).and_then(Option::as_ref)
    }

    pub fn similarity(&mut self, oracle: &dyn SimilarityOracle, a: &str, b: &str) -> Option<f64> {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if let Some(score) = self.similarity.get(&key) {
            self.stats.hits += 1;
            return *score;
        }
        self.stats.misses += 1;
        let score = oracle.similarity(a, b);
        self.similarity.insert(key, score);
        score
    }

    /// Whether the similarity oracle has a representation for the lemma.
    pub fn known_to_similarity(&mut self, oracle: &dyn SimilarityOracle, lemma: &str) -> bool {
        if let Some(known) = self.known.get(lemma) {
            self.stats.hits += 1;
            return *known;
        }
        self.stats.misses += 1;
        let known = oracle.knows(lemma);
        self.known.insert(lemma.to_string(), known);
        known
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSimilarity {
        calls: Cell<usize>,
    }

    impl SimilarityOracle for CountingSimilarity {
        fn similarity(&self, a: &str, b: &str) -> Option<f64> {
            self.calls.set(self.calls.get() + 1);
            if a == "ghost" || b == "ghost" {
                None
            } else {
                Some(0.5)
            }
        }

        fn knows(&self, lemma: &str) -> bool {
            lemma != "ghost"
        }
    }

    struct CountingTaxonomy {
        calls: Cell<usize>,
    }

    impl TaxonomicOracle for CountingTaxonomy {
        fn hyponyms_of(&self, lemma: &str, _depth: HyponymDepth) -> Option<HashSet<String>> {
            self.calls.set(self.calls.get() + 1);
            (lemma == "dog").then(|| HashSet::from(["puppy".to_string()]))
        }
    }

    #[test]
    fn test_similarity_memoized_per_unordered_pair() {
        let oracle = CountingSimilarity {
            calls: Cell::new(0),
        };
        let mut cache = OracleCache::new(HyponymDepth::Levels(1));
        assert_eq!(cache.similarity(&oracle, "a", "b"), Some(0.5));
        assert_eq!(cache.similarity(&oracle, "b", "a"), Some(0.5));
        assert_eq!(oracle.calls.get(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_absent_similarity_is_memoized_too() {
        let oracle = CountingSimilarity {
            calls: Cell::new(0),
        };
        let mut cache = OracleCache::new(HyponymDepth::Levels(1));
        assert_eq!(cache.similarity(&oracle, "ghost", "a"), None);
        assert_eq!(cache.similarity(&oracle, "a", "ghost"), None);
        assert_eq!(oracle.calls.get(), 1);
    }

    #[test]
    fn test_hyponyms_memoized_including_unknown() {
        let oracle = CountingTaxonomy {
            calls: Cell::new(0),
        };
        let mut cache = OracleCache::new(HyponymDepth::Levels(1));
        assert!(cache.hyponyms(&oracle, "dog").unwrap().contains("puppy"));
        assert!(cache.hyponyms(&oracle, "dog").is_some());
        assert!(cache.hyponyms(&oracle, "xyzzy").is_none());
        assert!(cache.hyponyms(&oracle, "xyzzy").is_none());
        assert_eq!(oracle.calls.get(), 2);
    }

    #[test]
    fn test_known_to_similarity() {
        let oracle = CountingSimilarity {
            calls: Cell::new(0),
        };
        let mut cache = OracleCache::new(HyponymDepth::Unbounded);
        assert!(cache.known_to_similarity(&oracle, "python"));
        assert!(!cache.known_to_similarity(&oracle, "ghost"));
        assert!(!cache.known_to_similarity(&oracle, "ghost"));
        assert_eq!(cache.stats().misses, 2);
    }
}
