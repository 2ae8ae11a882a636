// Hyponym table: a taxonomic oracle backed by a JSON export of an is-a tree.
//
// The file maps each hypernym to its direct hyponyms:
//
//   { "animal": ["dog", "cat"], "dog": ["puppy", "terrier"] }
//
// Lookups walk the tree breadth-first, one level at a time, so a depth bound
// of 1 returns direct hyponyms only. Cycles in hand-edited files are tolerated.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use super::traits::{HyponymDepth, TaxonomicOracle};
use crate::error::{Result, TopicanError};

/// In-memory is-a tree keyed by lower-cased lemma.
#[derive(Debug, Clone, Default)]
pub struct HyponymTable {
    children: HashMap<String, Vec<String>>,
    known: HashSet<String>,
}

impl HyponymTable {
    /// Build a table from hypernym -> direct hyponyms edges.
    pub fn new(edges: HashMap<String, Vec<String>>) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut known = HashSet::new();

        for (hypernym, hyponyms) in edges {
            let hypernym = hypernym.to_lowercase();
            known.insert(hypernym.clone());
            let entry = children.entry(hypernym).or_default();
            for hyponym in hyponyms {
                let hyponym = hyponym.to_lowercase();
                known.insert(hyponym.clone());
                if !entry.contains(&hyponym) {
                    entry.push(hyponym);
                }
            }
        }

        Self { children, known }
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TopicanError::resource(path, e))?;
        let edges: HashMap<String, Vec<String>> =
            serde_json::from_str(&raw).map_err(|e| TopicanError::invalid_data(path, e))?;
        let table = Self::new(edges);

        info!(
            lemmas = table.known.len(),
            hypernyms = table.children.len(),
            path = %path.display(),
            "Loaded hyponym table"
        );

        Ok(table)
    }

    /// Number of distinct lemmas in the table.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl TaxonomicOracle for HyponymTable {
    fn hyponyms_of(&self, lemma: &str, depth: HyponymDepth) -> Option<HashSet<String>> {
        let lemma = lemma.to_lowercase();
        if !self.known.contains(&lemma) {
            return None;
        }

        let mut found = HashSet::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(lemma.as_str());
        let mut frontier: Vec<&str> = vec![lemma.as_str()];
        let mut level = 1;

        while !frontier.is_empty() && depth.allows(level) {
            let mut next = Vec::new();
            for parent in frontier {
                for child in self.children.get(parent).into_iter().flatten() {
                    if visited.insert(child.as_str()) {
                        found.insert(child.clone());
                        next.push(child.as_str());
                    }
                }
            }
            frontier = next;
            level += 1;
        }

        Some(found)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TopicanError::oracle("taxonomic", "hyponym table is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HyponymTable {
        let mut edges = HashMap::new();
        edges.insert(
            "animal".to_string(),
            vec!["dog".to_string(), "cat".to_string()],
        );
        edges.insert(
            "dog".to_string(),
            vec!["puppy".to_string(), "Terrier".to_string()],
        );
        HyponymTable::new(edges)
    }

    #[test]
    fn test_direct_hyponyms_only_at_depth_one() {
        let set = table()
            .hyponyms_of("animal", HyponymDepth::Levels(1))
            .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("dog"));
        assert!(!set.contains("puppy"));
    }

    #[test]
    fn test_unbounded_walks_whole_tree() {
        let set = table()
            .hyponyms_of("animal", HyponymDepth::Unbounded)
            .unwrap();
        assert_eq!(set.len(), 4);
        assert!(set.contains("terrier"), "lemmas are lower-cased");
    }

    #[test]
    fn test_leaf_is_known_with_no_hyponyms() {
        let set = table().hyponyms_of("cat", HyponymDepth::Unbounded).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_unknown_lemma_is_none() {
        assert!(table().hyponyms_of("python", HyponymDepth::Unbounded).is_none());
    }

    #[test]
    fn test_is_hyponym_relation_is_directional() {
        let t = table();
        assert!(t.is_hyponym_relation("puppy", "animal"));
        assert!(!t.is_hyponym_relation("animal", "puppy"));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut edges = HashMap::new();
        edges.insert("a".to_string(), vec!["b".to_string()]);
        edges.insert("b".to_string(), vec!["a".to_string()]);
        let t = HyponymTable::new(edges);
        let set = t.hyponyms_of("a", HyponymDepth::Unbounded).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("b"));
    }

    #[test]
    fn test_empty_table_is_unavailable() {
        let t = HyponymTable::default();
        assert!(matches!(
            t.ensure_ready(),
            Err(TopicanError::OracleUnavailable { .. })
        ));
        assert!(table().ensure_ready().is_ok());
    }
}
