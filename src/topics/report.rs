// Ranked report: the read-only result of one analysis run.

use serde::{Deserialize, Serialize};

use super::group::{GroupSet, WordTally};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Stands in for the preceding word at the start of a sentence or clause.
pub const NO_WORD_BEFORE: &str = "no_word_before";

/// A surveyed word with the words that most often come right before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordWithPreceding {
    pub word: String,
    pub count: u64,
    /// Preceding words seen more than once, by count then first seen
    pub preceding: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGroup {
    /// Derived group identifier: the head noun prefixed with `_`
    pub label: String,
    /// Total member noun occurrences
    pub total: u64,
    pub members: Vec<WordCount>,
    pub context: Vec<WordCount>,
    /// Head noun known to neither the taxonomy nor the similarity model
    #[serde(default)]
    pub possibly_misspelled: bool,
}

/// A record that produced no observations because of an input problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub name: String,
    /// Observations left after exclusion
    pub observations: usize,
    pub distinct_nouns: usize,
    pub groups: Vec<RankedGroup>,
    #[serde(default)]
    pub skipped: Vec<SkippedRecord>,
}

impl RankedResult {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            observations: 0,
            distinct_nouns: 0,
            groups: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Sort groups by total occurrences and their context words by count,
/// truncating both (0 = no limit). Groups nothing was placed in are dropped.
pub fn rank_groups(groups: &GroupSet, top_n_groups: usize, top_n_words: usize) -> Vec<RankedGroup> {
    let mut ranked: Vec<RankedGroup> = groups
        .iter()
        .filter(|g| g.total() > 0)
        .map(|g| RankedGroup {
            label: g.label(),
            total: g.total(),
            members: word_counts(&g.members, 0),
            context: word_counts(&g.context, top_n_words),
            possibly_misspelled: g.possibly_misspelled,
        })
        .collect();

    // Stable sort keeps creation order among equal totals.
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    if top_n_groups > 0 {
        ranked.truncate(top_n_groups);
    }
    ranked
}

/// Tally entries by count then first seen, truncated (0 = no limit).
pub fn word_counts(tally: &WordTally, limit: usize) -> Vec<WordCount> {
    let mut counts: Vec<WordCount> = tally
        .ranked()
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    if limit > 0 {
        counts.truncate(limit);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> GroupSet {
        let mut groups = GroupSet::new();
        let a = groups.create("alpha", false);
        groups.absorb(a, "alpha", 2);
        let b = groups.create("beta", true);
        groups.absorb(b, "beta", 5);
        let c = groups.create("gamma", false);
        groups.absorb(c, "gamma", 2);
        groups.create_seed("unused", &[]);

        let ctx = &mut groups.get_mut(b).context;
        ctx.add("x", 1);
        ctx.add("y", 3);
        ctx.add("z", 1);
        groups
    }

    #[test]
    fn test_rank_orders_by_total_then_creation() {
        let ranked = rank_groups(&groups(), 0, 0);
        let labels: Vec<&str> = ranked.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["_beta", "_alpha", "_gamma"]);
        assert!(ranked[0].possibly_misspelled);
    }

    #[test]
    fn test_zero_count_groups_omitted() {
        let ranked = rank_groups(&groups(), 0, 0);
        assert!(ranked.iter().all(|g| g.label != "_unused"));
    }

    #[test]
    fn test_limits_truncate() {
        let ranked = rank_groups(&groups(), 1, 2);
        assert_eq!(ranked.len(), 1);
        assert_eq!(
            ranked[0].context,
            vec![
                WordCount {
                    word: "y".into(),
                    count: 3
                },
                WordCount {
                    word: "x".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_zero_limits_mean_everything() {
        let ranked = rank_groups(&groups(), 0, 0);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].context.len(), 3);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let mut result = RankedResult::empty("survey");
        result.groups = rank_groups(&groups(), 1, 1);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"label\":\"_beta\""));
        let back: RankedResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
