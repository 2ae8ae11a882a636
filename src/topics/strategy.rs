// Placement strategies: "can noun X join an existing group?"
//
// Each strategy answers with a group or nothing. The grouping loop tries
// them in a fixed order (seed, taxonomy, similarity) and the first answer
// wins; a noun no strategy places starts its own group.

use super::cache::OracleCache;
use super::group::{GroupId, GroupSet};
use crate::oracles::traits::{SimilarityOracle, TaxonomicOracle};

/// Which strategy placed a noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Seed,
    Taxonomy,
    Similarity,
}

/// Outcome of placing one noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingDecision {
    Merged { group: GroupId, via: Tier },
    Created(GroupId),
}

impl GroupingDecision {
    pub fn group(self) -> GroupId {
        match self {
            GroupingDecision::Merged { group, .. } | GroupingDecision::Created(group) => group,
        }
    }
}

/// Oracles, thresholds and the memo shared by all strategies in one run.
pub struct PlacementContext<'a> {
    pub taxonomy: &'a dyn TaxonomicOracle,
    pub similarity: &'a dyn SimilarityOracle,
    pub cache: OracleCache,
    /// Nouns with more hyponyms than this are too general (0 = no limit)
    pub max_hyponyms: usize,
    pub sim_threshold: f64,
}

impl<'a> PlacementContext<'a> {
    /// Whether the lemma has too many hyponyms to take part in taxonomic
    /// grouping.
    pub fn too_general(&mut self, lemma: &str) -> bool {
        let limit = self.max_hyponyms;
        if limit == 0 {
            return false;
        }
        self.cache
            .hyponyms(self.taxonomy, lemma)
            .is_some_and(|set| set.len() > limit)
    }

    /// Whether the lemma is a hyponym of `head` within the run's depth.
    pub fn is_hyponym_of(&mut self, lemma: &str, head: &str) -> bool {
        self.cache
            .hyponyms(self.taxonomy, head)
            .is_some_and(|set| set.contains(lemma))
    }

    /// Known to neither oracle.
    pub fn unknown_word(&mut self, lemma: &str) -> bool {
        self.cache.hyponyms(self.taxonomy, lemma).is_none()
            && !self.cache.known_to_similarity(self.similarity, lemma)
    }
}

pub trait GroupingStrategy {
    fn tier(&self) -> Tier;

    /// The existing group `noun` belongs in, if this strategy can tell.
    fn place(&self, noun: &str, groups: &GroupSet, ctx: &mut PlacementContext<'_>)
        -> Option<GroupId>;
}

/// Places nouns into user-defined seed groups by root or synonym.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedGrouper;

impl GroupingStrategy for SeedGrouper {
    fn tier(&self) -> Tier {
        Tier::Seed
    }

    fn place(
        &self,
        noun: &str,
        groups: &GroupSet,
        _ctx: &mut PlacementContext<'_>,
    ) -> Option<GroupId> {
        groups
            .iter()
            .find(|g| g.aliases.contains(noun))
            .map(|g| g.id)
    }
}

/// Places a noun under a group whose head is its hypernym.
///
/// Too-general nouns (and too-general heads) never take part. Among several
/// qualifying groups the one with the most occurrences so far wins, then the
/// earliest created.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxonomicGrouper;

impl GroupingStrategy for TaxonomicGrouper {
    fn tier(&self) -> Tier {
        Tier::Taxonomy
    }

    fn place(
        &self,
        noun: &str,
        groups: &GroupSet,
        ctx: &mut PlacementContext<'_>,
    ) -> Option<GroupId> {
        if ctx.too_general(noun) {
            return None;
        }

        let mut best: Option<(GroupId, u64)> = None;
        for group in groups.iter() {
            if ctx.too_general(&group.head) {
                continue;
            }
            if group.head != noun && !ctx.is_hyponym_of(noun, &group.head) {
                continue;
            }
            let total = group.total();
            if best.is_none_or(|(_, top)| total > top) {
                best = Some((group.id, total));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Places a noun with the most similar group head at or above the threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityGrouper;

impl GroupingStrategy for SimilarityGrouper {
    fn tier(&self) -> Tier {
        Tier::Similarity
    }

    fn place(
        &self,
        noun: &str,
        groups: &GroupSet,
        ctx: &mut PlacementContext<'_>,
    ) -> Option<GroupId> {
        let mut best: Option<(GroupId, f64)> = None;
        for group in groups.iter() {
            let Some(score) = ctx.cache.similarity(ctx.similarity, noun, &group.head) else {
                continue;
            };
            if score >= ctx.sim_threshold && best.is_none_or(|(_, top)| score > top) {
                best = Some((group.id, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Seed, then taxonomy, then similarity.
pub fn default_strategies() -> Vec<Box<dyn GroupingStrategy>> {
    vec![
        Box::new(SeedGrouper),
        Box::new(TaxonomicGrouper),
        Box::new(SimilarityGrouper),
    ]
}
