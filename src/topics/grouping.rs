// The grouping loop: places every distinct noun in exactly one group.
//
// Nouns are visited in first-seen order, one at a time, so earlier nouns
// become group heads and the outcome is deterministic for a given input.

use tracing::debug;

use super::group::{GroupSet, WordTally};
use super::observation::Observation;
use super::seeds::SeedGroup;
use super::strategy::{GroupingDecision, GroupingStrategy, PlacementContext};

/// Distinct nouns with their occurrence counts, in first-seen order.
pub fn noun_frequencies(observations: &[Observation]) -> Vec<(String, u64)> {
    let mut tally = WordTally::new();
    for obs in observations {
        tally.add(&obs.noun, 1);
    }
    tally.in_first_seen_order()
}

/// Partition `nouns` into groups.
///
/// Seed groups are created first, in order, with zero counts. Each noun then
/// goes to the first strategy that places it, or starts a new group.
pub fn group_nouns(
    nouns: &[(String, u64)],
    seeds: &[SeedGroup],
    strategies: &[Box<dyn GroupingStrategy>],
    ctx: &mut PlacementContext<'_>,
) -> GroupSet {
    let mut groups = GroupSet::new();
    for seed in seeds {
        groups.create_seed(&seed.root, &seed.synonyms);
    }

    for (noun, count) in nouns {
        let decision = place_noun(noun, &groups, strategies, ctx);
        let decision = match decision {
            Some(decision) => decision,
            None => {
                let misspelled = ctx.unknown_word(noun);
                GroupingDecision::Created(groups.create(noun, misspelled))
            }
        };
        debug!(noun = %noun, count, ?decision, "Placed noun");
        groups.absorb(decision.group(), noun, *count);
    }

    groups
}

fn place_noun(
    noun: &str,
    groups: &GroupSet,
    strategies: &[Box<dyn GroupingStrategy>],
    ctx: &mut PlacementContext<'_>,
) -> Option<GroupingDecision> {
    strategies.iter().find_map(|strategy| {
        strategy
            .place(noun, groups, ctx)
            .map(|group| GroupingDecision::Merged {
                group,
                via: strategy.tier(),
            })
    })
}

/// Tally each observation's context words into its noun's group.
pub fn aggregate_context(groups: &mut GroupSet, observations: &[Observation]) {
    for obs in observations {
        let Some(id) = groups.group_of(&obs.noun) else {
            continue;
        };
        let context = &mut groups.get_mut(id).context;
        for word in &obs.context {
            context.add(word, 1);
        }
    }
}
