// Topic analysis: the end-to-end pipeline over a batch of records.
//
// collect -> exclude -> group -> aggregate -> rank. Settings and oracles are
// checked before the first record is touched; per-record problems are
// logged, collected into the result and never abort the batch.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::cache::OracleCache;
use super::exclusion::{ExclusionMode, ExclusionSet};
use super::group::WordTally;
use super::grouping::{aggregate_context, group_nouns, noun_frequencies};
use super::observation::{NounObservationCollector, Observation, Record};
use super::report::{
    rank_groups, word_counts, RankedResult, SkippedRecord, WordCount, WordWithPreceding,
    NO_WORD_BEFORE,
};
use super::seeds::SeedGroup;
use super::strategy::{default_strategies, PlacementContext};
use crate::error::{Result, TopicanError};
use crate::nlp::stopwords::StopwordSource;
use crate::nlp::tagger::{PosCategory, TaggedToken, Tagger};
use crate::oracles::traits::{HyponymDepth, SimilarityOracle, TaxonomicOracle};

/// Per-run analysis parameters. Limits use 0 for "no limit".
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub exclusion: ExclusionMode,
    pub top_n_noun_groups: usize,
    pub top_n_words: usize,
    pub max_hyponyms: usize,
    pub max_hyponym_depth: usize,
    pub sim_threshold: f64,
    /// Mark context words that follow a negator (`not_like`)
    pub negation_context: bool,
    /// Count a noun as its own context when nothing else survives exclusion
    pub self_context: bool,
    pub seed_groups: Vec<SeedGroup>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            exclusion: ExclusionMode::None,
            top_n_noun_groups: 0,
            top_n_words: 0,
            max_hyponyms: 100,
            max_hyponym_depth: 1,
            sim_threshold: 0.7,
            negation_context: false,
            self_context: false,
            seed_groups: Vec::new(),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.sim_threshold.is_finite() || !(0.0..=1.0).contains(&self.sim_threshold) {
            return Err(TopicanError::Configuration(format!(
                "similarity threshold must be within [0, 1], got {}",
                self.sim_threshold
            )));
        }
        for seed in &self.seed_groups {
            seed.normalized()?;
        }
        Ok(())
    }
}

/// Runs analyses against one set of collaborators.
pub struct TopicAnalyzer<'a> {
    tagger: &'a dyn Tagger,
    taxonomy: &'a dyn TaxonomicOracle,
    similarity: &'a dyn SimilarityOracle,
    stopwords: &'a dyn StopwordSource,
}

impl<'a> TopicAnalyzer<'a> {
    pub fn new(
        tagger: &'a dyn Tagger,
        taxonomy: &'a dyn TaxonomicOracle,
        similarity: &'a dyn SimilarityOracle,
        stopwords: &'a dyn StopwordSource,
    ) -> Self {
        Self {
            tagger,
            taxonomy,
            similarity,
            stopwords,
        }
    }

    /// Group the nouns in `records` and rank the groups with their context.
    pub fn analyze(
        &self,
        records: &[Record],
        name: &str,
        settings: &AnalysisSettings,
    ) -> Result<RankedResult> {
        settings.validate()?;
        let exclusion = ExclusionSet::resolve(&settings.exclusion, self.stopwords)?;
        self.taxonomy.ensure_ready()?;
        self.similarity.ensure_ready()?;

        let seeds = settings
            .seed_groups
            .iter()
            .map(SeedGroup::normalized)
            .collect::<Result<Vec<_>>>()?;

        let collector =
            NounObservationCollector::new().with_negation_marking(settings.negation_context);
        let (mut observations, skipped) =
            self.collect_observations(records, &collector, &exclusion);
        if settings.self_context {
            for obs in observations.iter_mut().filter(|o| o.context.is_empty()) {
                obs.context.push(obs.noun.clone());
            }
        }
        let nouns = noun_frequencies(&observations);

        info!(
            name,
            records = records.len(),
            observations = observations.len(),
            distinct_nouns = nouns.len(),
            skipped = skipped.len(),
            "Collected noun observations"
        );

        let mut ctx = PlacementContext {
            taxonomy: self.taxonomy,
            similarity: self.similarity,
            cache: OracleCache::new(HyponymDepth::from_limit(settings.max_hyponym_depth)),
            max_hyponyms: settings.max_hyponyms,
            sim_threshold: settings.sim_threshold,
        };
        let mut groups = group_nouns(&nouns, &seeds, &default_strategies(), &mut ctx);
        aggregate_context(&mut groups, &observations);

        let stats = ctx.cache.stats();
        debug!(hits = stats.hits, misses = stats.misses, "Oracle cache");

        let ranked = rank_groups(&groups, settings.top_n_noun_groups, settings.top_n_words);
        info!(groups = groups.len(), reported = ranked.len(), "Grouped nouns");

        Ok(RankedResult {
            name: name.to_string(),
            observations: observations.len(),
            distinct_nouns: nouns.len(),
            groups: ranked,
            skipped,
        })
    }

    fn collect_observations(
        &self,
        records: &[Record],
        collector: &NounObservationCollector,
        exclusion: &ExclusionSet,
    ) -> (Vec<Observation>, Vec<SkippedRecord>) {
        let mut observations = Vec::new();
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match collector.collect(self.tagger, index, record) {
                Ok(found) => {
                    observations.extend(found.into_iter().filter_map(|o| exclusion.filter(o)));
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping record");
                    let reason = match e {
                        TopicanError::Input { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        (observations, skipped)
    }
}

/// Per-word counts from one pass over the records.
#[derive(Default)]
struct WordSurvey {
    words: WordTally,
    /// Word -> tally of the word right before each occurrence
    preceding: HashMap<String, WordTally>,
}

/// Most frequent lemmas among tokens of the given categories, by count then
/// first seen (0 = no limit). Records that cannot be tagged are skipped.
pub fn most_common_words(
    tagger: &dyn Tagger,
    stopwords: &dyn StopwordSource,
    records: &[Record],
    categories: &[PosCategory],
    exclusion: &ExclusionMode,
    top_n: usize,
) -> Result<Vec<WordCount>> {
    let survey = survey_words(tagger, stopwords, records, categories, exclusion)?;
    Ok(word_counts(&survey.words, top_n))
}

/// Like [`most_common_words`], with each word's most common preceding words.
///
/// The preceding word is the token right before the occurrence in the same
/// sentence, whatever its category, or [`NO_WORD_BEFORE`] after punctuation
/// or at the start of a record. Only preceding words seen more than once are
/// reported, at most `top_n` per word.
pub fn most_common_words_with_preceding(
    tagger: &dyn Tagger,
    stopwords: &dyn StopwordSource,
    records: &[Record],
    categories: &[PosCategory],
    exclusion: &ExclusionMode,
    top_n: usize,
) -> Result<Vec<WordWithPreceding>> {
    let survey = survey_words(tagger, stopwords, records, categories, exclusion)?;
    Ok(word_counts(&survey.words, top_n)
        .into_iter()
        .map(|WordCount { word, count }| {
            let preceding = survey
                .preceding
                .get(&word)
                .map(|tally| {
                    word_counts(tally, 0)
                        .into_iter()
                        .filter(|wc| wc.count > 1)
                        .take(if top_n == 0 { usize::MAX } else { top_n })
                        .collect()
                })
                .unwrap_or_default();
            WordWithPreceding {
                word,
                count,
                preceding,
            }
        })
        .collect())
}

fn survey_words(
    tagger: &dyn Tagger,
    stopwords: &dyn StopwordSource,
    records: &[Record],
    categories: &[PosCategory],
    exclusion: &ExclusionMode,
) -> Result<WordSurvey> {
    let exclusion = ExclusionSet::resolve(exclusion, stopwords)?;
    let mut survey = WordSurvey::default();

    for (index, record) in records.iter().enumerate() {
        let text = match record {
            Record::Text(text) => text,
            Record::Missing => continue,
            Record::NonText(found) => {
                warn!(index, found = %found, "Skipping non-text record");
                continue;
            }
            Record::Malformed(reason) => {
                warn!(index, reason = %reason, "Skipping malformed record");
                continue;
            }
        };
        let tokens = match tagger.tag(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(index, error = %e, "Skipping record the tagger rejected");
                continue;
            }
        };

        for (pos, token) in tokens.iter().enumerate() {
            if !categories.contains(&token.category) {
                continue;
            }
            let lemma = token.lemma.trim().to_lowercase();
            if lemma.is_empty() || exclusion.contains(&lemma) {
                continue;
            }
            survey.words.add(&lemma, 1);
            let before = word_before(&tokens, pos);
            survey
                .preceding
                .entry(lemma)
                .or_default()
                .add(before.as_deref().unwrap_or(NO_WORD_BEFORE), 1);
        }
    }

    Ok(survey)
}

fn word_before(tokens: &[TaggedToken], pos: usize) -> Option<String> {
    let prev = tokens.get(pos.checked_sub(1)?)?;
    if prev.category == PosCategory::Punctuation || prev.sentence != tokens[pos].sentence {
        return None;
    }
    Some(prev.lemma.trim().to_lowercase()).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::stopwords::FixedStopwords;
    use crate::nlp::tagger::RuleTagger;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(AnalysisSettings::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let settings = AnalysisSettings {
                sim_threshold: bad,
                ..AnalysisSettings::default()
            };
            assert!(
                matches!(settings.validate(), Err(TopicanError::Configuration(_))),
                "threshold {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_threshold_bounds_accepted() {
        for ok in [0.0, 1.0] {
            let settings = AnalysisSettings {
                sim_threshold: ok,
                ..AnalysisSettings::default()
            };
            assert!(settings.validate().is_ok());
        }
    }

    #[test]
    fn test_seed_with_empty_root_rejected() {
        let settings = AnalysisSettings {
            seed_groups: vec![SeedGroup::new("  ", &["job"])],
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_preceding_words_seen_more_than_once() {
        let records: Vec<Record> = vec![
            "I love python".into(),
            "I love python".into(),
            "python".into(),
            "We love C".into(),
            Record::Malformed("malformed JSON on line 5".into()),
        ];
        let words = most_common_words_with_preceding(
            &RuleTagger::new(),
            &FixedStopwords(vec![]),
            &records,
            &[PosCategory::Noun, PosCategory::ProperNoun],
            &ExclusionMode::None,
            0,
        )
        .unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "python");
        assert_eq!(words[0].count, 3);
        assert_eq!(
            words[0].preceding,
            vec![WordCount {
                word: "love".into(),
                count: 2
            }]
        );
        assert_eq!(words[1].word, "c");
        assert!(words[1].preceding.is_empty());
    }

    #[test]
    fn test_record_start_and_punctuation_have_no_word_before() {
        let records: Vec<Record> = vec!["python. python".into(), "python".into()];
        let words = most_common_words_with_preceding(
            &RuleTagger::new(),
            &FixedStopwords(vec![]),
            &records,
            &[PosCategory::Noun],
            &ExclusionMode::None,
            0,
        )
        .unwrap();
        assert_eq!(
            words[0].preceding,
            vec![WordCount {
                word: NO_WORD_BEFORE.into(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_most_common_words_filters_categories_and_exclusions() {
        let records: Vec<Record> = vec![
            "I love Python".into(),
            "python is great".into(),
            Record::Missing,
            Record::NonText("number 3".into()),
            "I love C".into(),
        ];
        let words = most_common_words(
            &RuleTagger::new(),
            &FixedStopwords(vec!["c".into()]),
            &records,
            &[PosCategory::Noun, PosCategory::ProperNoun],
            &ExclusionMode::Stopwords,
            0,
        )
        .unwrap();
        assert_eq!(
            words,
            vec![WordCount {
                word: "python".into(),
                count: 2
            }]
        );
    }
}
