// Composition tests: the full pipeline from raw records to ranked groups.
//
// These tests exercise the data flow between modules:
//   RuleTagger -> collector -> exclusion -> strategies -> aggregation -> ranking
// with in-memory oracles: no model files, no network.

use std::collections::HashMap;

use topican::error::TopicanError;
use topican::nlp::stopwords::FixedStopwords;
use topican::nlp::tagger::RuleTagger;
use topican::oracles::taxonomy::HyponymTable;
use topican::oracles::traits::NoTaxonomy;
use topican::oracles::vectors::WordVectors;
use topican::topics::{
    AnalysisSettings, ExclusionMode, RankedResult, Record, SeedGroup, TopicAnalyzer, WordCount,
};

fn taxonomy(edges: &[(&str, &[&str])]) -> HyponymTable {
    HyponymTable::new(
        edges
            .iter()
            .map(|(h, kids)| (h.to_string(), kids.iter().map(|k| k.to_string()).collect()))
            .collect::<HashMap<_, _>>(),
    )
}

fn vectors(pairs: &[(&str, &[f32])]) -> WordVectors {
    WordVectors::from_pairs(pairs.iter().map(|(w, v)| (w.to_string(), v.to_vec())))
}

fn records(texts: &[&str]) -> Vec<Record> {
    texts.iter().map(|t| Record::from(*t)).collect()
}

fn scenario_records() -> Vec<Record> {
    records(&[
        "I love Python",
        "I really love python",
        "I like python.",
        "python",
        "I like C but I prefer Python",
        "I don't like C any more",
        "I don't like python",
        "I really don't like C",
    ])
}

fn language_taxonomy() -> HyponymTable {
    taxonomy(&[("language", &["python", "c", "java"]), ("snake", &["python"])])
}

fn language_vectors() -> WordVectors {
    vectors(&[
        ("python", &[1.0, 0.0, 0.0]),
        ("c", &[0.0, 1.0, 0.0]),
        ("java", &[0.1, 0.9, 0.0]),
        ("language", &[0.5, 0.5, 0.5]),
    ])
}

fn analyze(records: &[Record], settings: &AnalysisSettings) -> RankedResult {
    let tagger = RuleTagger::new();
    let tax = language_taxonomy();
    let vec = language_vectors();
    let stop = FixedStopwords(vec![]);
    TopicAnalyzer::new(&tagger, &tax, &vec, &stop)
        .analyze(records, "scenario", settings)
        .unwrap()
}

fn word(word: &str, count: u64) -> WordCount {
    WordCount {
        word: word.to_string(),
        count,
    }
}

// ============================================================
// The python / C scenario
// ============================================================

#[test]
fn scenario_partitions_python_and_c() {
    let result = analyze(&scenario_records(), &AnalysisSettings::default());

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].label, "_python");
    assert_eq!(result.groups[0].total, 6);
    assert_eq!(result.groups[0].members, vec![word("python", 6)]);
    assert_eq!(result.groups[1].label, "_c");
    assert_eq!(result.groups[1].total, 3);
    assert_eq!(result.observations, 9);
    assert_eq!(result.distinct_nouns, 2);
    assert!(result.skipped.is_empty());
}

#[test]
fn scenario_context_counts() {
    let result = analyze(&scenario_records(), &AnalysisSettings::default());

    let python = &result.groups[0].context;
    assert_eq!(python[0], word("like", 3));
    assert_eq!(python[1], word("love", 2));
    assert!(python.contains(&word("prefer", 1)));

    let c = &result.groups[1].context;
    assert_eq!(c[0], word("like", 3));
    assert!(c.contains(&word("python", 1)));
}

#[test]
fn scenario_is_the_same_without_a_taxonomy() {
    let tagger = RuleTagger::new();
    let vec = language_vectors();
    let stop = FixedStopwords(vec![]);
    let result = TopicAnalyzer::new(&tagger, &NoTaxonomy, &vec, &stop)
        .analyze(&scenario_records(), "scenario", &AnalysisSettings::default())
        .unwrap();

    let labels: Vec<&str> = result.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["_python", "_c"]);
}

#[test]
fn ranking_is_deterministic() {
    let settings = AnalysisSettings::default();
    let first = analyze(&scenario_records(), &settings);
    let second = analyze(&scenario_records(), &settings);
    assert_eq!(first, second);
}

// ============================================================
// Limits and empty input
// ============================================================

#[test]
fn limits_truncate_groups_and_words() {
    let settings = AnalysisSettings {
        top_n_noun_groups: 1,
        top_n_words: 1,
        ..AnalysisSettings::default()
    };
    let result = analyze(&scenario_records(), &settings);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].context, vec![word("like", 3)]);
}

#[test]
fn zero_limits_return_everything() {
    let result = analyze(&scenario_records(), &AnalysisSettings::default());
    assert_eq!(result.groups.len(), 2);
    // love, really, like, c, prefer
    assert_eq!(result.groups[0].context.len(), 5);
}

#[test]
fn empty_input_gives_empty_result() {
    let result = analyze(&[], &AnalysisSettings::default());
    assert!(result.groups.is_empty());
    assert_eq!(result.observations, 0);
    assert_eq!(result.name, "scenario");
}

// ============================================================
// Exclusion
// ============================================================

#[test]
fn explicit_exclusion_removes_nouns_and_context() {
    let settings = AnalysisSettings {
        exclusion: ExclusionMode::Explicit(vec!["C".into(), "really".into()]),
        ..AnalysisSettings::default()
    };
    let result = analyze(&scenario_records(), &settings);
    assert_eq!(result.groups.len(), 1);
    let python = &result.groups[0];
    assert!(python.context.iter().all(|w| w.word != "really" && w.word != "c"));
}

#[test]
fn stopword_exclusion_uses_the_stopword_source() {
    let tagger = RuleTagger::new();
    let tax = language_taxonomy();
    let vec = language_vectors();
    let stop = FixedStopwords(vec!["Like".into()]);
    let settings = AnalysisSettings {
        exclusion: ExclusionMode::Stopwords,
        ..AnalysisSettings::default()
    };
    let result = TopicAnalyzer::new(&tagger, &tax, &vec, &stop)
        .analyze(&scenario_records(), "scenario", &settings)
        .unwrap();
    assert!(result
        .groups
        .iter()
        .all(|g| g.context.iter().all(|w| w.word != "like")));
}

// ============================================================
// Grouping behavior end to end
// ============================================================

#[test]
fn taxonomy_merges_hyponym_into_head_group() {
    let result = analyze(
        &records(&["I like languages", "I like java", "I like C"]),
        &AnalysisSettings::default(),
    );
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].label, "_language");
    assert_eq!(result.groups[0].total, 3);
}

#[test]
fn too_general_head_does_not_absorb_hyponyms() {
    let tagger = RuleTagger::new();
    let tax = taxonomy(&[("thing", &["dog", "cat", "car"])]);
    let vec = vectors(&[("thing", &[1.0, 0.0]), ("dog", &[0.0, 1.0])]);
    let stop = FixedStopwords(vec![]);
    let analyzer = TopicAnalyzer::new(&tagger, &tax, &vec, &stop);
    let input = records(&["I like things", "I like dogs"]);

    let limited = AnalysisSettings {
        max_hyponyms: 2,
        ..AnalysisSettings::default()
    };
    assert_eq!(analyzer.analyze(&input, "t", &limited).unwrap().groups.len(), 2);

    let unlimited = AnalysisSettings {
        max_hyponyms: 0,
        ..AnalysisSettings::default()
    };
    assert_eq!(analyzer.analyze(&input, "t", &unlimited).unwrap().groups.len(), 1);
}

#[test]
fn raising_the_threshold_never_merges_more() {
    let tagger = RuleTagger::new();
    let vec = vectors(&[
        ("car", &[1.0, 0.0]),
        ("automobile", &[0.8, 0.6]),
        ("banana", &[0.0, 1.0]),
    ]);
    let stop = FixedStopwords(vec![]);
    let analyzer = TopicAnalyzer::new(&tagger, &NoTaxonomy, &vec, &stop);
    let input = records(&["I like cars", "I like automobiles", "I like bananas"]);

    let mut last = 0;
    for threshold in [0.0, 0.5, 0.7, 0.9, 1.0] {
        let settings = AnalysisSettings {
            sim_threshold: threshold,
            ..AnalysisSettings::default()
        };
        let groups = analyzer.analyze(&input, "t", &settings).unwrap().groups.len();
        assert!(groups >= last, "threshold {threshold} gave fewer groups");
        last = groups;
    }
    assert_eq!(last, 3);
}

#[test]
fn seed_groups_claim_their_synonyms() {
    let settings = AnalysisSettings {
        seed_groups: vec![
            SeedGroup::new("_Money", &["salary", "cash"]),
            SeedGroup::new("weather", &[]),
        ],
        ..AnalysisSettings::default()
    };
    let result = analyze(&records(&["I want cash", "The salary is low"]), &settings);

    assert_eq!(result.groups.len(), 1);
    let money = &result.groups[0];
    assert_eq!(money.label, "_money");
    assert_eq!(money.members, vec![word("cash", 1), word("salary", 1)]);
    assert!(!money.possibly_misspelled);
}

#[test]
fn unknown_words_are_flagged() {
    let result = analyze(&records(&["I like pythn"]), &AnalysisSettings::default());
    assert_eq!(result.groups[0].label, "_pythn");
    assert!(result.groups[0].possibly_misspelled);
}

#[test]
fn negation_marking_end_to_end() {
    let settings = AnalysisSettings {
        negation_context: true,
        ..AnalysisSettings::default()
    };
    let result = analyze(&records(&["I don't like python"]), &settings);
    assert_eq!(result.groups[0].context, vec![word("not_like", 1)]);
}

#[test]
fn self_context_only_fills_empty_context() {
    let input = records(&["python", "I like python"]);

    let plain = analyze(&input, &AnalysisSettings::default());
    assert_eq!(plain.groups[0].context, vec![word("like", 1)]);

    let settings = AnalysisSettings {
        self_context: true,
        ..AnalysisSettings::default()
    };
    let result = analyze(&input, &settings);
    assert_eq!(
        result.groups[0].context,
        vec![word("python", 1), word("like", 1)]
    );
}

// ============================================================
// Errors
// ============================================================

#[test]
fn malformed_line_in_a_file_is_skipped_and_the_rest_analyzed() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    write!(file, "\"I like python\"\n{{broken\n\"I like C\"\n").unwrap();
    let input = topican::input::load_records(file.path(), None).unwrap();

    let result = analyze(&input, &AnalysisSettings::default());
    let labels: Vec<&str> = result.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["_python", "_c"]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].index, 1);
    assert!(result.skipped[0].reason.contains("line 2"));
}

#[test]
fn bad_records_are_skipped_not_fatal() {
    let input = vec![
        Record::from("I like python"),
        Record::NonText("number 42".into()),
        Record::Missing,
        Record::from("I like C"),
    ];
    let result = analyze(&input, &AnalysisSettings::default());
    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].index, 1);
    assert!(result.skipped[0].reason.contains("number 42"));
}

#[test]
fn empty_taxonomy_is_unavailable() {
    let tagger = RuleTagger::new();
    let tax = taxonomy(&[]);
    let vec = language_vectors();
    let stop = FixedStopwords(vec![]);
    let err = TopicAnalyzer::new(&tagger, &tax, &vec, &stop)
        .analyze(&scenario_records(), "t", &AnalysisSettings::default())
        .unwrap_err();
    assert!(matches!(err, TopicanError::OracleUnavailable { .. }));
}

#[test]
fn configuration_is_checked_before_oracles() {
    let tagger = RuleTagger::new();
    let tax = taxonomy(&[]);
    let vec = WordVectors::default();
    let stop = FixedStopwords(vec![]);
    let settings = AnalysisSettings {
        sim_threshold: 2.0,
        ..AnalysisSettings::default()
    };
    let err = TopicAnalyzer::new(&tagger, &tax, &vec, &stop)
        .analyze(&[], "t", &settings)
        .unwrap_err();
    assert!(matches!(err, TopicanError::Configuration(_)));
}
