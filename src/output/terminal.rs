// Colored terminal output for ranked topic groups and word surveys.
//
// main.rs delegates here for everything except --json output.

use colored::Colorize;

use crate::topics::report::SkippedRecord;
use crate::topics::{RankedGroup, RankedResult, WordCount, WordWithPreceding};

/// Longest member/context line before it is cut with "...".
const LIST_WIDTH: usize = 100;

/// Display the groups of one analysis run.
pub fn display_ranked_result(result: &RankedResult) {
    println!(
        "\n{}",
        format!(
            "=== Topics in {} ({} noun occurrences, {} distinct nouns) ===",
            result.name, result.observations, result.distinct_nouns
        )
        .bold()
    );
    println!();

    if result.groups.is_empty() {
        println!("  No nouns found.");
    }

    let bar_width: usize = 20;
    let top_total = result.groups.first().map_or(0, |g| g.total).max(1);

    for (i, group) in result.groups.iter().enumerate() {
        let weight = group.total as f64 / top_total as f64;
        let filled = (weight * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        let colored_bar = if weight >= 0.5 {
            bar.bright_green()
        } else if weight >= 0.2 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        let flag = if group.possibly_misspelled {
            " (unknown word?)".yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "  {:>2}. {:<30} {} {}{}",
            i + 1,
            group.label.bold(),
            colored_bar,
            group.total,
            flag
        );
        display_group_lists(group);
    }

    display_skipped(&result.skipped);
}

fn display_group_lists(group: &RankedGroup) {
    if group.members.len() > 1 {
        println!(
            "      nouns:   {}",
            super::truncate_chars(&join_counts(&group.members), LIST_WIDTH).dimmed()
        );
    }
    if !group.context.is_empty() {
        println!(
            "      context: {}",
            super::truncate_chars(&join_counts(&group.context), LIST_WIDTH).dimmed()
        );
    }
}

/// Display a ranked word list (the `top-words` survey).
pub fn display_word_counts(title: &str, words: &[WordCount]) {
    println!("\n{}", format!("=== {title} ===").bold());
    println!();

    if words.is_empty() {
        println!("  No matching words.");
        return;
    }

    for (i, wc) in words.iter().enumerate() {
        println!("  {:>4}. {:<30} {:>6}", i + 1, wc.word, wc.count);
    }
}

/// Display the `top-words --with-preceding` survey.
pub fn display_words_with_preceding(title: &str, words: &[WordWithPreceding]) {
    println!("\n{}", format!("=== {title} ===").bold());
    println!();

    if words.is_empty() {
        println!("  No matching words.");
        return;
    }

    for (i, wp) in words.iter().enumerate() {
        println!("  {:>4}. {:<30} {:>6}", i + 1, wp.word, wp.count);
        if !wp.preceding.is_empty() {
            println!(
                "        after: {}",
                super::truncate_chars(&join_counts(&wp.preceding), LIST_WIDTH).dimmed()
            );
        }
    }
}

fn display_skipped(skipped: &[SkippedRecord]) {
    if skipped.is_empty() {
        return;
    }
    println!();
    println!("  {} {} records skipped:", "!".yellow(), skipped.len());
    for record in skipped {
        println!(
            "    #{:<5} {}",
            record.index,
            super::truncate_chars(&record.reason, LIST_WIDTH).dimmed()
        );
    }
}

/// "like (3), love (2)"
fn join_counts(words: &[WordCount]) -> String {
    words
        .iter()
        .map(|wc| format!("{} ({})", wc.word, wc.count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_counts() {
        let words = vec![
            WordCount {
                word: "like".into(),
                count: 3,
            },
            WordCount {
                word: "love".into(),
                count: 2,
            },
        ];
        assert_eq!(join_counts(&words), "like (3), love (2)");
        assert_eq!(join_counts(&[]), "");
    }
}
