//! Log excerpt reduction.
//!
//! CI failures are concentrated near the end of a job log, so an over-budget
//! log keeps its tail and loses its head. Lengths are counted in characters
//! (Unicode scalar values), never bytes, so a cut never splits a character.

use serde::{Deserialize, Serialize};

use crate::LogBudget;

/// Line prepended to an excerpt whose head was dropped.
pub const TRUNCATION_MARKER: &str = "\n... (log truncated due to length)\n";

/// A bounded view of a job log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogExcerpt {
    text: String,
    truncated: bool,
    original_len: usize,
}

impl LogExcerpt {
    /// The excerpt text, including the truncation marker when present.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` if the head of the log was dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Byte length of the log before reduction.
    pub fn original_len(&self) -> usize {
        self.original_len
    }
}

/// Reduces `raw_log` to at most `budget` characters of its tail.
///
/// A log within budget is returned unchanged. Otherwise the result is
/// [`TRUNCATION_MARKER`] followed by exactly the last `budget` characters.
pub fn reduce(raw_log: &str, budget: LogBudget) -> LogExcerpt {
    let budget = budget.as_usize();
    let total_chars = raw_log.chars().count();

    if total_chars <= budget {
        return LogExcerpt {
            text: raw_log.to_string(),
            truncated: false,
            original_len: raw_log.len(),
        };
    }

    let skip = total_chars - budget;
    let tail_start = raw_log
        .char_indices()
        .nth(skip)
        .map(|(index, _)| index)
        .unwrap_or(raw_log.len());

    let mut text = String::with_capacity(TRUNCATION_MARKER.len() + raw_log.len() - tail_start);
    text.push_str(TRUNCATION_MARKER);
    text.push_str(&raw_log[tail_start..]);

    LogExcerpt {
        text,
        truncated: true,
        original_len: raw_log.len(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn budget(chars: usize) -> LogBudget {
        LogBudget::new(chars).expect("non-zero budget")
    }

    #[test]
    fn within_budget_is_returned_unchanged() {
        for log in ["", "short", "exactly10!"] {
            let excerpt = reduce(log, budget(10));
            assert_eq!(excerpt.text(), log);
            assert!(!excerpt.is_truncated());
            assert_eq!(excerpt.original_len(), log.len());
        }
    }

    #[test]
    fn over_budget_keeps_the_tail_behind_the_marker() {
        let log = "line 1\nline 2\nerror: linker failed\n";
        let excerpt = reduce(log, budget(21));

        assert!(excerpt.is_truncated());
        assert_eq!(
            excerpt.text().chars().count(),
            21 + TRUNCATION_MARKER.chars().count()
        );
        let tail = excerpt
            .text()
            .strip_prefix(TRUNCATION_MARKER)
            .expect("marker prefix");
        assert_eq!(tail, "error: linker failed\n");
        assert_eq!(excerpt.original_len(), log.len());
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let log = "ééééé終わり";
        let excerpt = reduce(log, budget(3));

        assert!(excerpt.is_truncated());
        assert_eq!(
            excerpt.text().strip_prefix(TRUNCATION_MARKER),
            Some("終わり")
        );
        assert_eq!(excerpt.original_len(), log.len());
    }

    #[test]
    fn reference_budget_bounds_a_large_log() {
        let log: String = (0..2_000).map(|i| format!("step {i}\n")).collect();
        let excerpt = reduce(&log, LogBudget::DEFAULT);

        assert!(excerpt.is_truncated());
        let tail = excerpt
            .text()
            .strip_prefix(TRUNCATION_MARKER)
            .expect("marker prefix");
        assert_eq!(tail.chars().count(), 8_000);
        assert!(log.ends_with(tail));
    }

    #[test]
    fn one_character_over_budget_drops_exactly_one_character() {
        let excerpt = reduce("abcdef", budget(5));
        assert_eq!(
            excerpt.text(),
            format!("{TRUNCATION_MARKER}bcdef")
        );
    }

    proptest! {
        #[test]
        fn property_within_budget_is_identity(log in any::<String>(), slack in 0usize..64) {
            let chars = log.chars().count();
            let excerpt = reduce(&log, budget(chars.max(1) + slack));
            prop_assert_eq!(excerpt.text(), log.as_str());
            prop_assert!(!excerpt.is_truncated());
            prop_assert_eq!(excerpt.original_len(), log.len());
        }

        #[test]
        fn property_over_budget_keeps_exactly_the_tail(
            log in r"(\PC|\r\n|\n){2,400}",
            cut in any::<prop::sample::Index>(),
        ) {
            let chars: Vec<char> = log.chars().collect();
            let limit = 1 + cut.index(chars.len() - 1);

            let excerpt = reduce(&log, budget(limit));
            let expected_tail: String = chars[chars.len() - limit..].iter().collect();

            prop_assert!(excerpt.is_truncated());
            prop_assert_eq!(
                excerpt.text().strip_prefix(TRUNCATION_MARKER),
                Some(expected_tail.as_str())
            );
            prop_assert_eq!(
                excerpt.text().chars().count(),
                limit + TRUNCATION_MARKER.chars().count()
            );
            prop_assert_eq!(excerpt.original_len(), log.len());
        }
    }
}
