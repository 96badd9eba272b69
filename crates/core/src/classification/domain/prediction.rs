use std::cmp::Ordering;

use serde::Serialize;

use super::label_table::LabelTable;

/// A single labeled prediction: a human-readable label and its probability
/// from the model's output distribution. Immutable once produced.
///
/// Scores across a returned subset do not sum to 1.0; only the full label
/// set does.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Normalize a raw model label for display: internal separators become
/// spaces and each word is title-cased, e.g. `"southern_us"` ->
/// `"Southern Us"`. Idempotent.
pub fn normalize_label(raw: &str) -> String {
    raw.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case_word)
        .collect::<Vec<String>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Select the `top_k` highest entries of a probability distribution as
/// labeled predictions, descending by score. Equal scores keep ascending
/// label-index order; `top_k` is clamped to [1, label count] rather than
/// erroring when it exceeds the model's label set.
pub fn rank_top_k(probabilities: &[f32], labels: &LabelTable, top_k: usize) -> Vec<Prediction> {
    if probabilities.is_empty() {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let k = top_k.clamp(1, probabilities.len());
    indexed
        .into_iter()
        .take(k)
        .filter_map(|(index, score)| {
            let raw = labels.get(index)?;
            Some(Prediction {
                label: normalize_label(raw),
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn table(labels: &[&str]) -> LabelTable {
        LabelTable::new(labels.iter().map(|l| l.to_string()).collect())
    }

    // ── Normalization ─────────────────────────────────────────────────

    #[rstest]
    #[case::underscore("southern_us", "Southern Us")]
    #[case::hyphen("non-native", "Non Native")]
    #[case::single("england", "England")]
    #[case::all_caps("US", "Us")]
    #[case::already_clean("New Zealand", "New Zealand")]
    #[case::double_separator("a__b", "A B")]
    fn test_normalize_label(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_label(raw), expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["southern_us", "hong-kong", "wales", "MIXED_Case"] {
            let once = normalize_label(raw);
            assert_eq!(normalize_label(&once), once);
        }
    }

    #[test]
    fn test_normalized_labels_contain_no_separators() {
        let label = normalize_label("a_b-c d");
        assert!(!label.contains('_'));
        assert!(!label.contains('-'));
    }

    // ── Ranking ───────────────────────────────────────────────────────

    #[test]
    fn test_rank_returns_exactly_k_descending() {
        let labels = table(&["a", "b", "c", "d"]);
        let probs = [0.1, 0.4, 0.3, 0.2];
        let ranked = rank_top_k(&probs, &labels, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].label, "B");
        assert_eq!(ranked[1].label, "C");
        assert_eq!(ranked[2].label, "D");
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[test]
    fn test_rank_tie_break_by_label_index() {
        let labels = table(&["first", "second", "third"]);
        let probs = [0.4, 0.4, 0.2];
        let ranked = rank_top_k(&probs, &labels, 2);
        assert_eq!(ranked[0].label, "First");
        assert_eq!(ranked[1].label, "Second");
    }

    #[test]
    fn test_rank_clamps_k_above_label_count() {
        // Behavior chosen for oversized k: clamp, never error.
        let labels = table(&["a", "b"]);
        let ranked = rank_top_k(&[0.6, 0.4], &labels, 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_clamps_k_of_zero_to_one() {
        let labels = table(&["a", "b"]);
        let ranked = rank_top_k(&[0.6, 0.4], &labels, 0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "A");
    }

    #[test]
    fn test_rank_empty_distribution() {
        let ranked = rank_top_k(&[], &table(&[]), 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_scores_passed_through() {
        let labels = table(&["england", "australia", "southern_us"]);
        let ranked = rank_top_k(&[0.7, 0.2, 0.1], &labels, 2);
        assert_relative_eq!(ranked[0].score, 0.7);
        assert_relative_eq!(ranked[1].score, 0.2);
        assert_eq!(ranked[0].label, "England");
        assert_eq!(ranked[1].label, "Australia");
    }

    #[test]
    fn test_rank_nan_scores_do_not_panic() {
        let labels = table(&["a", "b", "c"]);
        let ranked = rank_top_k(&[f32::NAN, 0.5, 0.3], &labels, 3);
        assert_eq!(ranked.len(), 3);
    }
}
