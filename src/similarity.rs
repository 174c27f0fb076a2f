use std::collections::HashSet;

use crate::tables::KnowledgeTables;

const PHRASE_BOOST: f64 = 10.0;
const MIN_TOKEN_LEN: usize = 3;

/// Title closeness in `[0, 100]`, rounded to two decimals.
///
/// Token overlap relative to the larger token set, plus a flat boost for each
/// domain key phrase present in both strings. The boost is not capped before
/// the final clamp, so phrase matches alone can push a pair over the
/// title-match floor.
pub fn similarity(a: &str, b: &str, tables: &KnowledgeTables) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 100.0;
    }

    let tokens_a = content_tokens(&a, tables);
    let tokens_b = content_tokens(&b, tables);
    let larger = tokens_a.len().max(tokens_b.len());
    let mut score = if larger == 0 {
        0.0
    } else {
        tokens_a.intersection(&tokens_b).count() as f64 / larger as f64 * 100.0
    };

    for phrase in &tables.key_phrases {
        let phrase = phrase.to_lowercase();
        if a.contains(&phrase) && b.contains(&phrase) {
            score += PHRASE_BOOST;
        }
    }

    round2(score.min(100.0))
}

fn content_tokens<'a>(text: &'a str, tables: &KnowledgeTables) -> HashSet<&'a str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !tables.similarity_stop_words.iter().any(|s| s == t))
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> KnowledgeTables {
        KnowledgeTables::default()
    }

    #[test]
    fn test_identical_is_100() {
        for s in ["Attention Is All You Need", "x", "  Deep Residual Learning  "] {
            assert_eq!(similarity(s, s, &t()), 100.0);
        }
        assert_eq!(similarity("ATTENTION is all you need", "attention is all you need", &t()), 100.0);
    }

    #[test]
    fn test_partial_overlap() {
        // {deep, residual, learning, image, recognition} vs {deep, residual, learning}
        let s = similarity(
            "Deep Residual Learning for Image Recognition",
            "deep residual learning",
            &t(),
        );
        assert_eq!(s, 60.0);
    }

    #[test]
    fn test_punctuation_is_stripped_from_tokens() {
        let s = similarity("Attention Is All You Need: transformers", "attention all you need transformers", &t());
        // {attention, all, you, need, transformers} on both sides
        assert_eq!(s, 100.0);
    }

    #[test]
    fn test_edge_punctuation_does_not_split_matches() {
        // A bare whitespace split would keep "bert:" and score 50 here.
        assert_eq!(similarity("BERT: Pre-training", "bert pre-training", &t()), 100.0);
        // Inner punctuation is kept: "pre-training" != "pretraining".
        assert_eq!(similarity("BERT pre-training", "bert pretraining", &t()), 50.0);
    }

    #[test]
    fn test_phrase_boost_and_clamp() {
        let a = "transfer learning for object detection";
        let b = "object detection via transfer learning";
        // Identical token sets (100) + two shared phrases, clamped.
        assert_eq!(similarity(a, b, &t()), 100.0);

        let c = similarity("object detection survey", "object detection benchmark", &t());
        // {object, detection} of 3 -> 66.67, +10 for the shared phrase.
        assert_eq!(c, 76.67);
    }

    #[test]
    fn test_disjoint_and_empty() {
        assert_eq!(similarity("quantum chromodynamics", "protein folding", &t()), 0.0);
        assert_eq!(similarity("of a", "in on", &t()), 0.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let s = similarity("alpha beta gamma", "alpha delta epsilon", &t());
        assert_eq!(s, 33.33);
    }
}
