use std::collections::HashSet;

use crate::filter::split_topic;
use crate::tables::KnowledgeTables;

pub const MAX_KEYWORDS: usize = 5;
const MAX_LENGTH_TOKENS: usize = 3;
const MIN_TOKEN_LEN: usize = 5;

/// Insertion-ordered, deduplicated, capped keyword list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless already present or full. Returns whether it was added.
    pub fn insert(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.is_full() {
            return false;
        }
        let key = keyword.to_lowercase();
        if !self.seen.insert(key) {
            return false;
        }
        self.items.push(keyword.to_string());
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_KEYWORDS
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Space-joined search query.
    pub fn query(&self) -> String {
        self.items.join(" ")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Derive search terms from a message and an optional topic filter.
///
/// Topic-filter keywords come first, then canonical topics hit by the message
/// (table order), then generic technical terms (table order). Only when all
/// three stages yield nothing are long alphabetic tokens pulled from the
/// message itself.
pub fn extract(message: &str, topic_filter: Option<&str>, tables: &KnowledgeTables) -> KeywordSet {
    let mut keywords = KeywordSet::new();
    let lowered = message.to_lowercase();

    if let Some(topic) = topic_filter {
        for t in split_topic(topic) {
            keywords.insert(&t);
        }
    }

    for entry in &tables.topics {
        if entry
            .synonyms
            .iter()
            .any(|s| lowered.contains(&s.to_lowercase()))
        {
            keywords.insert(&entry.name);
        }
    }

    for term in &tables.technical_terms {
        if lowered.contains(&term.to_lowercase()) {
            keywords.insert(term);
        }
    }

    if keywords.is_empty() {
        for token in long_tokens(&lowered, tables).into_iter().take(MAX_LENGTH_TOKENS) {
            keywords.insert(&token);
        }
    }

    tracing::debug!(keywords = ?keywords.as_slice(), "extracted keywords");
    keywords
}

fn long_tokens(lowered: &str, tables: &KnowledgeTables) -> Vec<String> {
    lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !tables.keyword_stop_words.iter().any(|s| s == t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> KnowledgeTables {
        KnowledgeTables::default()
    }

    #[test]
    fn test_ordered_set_dedup_and_cap() {
        let mut set = KeywordSet::new();
        assert!(set.insert("alpha"));
        assert!(!set.insert("Alpha"));
        for w in ["b", "c", "d", "e", "f"] {
            set.insert(w);
        }
        assert_eq!(set.as_slice(), &["alpha", "b", "c", "d", "e"]);
        assert!(set.is_full());
        assert_eq!(set.query(), "alpha b c d e");
    }

    #[test]
    fn test_topic_filter_comes_first() {
        let kw = extract("How does self-attention work?", Some("nlp, , graphs"), &tables());
        assert_eq!(kw.as_slice(), &["nlp", "graphs", "transformer"]);
    }

    #[test]
    fn test_canonical_then_generic_in_table_order() {
        let kw = extract(
            "A benchmark for object detection with a new CNN architecture",
            None,
            &tables(),
        );
        assert_eq!(
            kw.as_slice(),
            &["neural network", "computer vision", "convolutional network", "benchmark", "architecture"]
        );
    }

    #[test]
    fn test_short_synonyms_hit_topics() {
        let t = tables();
        assert_eq!(extract("Explain RNN and LSTM", None, &t).as_slice(), &["neural network"]);
        assert_eq!(extract("How do GANs work?", None, &t).as_slice(), &["generative model"]);
        assert_eq!(
            extract("Is RL good for games?", None, &t).as_slice(),
            &["reinforcement learning"]
        );
    }

    #[test]
    fn test_topic_filter_not_duplicated_by_table_hit() {
        let kw = extract("transformer models", Some("Transformer"), &tables());
        assert_eq!(kw.as_slice(), &["Transformer"]);
    }

    #[test]
    fn test_capped_at_five() {
        let kw = extract(
            "deep learning transformer for computer vision with reinforcement learning and diffusion on a graph neural benchmark",
            None,
            &tables(),
        );
        assert_eq!(kw.len(), MAX_KEYWORDS);
        assert_eq!(kw.as_slice()[0], "transformer");
    }

    #[test]
    fn test_length_fallback_skips_stop_words() {
        let kw = extract("Please explain quantum entanglement and teleportation protocols", None, &tables());
        assert_eq!(kw.as_slice(), &["quantum", "entanglement", "teleportation"]);
    }

    #[test]
    fn test_empty_for_short_words() {
        let kw = extract("is it ok?", None, &tables());
        assert!(kw.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let a = extract("Graph neural networks for molecule retrieval", Some("chemistry"), &tables());
        let b = extract("Graph neural networks for molecule retrieval", Some("chemistry"), &tables());
        assert_eq!(a, b);
    }
}
