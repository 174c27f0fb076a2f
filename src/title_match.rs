use std::sync::Arc;
use std::time::Duration;

use crate::apis::{join_search, spawn_search, PaperSource};
use crate::filter::Filter;
use crate::merge::MAX_REFERENCES;
use crate::reference::{into_ranked, Reference, ScoredReference};
use crate::similarity::similarity;
use crate::tables::KnowledgeTables;

/// Candidates requested from the primary index for a title lookup.
pub const TITLE_LOOKUP_LIMIT: u32 = 10;

/// Whether a message reads like a paper title rather than a question.
///
/// Heuristic: long enough, and not opening with a question word. Both the
/// length threshold and the word list come from the tables.
pub fn looks_like_title(message: &str, tables: &KnowledgeTables) -> bool {
    let trimmed = message.trim();
    if trimmed.chars().count() <= tables.title_min_chars {
        return false;
    }
    let lowered = trimmed.to_lowercase();
    let leading: Vec<&str> = lowered
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();
    !tables.question_words.iter().any(|w| opens_with_words(&leading, w))
}

/// Whole-word prefix check: "tell me" matches the first two words, "what"
/// only a first word that is exactly "what".
fn opens_with_words(leading: &[&str], phrase: &str) -> bool {
    let phrase = phrase.to_lowercase();
    let words: Vec<&str> = phrase.split_whitespace().collect();
    !words.is_empty()
        && leading.len() >= words.len()
        && leading.iter().zip(&words).all(|(a, b)| a == b)
}

/// Score candidates against the message, keep close matches that pass the
/// filter, best first.
pub fn rank_candidates(
    message: &str,
    candidates: Vec<Reference>,
    filter: &Filter,
    tables: &KnowledgeTables,
) -> Vec<Reference> {
    let scored: Vec<ScoredReference> = candidates
        .into_iter()
        .filter(|r| filter.admits(r))
        .map(|reference| ScoredReference {
            score: similarity(&reference.title, message, tables),
            reference,
        })
        .filter(|s| s.score >= tables.title_similarity_floor)
        .collect();
    into_ranked(scored, MAX_REFERENCES)
}

/// Look the raw message up as a title on the primary index. Empty when the
/// message doesn't look like a title or nothing is close enough.
pub async fn try_title_match(
    source: Arc<dyn PaperSource>,
    message: &str,
    filter: &Filter,
    tables: &KnowledgeTables,
    timeout: Duration,
) -> Vec<Reference> {
    if !looks_like_title(message, tables) {
        return Vec::new();
    }
    let name = source.name().to_string();
    let handle = spawn_search(
        source,
        message.trim().to_string(),
        filter.clone(),
        TITLE_LOOKUP_LIMIT,
        timeout,
    );
    let candidates = join_search(&name, handle).await;
    let total = candidates.len();
    let matches = rank_candidates(message, candidates, filter, tables);
    tracing::debug!(total, matched = matches.len(), "title lookup finished");
    matches
}
