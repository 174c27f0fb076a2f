use std::collections::HashSet;

use crate::reference::{Origin, Reference};

pub const MAX_REFERENCES: usize = 6;

/// Union primary then secondary results, dropping any reference whose
/// identity key was already seen, then rank by citation count.
pub fn merge(primary: Vec<Reference>, secondary: Vec<Reference>) -> Vec<Reference> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Reference> = Vec::with_capacity(primary.len() + secondary.len());

    let tagged = primary
        .into_iter()
        .map(|r| (r, Origin::PrimaryIndex))
        .chain(secondary.into_iter().map(|r| (r, Origin::SecondaryIndex)));

    for (mut reference, origin) in tagged {
        if !seen.insert(reference.identity_key()) {
            continue;
        }
        reference.source = origin;
        merged.push(reference);
    }

    // Stable: equal counts keep primary-before-secondary order.
    merged.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    merged.truncate(MAX_REFERENCES);
    merged
}
