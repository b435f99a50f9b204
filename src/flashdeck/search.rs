use crate::model::{Card, CardSet};

/// A matching card and the set it was found in.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub card: &'a Card,
    pub set: &'a CardSet,
}

/// Case-insensitive substring search over question, answer and hint.
///
/// Scans sets in order, then cards in order; there is no ranking. A blank query
/// matches nothing. Otherwise the query is matched as given, surrounding spaces
/// included. Favorited cards show up once for every set holding them.
pub fn search<'a>(sets: &'a [CardSet], query: &str) -> Vec<SearchHit<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    sets.iter()
        .flat_map(|set| set.cards.iter().map(move |card| SearchHit { card, set }))
        .filter(|hit| matches(hit.card, &needle))
        .collect()
}

fn matches(card: &Card, needle: &str) -> bool {
    card.question.to_lowercase().contains(needle)
        || card.answer.to_lowercase().contains(needle)
        || card
            .hint
            .as_deref()
            .is_some_and(|hint| hint.to_lowercase().contains(needle))
}
