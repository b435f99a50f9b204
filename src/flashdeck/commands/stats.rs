//! Learning analytics: totals across the collection plus a per-set breakdown.
//!
//! Totals skip the favorites set, whose cards are copies of cards counted in their
//! owning set. The breakdown lists every set, favorites included.

use crate::commands::CmdResult;
use crate::model::{CardSet, SetId};
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_sets: usize,
    pub total_cards: usize,
    pub mastered_cards: usize,
    pub total_reviews: u64,
    pub total_mastered_actions: u64,
    /// Percentage of cards that are mastered, 0 when there are no cards
    pub mastery_rate: f64,
    pub sets: Vec<SetStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetStats {
    pub id: SetId,
    pub name: String,
    pub cards: usize,
    pub mastered: usize,
    pub reviews: u64,
    pub mastery_rate: f64,
    pub created_at: DateTime<Utc>,
    pub is_favorites: bool,
}

impl SetStats {
    fn of(set: &CardSet) -> Self {
        let cards = set.cards.len();
        let mastered = set.mastered_cards();
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            cards,
            mastered,
            reviews: set.cards.iter().map(|c| u64::from(c.reviewed_count)).sum(),
            mastery_rate: rate(mastered, cards),
            created_at: set.created_at,
            is_favorites: set.is_favorites(),
        }
    }
}

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub fn compute(repo: &Repository) -> Stats {
    let owned: Vec<&CardSet> = repo.sets().iter().filter(|s| !s.is_favorites()).collect();
    let cards = owned.iter().flat_map(|s| s.cards.iter());

    let total_cards = cards.clone().count();
    let mastered_cards = cards.clone().filter(|c| c.is_mastered).count();

    Stats {
        total_sets: owned.len(),
        total_cards,
        mastered_cards,
        total_reviews: cards.clone().map(|c| u64::from(c.reviewed_count)).sum(),
        total_mastered_actions: cards.map(|c| u64::from(c.mastered_count)).sum(),
        mastery_rate: rate(mastered_cards, total_cards),
        sets: repo.sets().iter().map(SetStats::of).collect(),
    }
}

pub fn run(repo: &Repository) -> CmdResult {
    CmdResult {
        stats: Some(compute(repo)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, CardPatch};
    use crate::store::mem_backend::fixtures::{card, set_with_cards};

    #[test]
    fn totals_skip_the_favorites_copies() {
        let mut repo = Repository::from_parts(
            vec![
                set_with_cards(
                    "s1",
                    "Biology",
                    vec![card("a", "A", 5, 3), card("b", "B", 2, 1)],
                ),
                set_with_cards("s2", "Empty", vec![]),
            ],
            None,
            String::new(),
        );
        repo.ensure_favorites();
        repo.update_card(&CardId::new("a"), &CardPatch::favorite(true));

        let stats = compute(&repo);
        assert_eq!(stats.total_sets, 2);
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.mastered_cards, 1);
        assert_eq!(stats.total_reviews, 7);
        assert_eq!(stats.total_mastered_actions, 4);
        assert_eq!(stats.mastery_rate, 50.0);

        assert_eq!(stats.sets.len(), 3);
        assert!(stats.sets[0].is_favorites);
        assert_eq!(stats.sets[0].cards, 1);
        assert_eq!(stats.sets[1].reviews, 7);
        assert_eq!(stats.sets[2].mastery_rate, 0.0);
    }

    #[test]
    fn empty_repository_has_zero_rate() {
        let stats = compute(&Repository::new());
        assert_eq!(stats, Stats::default());
    }
}
