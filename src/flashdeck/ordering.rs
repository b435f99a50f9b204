//! # Review Ordering
//!
//! [`order`] turns a set's cards and its [`ReviewMode`] into the sequence of positions
//! to present. It returns indices into the input slice, never copies, so a caller can
//! keep mutating cards by index.
//!
//! | Mode | Result |
//! |------|--------|
//! | `normal` | Insertion order |
//! | `new-only` | Cards never reviewed nor mastered, insertion order |
//! | `top-review` | All cards, most reviewed first |
//! | `least-mastered` | All cards, least mastered first |
//!
//! Sorting is stable: ties keep their insertion order.
//!
//! [`ReviewQueue`] caches the ordering for a study session and owns the cursor.
//! The cache is invalidated explicitly; `refresh` also notices when the set, its mode
//! or its card list changed underneath it.

use crate::model::{Card, CardId, CardSet, ReviewMode, SetId};
use std::cmp::Reverse;

pub fn order(cards: &[Card], mode: ReviewMode) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..cards.len()).collect();
    match mode {
        ReviewMode::Normal => {}
        ReviewMode::NewOnly => {
            indices.retain(|&i| cards[i].reviewed_count == 0 && cards[i].mastered_count == 0)
        }
        ReviewMode::TopReview => indices.sort_by_key(|&i| Reverse(cards[i].reviewed_count)),
        ReviewMode::LeastMastered => indices.sort_by_key(|&i| cards[i].mastered_count),
    }
    indices
}

/// What the cached ordering was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    set_id: SetId,
    mode: ReviewMode,
    card_ids: Vec<CardId>,
}

impl Snapshot {
    fn of(set: &CardSet) -> Self {
        Self {
            set_id: set.id.clone(),
            mode: set.review_mode,
            card_ids: set.cards.iter().map(|c| c.id.clone()).collect(),
        }
    }
}

/// Cached review ordering plus the learner's position in it.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    snapshot: Option<Snapshot>,
    ordering: Vec<usize>,
    position: usize,
    dirty: bool,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Default::default()
        }
    }

    /// Mark the cached ordering stale. Call after any mutation of the active set.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute the ordering if it is stale, then clamp the cursor.
    /// Returns whether a recompute happened.
    pub fn refresh(&mut self, set: &CardSet) -> bool {
        let snapshot = Snapshot::of(set);
        let stale = self.dirty || self.snapshot.as_ref() != Some(&snapshot);
        if stale {
            if self
                .snapshot
                .as_ref()
                .is_some_and(|s| s.set_id != snapshot.set_id)
            {
                self.position = 0;
            }
            self.ordering = order(&set.cards, set.review_mode);
            self.snapshot = Some(snapshot);
            self.dirty = false;
        }
        if self.position >= self.ordering.len() {
            self.position = 0;
        }
        stale
    }

    /// Drop the cached ordering entirely, e.g. when there is no active set.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    pub fn len(&self) -> usize {
        self.ordering.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordering.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Index into the set's cards for the card under the cursor.
    pub fn current(&self) -> Option<usize> {
        self.ordering.get(self.position).copied()
    }

    /// Index into the set's cards for the card after the cursor, if any.
    pub fn upcoming(&self) -> Option<usize> {
        self.ordering.get(self.position + 1).copied()
    }

    /// Put the cursor on the card with this id. Leaves the cursor alone and
    /// returns false when the card is not in the current ordering.
    pub fn focus(&mut self, set: &CardSet, id: &CardId) -> bool {
        match self
            .ordering
            .iter()
            .position(|&idx| set.cards.get(idx).is_some_and(|c| &c.id == id))
        {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    /// Move to the next card. Stays on the last card; returns whether it moved.
    pub fn advance(&mut self) -> bool {
        if self.position + 1 < self.ordering.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous card. Stays on the first card; returns whether it moved.
    pub fn retreat(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }
}
