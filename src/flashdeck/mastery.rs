//! # Mastery Progression
//!
//! Each card moves `New -> Learning -> Mastered` as the learner acts on it:
//!
//! - **Mastered**: both counters go up by one, `is_mastered` becomes
//!   `mastered_count >= MASTERY_THRESHOLD`.
//! - **Reviewed**: only `reviewed_count` goes up.
//!
//! Counters never go down and there is no un-master action. Transitions produce a
//! [`CardPatch`] which the caller applies through `Repository::update_card`, so the
//! Favorites mirror receives the same change.

use crate::model::{Card, CardPatch};
use serde::Serialize;
use std::fmt;

pub const MASTERY_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryAction {
    Mastered,
    Reviewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryState {
    New,
    Learning,
    Mastered,
}

impl fmt::Display for MasteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MasteryState::New => "new",
            MasteryState::Learning => "learning",
            MasteryState::Mastered => "mastered",
        };
        f.write_str(label)
    }
}

/// Cards that were reviewed but never marked mastered count as learning.
pub fn state_of(card: &Card) -> MasteryState {
    if card.mastered_count >= MASTERY_THRESHOLD {
        MasteryState::Mastered
    } else if card.mastered_count == 0 && card.reviewed_count == 0 {
        MasteryState::New
    } else {
        MasteryState::Learning
    }
}

pub fn transition(card: &Card, action: MasteryAction) -> CardPatch {
    match action {
        MasteryAction::Mastered => {
            let mastered = card.mastered_count.saturating_add(1);
            CardPatch {
                mastered_count: Some(mastered),
                reviewed_count: Some(card.reviewed_count.saturating_add(1)),
                is_mastered: Some(mastered >= MASTERY_THRESHOLD),
                ..Default::default()
            }
        }
        MasteryAction::Reviewed => CardPatch {
            reviewed_count: Some(card.reviewed_count.saturating_add(1)),
            ..Default::default()
        },
    }
}
