//! # Card and Set References
//!
//! Ids are uuids (or, in imported data, millisecond timestamps). Neither is pleasant to
//! type, so the CLI accepts shorter references and this module resolves them.
//!
//! ## Sets
//!
//! A set reference is tried, in order, as:
//! 1. An exact set id (`favorites`, a uuid)
//! 2. A 1-based position in the set listing
//! 3. A case-insensitive set name; more than one match is an error
//!
//! ## Cards
//!
//! A card reference is tried, in order, as:
//! 1. An exact card id
//! 2. A 1-based position in the **active set's review order**, the same numbers
//!    `flashdeck cards` prints
//! 3. An id prefix of at least [`MIN_PREFIX_LEN`] characters, unique across all sets
//!
//! Positions follow the review order, so the numbering shifts when the set's mode or
//! its counters change. Listings and resolution both go through [`index_active_cards`]
//! so they always agree.

use crate::error::{FlashdeckError, Result};
use crate::model::{Card, CardId, CardSet, ReviewMode, SetId};
use crate::ordering::order;
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MIN_PREFIX_LEN: usize = 4;

/// A card together with where it was listed and which set it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayCard {
    /// 1-based position in the listing this card came from
    pub position: usize,
    pub card: Card,
    pub set_id: SetId,
    pub set_name: String,
}

impl DisplayCard {
    pub fn new(position: usize, card: &Card, set: &CardSet) -> Self {
        Self {
            position,
            card: card.clone(),
            set_id: set.id.clone(),
            set_name: set.name.clone(),
        }
    }
}

/// One row of the set listing.
#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
    pub position: usize,
    pub id: SetId,
    pub name: String,
    pub cards: usize,
    pub mastered: usize,
    pub review_mode: ReviewMode,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_favorites: bool,
}

pub fn summarize_sets(repo: &Repository) -> Vec<SetSummary> {
    let active = repo.active_set_id();
    repo.sets()
        .iter()
        .enumerate()
        .map(|(i, set)| SetSummary {
            position: i + 1,
            id: set.id.clone(),
            name: set.name.clone(),
            cards: set.cards.len(),
            mastered: set.mastered_cards(),
            review_mode: set.review_mode,
            created_at: set.created_at,
            is_active: active == Some(&set.id),
            is_favorites: set.is_favorites(),
        })
        .collect()
}

/// A set's cards in review order, numbered from 1.
pub fn index_set_cards(set: &CardSet) -> Vec<DisplayCard> {
    order(&set.cards, set.review_mode)
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| DisplayCard::new(pos + 1, &set.cards[idx], set))
        .collect()
}

pub fn index_active_cards(repo: &Repository) -> Vec<DisplayCard> {
    repo.active_set().map(index_set_cards).unwrap_or_default()
}

fn parse_position(input: &str) -> Option<usize> {
    input.parse::<usize>().ok().filter(|&n| n > 0)
}

pub fn resolve_set(repo: &Repository, input: &str) -> Result<SetId> {
    let input = input.trim();
    if let Some(set) = repo.sets().iter().find(|s| s.id.as_str() == input) {
        return Ok(set.id.clone());
    }

    if let Some(n) = parse_position(input) {
        return repo
            .sets()
            .get(n - 1)
            .map(|s| s.id.clone())
            .ok_or_else(|| FlashdeckError::SetNotFound(format!("#{}", n)));
    }

    let lowered = input.to_lowercase();
    let named: Vec<&CardSet> = repo
        .sets()
        .iter()
        .filter(|s| s.name.to_lowercase() == lowered)
        .collect();
    match named.as_slice() {
        [set] => Ok(set.id.clone()),
        [] => Err(FlashdeckError::SetNotFound(input.to_string())),
        _ => Err(FlashdeckError::Api(format!(
            "'{}' matches {} sets, use its position or id",
            input,
            named.len()
        ))),
    }
}

pub fn resolve_card(repo: &Repository, input: &str) -> Result<CardId> {
    let input = input.trim();
    let exact = CardId::new(input);
    if repo.find_card(&exact).is_some() {
        return Ok(exact);
    }

    if let Some(n) = parse_position(input) {
        if repo.active_set().is_none() {
            return Err(FlashdeckError::Api(
                "No active set; select one with `flashdeck use` or reference the card by id"
                    .to_string(),
            ));
        }
        return index_active_cards(repo)
            .into_iter()
            .nth(n - 1)
            .map(|dc| dc.card.id)
            .ok_or_else(|| FlashdeckError::CardNotFound(format!("#{}", n)));
    }

    if input.chars().count() < MIN_PREFIX_LEN {
        return Err(FlashdeckError::Api(format!(
            "Card id prefix '{}' is too short (need at least {} characters)",
            input, MIN_PREFIX_LEN
        )));
    }

    let mut matches: Vec<&CardId> = repo
        .sets()
        .iter()
        .flat_map(|s| s.cards.iter())
        .map(|c| &c.id)
        .filter(|id| id.as_str().starts_with(input))
        .collect();
    matches.sort();
    matches.dedup();

    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(FlashdeckError::CardNotFound(input.to_string())),
        _ => Err(FlashdeckError::Api(format!(
            "Card id prefix '{}' is ambiguous ({} cards match)",
            input,
            matches.len()
        ))),
    }
}

/// Resolve several references, dropping repeats but keeping first-seen order.
pub fn resolve_cards<I: AsRef<str>>(repo: &Repository, inputs: &[I]) -> Result<Vec<CardId>> {
    let mut ids: Vec<CardId> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let id = resolve_card(repo, input.as_ref())?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
