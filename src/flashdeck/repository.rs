//! # Card/Set Repository
//!
//! The single source of truth for every set, the active-set reference and the
//! generation credential. Everything else (ordering, search, stats) reads from
//! here; mastery actions and edits mutate cards only through [`Repository::update_card`].
//!
//! ## The Favorites Mirror
//!
//! The set with id [`FAVORITES_SET_ID`] is system managed. Its cards are exactly the
//! cards (across all sets, itself included) whose `is_favorite` flag is set. The mirror
//! holds copies of the owner's cards, and every update is applied to every occurrence
//! of a card id, so the copies never diverge.
//!
//! Favorites is materialized lazily: [`Repository::ensure_favorites`] prepends it the
//! first time any set exists. Deleting it is allowed; it comes back on the next
//! `ensure_favorites`.
//!
//! ## Unknown Ids
//!
//! Every mutation on an id that does not exist is a silent no-op. The boolean returns
//! tell callers whether anything happened, but nothing is an error.

use crate::model::{Card, CardId, CardPatch, CardSet, SetId, SetPatch, FAVORITES_SET_ID};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repository {
    sets: Vec<CardSet>,
    active: Option<SetId>,
    credential: String,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a repository from hydrated records. The stored active set is resolved
    /// by id; a record pointing at a set that no longer exists is dropped.
    pub fn from_parts(sets: Vec<CardSet>, active: Option<SetId>, credential: String) -> Self {
        let mut repo = Self {
            sets,
            active: None,
            credential,
        };
        if let Some(id) = active {
            if !repo.set_active(&id) {
                debug!("Stored active set {} no longer exists, clearing it", id);
            }
        }
        repo
    }

    // --- Reads ---

    pub fn sets(&self) -> &[CardSet] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn set(&self, id: &SetId) -> Option<&CardSet> {
        self.sets.iter().find(|s| &s.id == id)
    }

    pub fn favorites(&self) -> Option<&CardSet> {
        self.sets.iter().find(|s| s.is_favorites())
    }

    pub fn active_set_id(&self) -> Option<&SetId> {
        self.active.as_ref()
    }

    pub fn active_set(&self) -> Option<&CardSet> {
        self.active.as_ref().and_then(|id| self.set(id))
    }

    /// Locate a card and the set that owns it. When the card also lives in the
    /// Favorites mirror, the owning set is preferred.
    pub fn find_card(&self, id: &CardId) -> Option<(&Card, &CardSet)> {
        let mut mirror_hit = None;
        for set in &self.sets {
            if let Some(card) = set.card(id) {
                if !set.is_favorites() {
                    return Some((card, set));
                }
                mirror_hit = Some((card, set));
            }
        }
        mirror_hit
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = credential.into();
    }

    // --- Active set ---

    pub fn set_active(&mut self, id: &SetId) -> bool {
        if self.set(id).is_none() {
            return false;
        }
        self.active = Some(id.clone());
        true
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    // --- Set operations ---

    /// Create an empty set, append it and make it active.
    pub fn create_set(&mut self, name: impl Into<String>) -> SetId {
        let id = self.fresh_set_id();
        let set = CardSet::new(id.clone(), name);
        debug!("Creating set {} ({})", set.name, id);
        self.sets.push(set);
        self.active = Some(id.clone());
        self.ensure_favorites();
        id
    }

    pub fn delete_set(&mut self, id: &SetId) -> bool {
        let before = self.sets.len();
        self.sets.retain(|s| &s.id != id);
        if self.sets.len() == before {
            return false;
        }
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        debug!("Deleted set {}", id);
        true
    }

    pub fn update_set(&mut self, id: &SetId, patch: &SetPatch) -> bool {
        let Some(set) = self.sets.iter_mut().find(|s| &s.id == id) else {
            return false;
        };
        if let Some(name) = &patch.name {
            set.name = name.clone();
        }
        if let Some(mode) = patch.review_mode {
            set.review_mode = mode;
        }
        true
    }

    /// Prepend an empty Favorites set if none exists and at least one set does.
    /// Returns whether it was created.
    pub fn ensure_favorites(&mut self) -> bool {
        if self.sets.is_empty() || self.favorites().is_some() {
            return false;
        }
        debug!("Materializing favorites set");
        self.sets.insert(0, CardSet::favorites());
        true
    }

    /// Wholesale replacement of the collection. Favorites is not resynchronized;
    /// follow with [`Self::ensure_favorites`] and [`Self::rebuild_favorites`].
    pub fn import_all(&mut self, sets: Vec<CardSet>) {
        self.sets = sets;
        if let Some(id) = self.active.clone() {
            if self.set(&id).is_none() {
                self.active = None;
            }
        }
    }

    /// Re-derive the Favorites mirror from every card's `is_favorite` flag.
    /// Existing mirror order is kept; newly discovered favorites are appended in
    /// set order. Does nothing when no Favorites set exists.
    pub fn rebuild_favorites(&mut self) {
        let Some(fav_idx) = self.favorites_index() else {
            return;
        };

        let mut mirror: Vec<Card> = self.sets[fav_idx]
            .cards
            .iter()
            .filter(|c| c.is_favorite)
            .cloned()
            .collect();

        for (idx, set) in self.sets.iter().enumerate() {
            if idx == fav_idx {
                continue;
            }
            for card in set.cards.iter().filter(|c| c.is_favorite) {
                match mirror.iter_mut().find(|m| m.id == card.id) {
                    // The owner's copy wins over a stale mirror entry
                    Some(existing) => *existing = card.clone(),
                    None => mirror.push(card.clone()),
                }
            }
        }

        self.sets[fav_idx].cards = mirror;
    }

    // --- Card operations ---

    /// Append cards to a set in the given order. Cards whose id is already in use
    /// anywhere are skipped. Returns how many were added.
    pub fn add_cards(&mut self, set_id: &SetId, cards: Vec<Card>) -> usize {
        if self.set(set_id).is_none() {
            return 0;
        }

        let mut accepted = Vec::with_capacity(cards.len());
        for card in cards {
            let duplicate = self.find_card(&card.id).is_some()
                || accepted.iter().any(|c: &Card| c.id == card.id);
            if duplicate {
                debug!("Skipping card with duplicate id {}", card.id);
                continue;
            }
            accepted.push(card);
        }

        let added = accepted.len();
        let favorites: Vec<CardId> = accepted
            .iter()
            .filter(|c| c.is_favorite)
            .map(|c| c.id.clone())
            .collect();

        if let Some(set) = self.sets.iter_mut().find(|s| &s.id == set_id) {
            set.cards.extend(accepted);
        }
        for id in favorites {
            self.sync_favorite(&id);
        }

        debug!("Added {} cards to set {}", added, set_id);
        added
    }

    /// Apply a partial update to every occurrence of the card. When the patch
    /// touches the favorite flag the Favorites mirror is re-derived for this card.
    pub fn update_card(&mut self, id: &CardId, patch: &CardPatch) -> bool {
        let mut found = false;
        for set in &mut self.sets {
            for card in set.cards.iter_mut().filter(|c| &c.id == id) {
                card.apply(patch);
                found = true;
            }
        }
        if found && patch.is_favorite.is_some() {
            self.sync_favorite(id);
        }
        found
    }

    /// Remove the card from every set that contains it.
    pub fn delete_card(&mut self, id: &CardId) -> bool {
        let mut removed = false;
        for set in &mut self.sets {
            let before = set.cards.len();
            set.cards.retain(|c| &c.id != id);
            removed |= set.cards.len() != before;
        }
        if removed {
            debug!("Deleted card {}", id);
        }
        removed
    }

    // --- Internals ---

    fn favorites_index(&self) -> Option<usize> {
        self.sets.iter().position(|s| s.is_favorites())
    }

    /// Bring the mirror in line with the card's current favorite flag.
    fn sync_favorite(&mut self, id: &CardId) {
        let Some(card) = self.find_card(id).map(|(card, _)| card.clone()) else {
            return;
        };
        if card.is_favorite {
            self.ensure_favorites();
        }
        let Some(fav_idx) = self.favorites_index() else {
            return;
        };
        let favorites = &mut self.sets[fav_idx];
        if card.is_favorite {
            if !favorites.contains(id) {
                favorites.cards.push(card);
            }
        } else {
            favorites.cards.retain(|c| &c.id != id);
        }
    }

    fn fresh_set_id(&self) -> SetId {
        loop {
            let id = SetId::generate();
            if id.as_str() != FAVORITES_SET_ID && self.set(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewMode;
    use crate::store::mem_backend::fixtures::{card, set_with_cards};

    fn favorites_consistent(repo: &Repository) -> bool {
        let Some(fav) = repo.favorites() else {
            return repo.sets().iter().all(|s| s.cards.iter().all(|c| !c.is_favorite));
        };
        let all_flagged = repo
            .sets()
            .iter()
            .flat_map(|s| s.cards.iter())
            .filter(|c| c.is_favorite)
            .all(|c| fav.contains(&c.id));
        let mirror_flagged = fav.cards.iter().all(|c| c.is_favorite);
        all_flagged && mirror_flagged
    }

    fn repo_with_set() -> (Repository, SetId) {
        let mut repo = Repository::new();
        let id = repo.create_set("Biology");
        repo.add_cards(
            &id,
            vec![card("a", "Alpha", 0, 0), card("b", "Beta", 1, 0), card("c", "Gamma", 0, 0)],
        );
        (repo, id)
    }

    #[test]
    fn create_set_becomes_active_and_materializes_favorites() {
        let mut repo = Repository::new();
        let id = repo.create_set("Biology");

        assert_eq!(repo.active_set_id(), Some(&id));
        assert_eq!(repo.sets().len(), 2);
        assert!(repo.sets()[0].is_favorites());
        assert_eq!(repo.sets()[1].name, "Biology");
        assert_eq!(repo.sets()[1].review_mode, ReviewMode::Normal);
        assert!(repo.sets()[1].cards.is_empty());
    }

    #[test]
    fn create_set_never_reuses_ids() {
        let mut repo = Repository::new();
        let a = repo.create_set("A");
        let b = repo.create_set("B");
        assert_ne!(a, b);
        assert!(!a.is_favorites());
    }

    #[test]
    fn ensure_favorites_is_idempotent() {
        let mut repo = Repository::from_parts(
            vec![set_with_cards("s1", "One", vec![card("a", "A", 0, 0)])],
            None,
            String::new(),
        );
        assert!(repo.ensure_favorites());
        let once = repo.clone();
        assert!(!repo.ensure_favorites());
        assert_eq!(repo, once);
    }

    #[test]
    fn ensure_favorites_needs_at_least_one_set() {
        let mut repo = Repository::new();
        assert!(!repo.ensure_favorites());
        assert!(repo.is_empty());
    }

    #[test]
    fn add_cards_appends_in_order_and_skips_duplicates() {
        let (mut repo, id) = repo_with_set();
        let added = repo.add_cards(&id, vec![card("a", "Dup", 0, 0), card("d", "Delta", 0, 0)]);

        assert_eq!(added, 1);
        let ids: Vec<_> = repo.set(&id).unwrap().cards.iter().map(|c| c.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn add_cards_is_visible_through_active_set() {
        let (repo, id) = repo_with_set();
        assert_eq!(repo.active_set().unwrap().id, id);
        assert_eq!(repo.active_set().unwrap().cards.len(), 3);
    }

    #[test]
    fn add_cards_to_unknown_set_is_noop() {
        let (mut repo, _) = repo_with_set();
        let before = repo.clone();
        assert_eq!(repo.add_cards(&SetId::new("nope"), vec![card("z", "Z", 0, 0)]), 0);
        assert_eq!(repo, before);
    }

    #[test]
    fn favoriting_adds_to_mirror_and_unfavoriting_removes() {
        let (mut repo, _) = repo_with_set();
        let b = CardId::new("b");

        repo.update_card(&b, &CardPatch::favorite(true));
        assert!(repo.favorites().unwrap().contains(&b));
        assert!(favorites_consistent(&repo));

        repo.update_card(&b, &CardPatch::favorite(false));
        assert!(!repo.favorites().unwrap().contains(&b));
        assert!(favorites_consistent(&repo));
    }

    #[test]
    fn favoriting_twice_does_not_duplicate_mirror_entry() {
        let (mut repo, _) = repo_with_set();
        let a = CardId::new("a");
        repo.update_card(&a, &CardPatch::favorite(true));
        repo.update_card(&a, &CardPatch::favorite(true));
        assert_eq!(repo.favorites().unwrap().cards.len(), 1);
    }

    #[test]
    fn updates_reach_the_mirror_copy() {
        let (mut repo, id) = repo_with_set();
        let a = CardId::new("a");
        repo.update_card(&a, &CardPatch::favorite(true));
        repo.update_card(
            &a,
            &CardPatch {
                question: Some("Alpha v2".into()),
                reviewed_count: Some(4),
                ..Default::default()
            },
        );

        let owner = repo.set(&id).unwrap().card(&a).unwrap();
        let mirror = repo.favorites().unwrap().card(&a).unwrap();
        assert_eq!(owner, mirror);
        assert_eq!(mirror.question, "Alpha v2");
        assert_eq!(mirror.reviewed_count, 4);
    }

    #[test]
    fn unfavoriting_from_the_mirror_updates_owner() {
        let (mut repo, id) = repo_with_set();
        let a = CardId::new("a");
        repo.update_card(&a, &CardPatch::favorite(true));
        repo.update_card(&a, &CardPatch::favorite(false));
        assert!(!repo.set(&id).unwrap().card(&a).unwrap().is_favorite);
    }

    #[test]
    fn favoriting_recreates_deleted_favorites_set() {
        let (mut repo, _) = repo_with_set();
        repo.delete_set(&SetId::favorites());
        assert!(repo.favorites().is_none());

        repo.update_card(&CardId::new("c"), &CardPatch::favorite(true));
        assert!(repo.sets()[0].is_favorites());
        assert!(favorites_consistent(&repo));
    }

    #[test]
    fn adding_prefavorited_cards_mirrors_them() {
        let (mut repo, id) = repo_with_set();
        let mut fav = card("f", "Fav", 0, 0);
        fav.is_favorite = true;
        repo.add_cards(&id, vec![fav]);
        assert!(repo.favorites().unwrap().contains(&CardId::new("f")));
    }

    #[test]
    fn deleting_favorited_card_cascades_to_mirror() {
        let (mut repo, id) = repo_with_set();
        let a = CardId::new("a");
        repo.update_card(&a, &CardPatch::favorite(true));

        assert!(repo.delete_card(&a));
        assert!(!repo.set(&id).unwrap().contains(&a));
        assert!(!repo.favorites().unwrap().contains(&a));
        assert!(repo.find_card(&a).is_none());
    }

    #[test]
    fn mirror_stays_consistent_over_mixed_operations() {
        let (mut repo, id) = repo_with_set();
        let ops: Vec<(&str, bool)> = vec![("a", true), ("b", true), ("a", false), ("c", true)];
        for (card_id, fav) in ops {
            repo.update_card(&CardId::new(card_id), &CardPatch::favorite(fav));
            assert!(favorites_consistent(&repo));
        }
        repo.delete_card(&CardId::new("b"));
        assert!(favorites_consistent(&repo));
        let mut e = card("e", "Epsilon", 0, 0);
        e.is_favorite = true;
        repo.add_cards(&id, vec![e]);
        assert!(favorites_consistent(&repo));

        let mirror: Vec<_> = repo.favorites().unwrap().cards.iter().map(|c| c.id.as_str().to_string()).collect();
        assert_eq!(mirror, vec!["c", "e"]);
    }

    #[test]
    fn delete_active_set_clears_reference() {
        let (mut repo, id) = repo_with_set();
        assert!(repo.delete_set(&id));
        assert!(repo.active_set().is_none());
        assert!(repo.active_set_id().is_none());
    }

    #[test]
    fn delete_other_set_keeps_active() {
        let (mut repo, id) = repo_with_set();
        let other = repo.create_set("Other");
        repo.set_active(&id);
        repo.delete_set(&other);
        assert_eq!(repo.active_set_id(), Some(&id));
    }

    #[test]
    fn update_set_is_seen_by_active_reference() {
        let (mut repo, id) = repo_with_set();
        repo.update_set(
            &id,
            &SetPatch {
                name: Some("Bio 101".into()),
                review_mode: Some(ReviewMode::TopReview),
            },
        );
        let active = repo.active_set().unwrap();
        assert_eq!(active.name, "Bio 101");
        assert_eq!(active.review_mode, ReviewMode::TopReview);
    }

    #[test]
    fn operations_on_unknown_ids_are_noops() {
        let (mut repo, _) = repo_with_set();
        let before = repo.clone();
        assert!(!repo.update_card(&CardId::new("zz"), &CardPatch::favorite(true)));
        assert!(!repo.delete_card(&CardId::new("zz")));
        assert!(!repo.delete_set(&SetId::new("zz")));
        assert!(!repo.update_set(&SetId::new("zz"), &SetPatch::rename("x")));
        assert!(!repo.set_active(&SetId::new("zz")));
        assert_eq!(repo, before);
    }

    #[test]
    fn import_all_replaces_without_favorites_sync() {
        let (mut repo, _) = repo_with_set();
        let mut starred = card("s", "Starred", 0, 0);
        starred.is_favorite = true;
        repo.import_all(vec![set_with_cards("n1", "New", vec![starred])]);

        assert_eq!(repo.sets().len(), 1);
        assert!(repo.favorites().is_none());
        assert!(repo.active_set().is_none());

        repo.ensure_favorites();
        repo.rebuild_favorites();
        assert!(repo.favorites().unwrap().contains(&CardId::new("s")));
        assert!(favorites_consistent(&repo));
    }

    #[test]
    fn rebuild_drops_unflagged_mirror_entries() {
        let mut stale = card("x", "Stale", 0, 0);
        stale.is_favorite = false;
        let mut fav = set_with_cards(FAVORITES_SET_ID, "Collected", vec![stale]);
        fav.cards.push({
            let mut orphan = card("o", "Orphan", 0, 0);
            orphan.is_favorite = true;
            orphan
        });
        let mut repo = Repository::from_parts(vec![fav], None, String::new());
        repo.rebuild_favorites();

        let ids: Vec<_> = repo.favorites().unwrap().cards.iter().map(|c| c.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["o"]);
    }

    #[test]
    fn from_parts_drops_stale_active_reference() {
        let repo = Repository::from_parts(
            vec![set_with_cards("s1", "One", vec![])],
            Some(SetId::new("gone")),
            "key".into(),
        );
        assert!(repo.active_set().is_none());
        assert_eq!(repo.credential(), "key");
    }

    #[test]
    fn find_card_prefers_owner_over_mirror() {
        let (mut repo, id) = repo_with_set();
        let a = CardId::new("a");
        repo.update_card(&a, &CardPatch::favorite(true));
        let (_, owner) = repo.find_card(&a).unwrap();
        assert_eq!(owner.id, id);
    }
}
