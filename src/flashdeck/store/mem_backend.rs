use super::backend::StorageBackend;
use crate::error::{FlashdeckError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since flashdeck is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    records: RefCell<HashMap<String, String>>,
    simulate_write_error: RefCell<bool>,
    unavailable: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation (e.g. a full disk) for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make every operation fail, as if the store could not be reached at all.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.borrow_mut() = unavailable;
    }

    /// Test helper to plant raw record text, e.g. corrupt JSON.
    pub fn put_raw(&self, key: &str, contents: &str) {
        self.records
            .borrow_mut()
            .insert(key.to_string(), contents.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.borrow().len()
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.borrow() {
            return Err(FlashdeckError::Store("Storage is unavailable".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.records.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        self.check_available()?;
        if *self.simulate_write_error.borrow() {
            return Err(FlashdeckError::Store("Simulated write error".to_string()));
        }
        self.records
            .borrow_mut()
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.records.borrow_mut().remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::model::{Card, CardSet, SetId};
    use chrono::{TimeZone, Utc};

    /// Builds a card with the given counters and a predictable id.
    pub fn card(id: &str, question: &str, reviewed: u32, mastered: u32) -> Card {
        let mut card = Card::new(question, format!("Answer to {}", question));
        card.id = crate::model::CardId::new(id);
        card.reviewed_count = reviewed;
        card.mastered_count = mastered;
        card.is_mastered = mastered >= crate::mastery::MASTERY_THRESHOLD;
        card
    }

    pub fn set_with_cards(id: &str, name: &str, cards: Vec<Card>) -> CardSet {
        let mut set = CardSet::new(SetId::new(id), name);
        set.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        set.cards = cards;
        set
    }
}
