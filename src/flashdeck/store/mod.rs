//! # Storage Layer
//!
//! This module defines the persistence abstraction for flashdeck. Storage is split in two:
//!
//! 1. [`backend::StorageBackend`]: raw keyed text records (the "how").
//! 2. [`Persistence`]: the three records the engine cares about, their JSON encoding,
//!    and the failure policy (the "what").
//!
//! ## Records
//!
//! | Record | Key | Contents |
//! |--------|-----|----------|
//! | Card sets | `card_sets.json` | JSON array of every `CardSet` |
//! | Current set | `current_set.json` | The active `CardSet`, absent when none |
//! | Credential | `credential` | Plain text generation credential |
//!
//! Timestamps are written as ISO-8601 text and come back as `DateTime<Utc>` values.
//!
//! ## Failure Policy
//!
//! Persistence failures are never fatal to the engine:
//! - Loads return empty values on missing or corrupt data and log what happened.
//! - Saves log the failure and return it so the caller can surface a warning,
//!   but the in-memory state stays authoritative for the session.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one file per record under the data directory.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/flashdeck/
//! ├── card_sets.json
//! ├── current_set.json
//! ├── credential
//! └── config.json
//! ```

use crate::error::{FlashdeckError, Result};
use crate::model::CardSet;
use tracing::{debug, error, warn};

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::StorageBackend;

const PROBE_KEY: &str = "__flashdeck_probe__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    CardSets,
    CurrentSet,
    Credential,
}

impl Record {
    pub const ALL: [Record; 3] = [Record::CardSets, Record::CurrentSet, Record::Credential];

    pub fn key(&self) -> &'static str {
        match self {
            Record::CardSets => "card_sets.json",
            Record::CurrentSet => "current_set.json",
            Record::Credential => "credential",
        }
    }
}

pub struct Persistence<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Persistence<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probe the store with a throwaway write and delete.
    pub fn is_available(&self) -> bool {
        let probe = self
            .backend
            .write(PROBE_KEY, PROBE_KEY)
            .and_then(|_| self.backend.remove(PROBE_KEY));
        match probe {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage at {} is not available: {}", self.backend.location(), e);
                false
            }
        }
    }

    pub fn load_card_sets(&self) -> Vec<CardSet> {
        match self.read_json::<Vec<CardSet>>(Record::CardSets) {
            Ok(Some(sets)) => {
                debug!("Loaded {} card sets", sets.len());
                sets
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not load card sets, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save_card_sets(&self, sets: &[CardSet]) -> Result<()> {
        self.write_json(Record::CardSets, sets)?;
        debug!("Saved {} card sets", sets.len());
        Ok(())
    }

    pub fn load_current_set(&self) -> Option<CardSet> {
        match self.read_json::<CardSet>(Record::CurrentSet) {
            Ok(set) => set,
            Err(e) => {
                warn!("Could not load current set: {}", e);
                None
            }
        }
    }

    /// `None` removes the stored record.
    pub fn save_current_set(&self, set: Option<&CardSet>) -> Result<()> {
        match set {
            Some(set) => self.write_json(Record::CurrentSet, set),
            None => self.remove(Record::CurrentSet),
        }
    }

    pub fn load_credential(&self) -> String {
        match self.backend.read(Record::Credential.key()) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!("Could not load credential: {}", e);
                String::new()
            }
        }
    }

    pub fn save_credential(&self, credential: &str) -> Result<()> {
        if credential.is_empty() {
            return self.remove(Record::Credential);
        }
        self.backend
            .write(Record::Credential.key(), credential)
            .map_err(|e| log_write_failure(Record::Credential, e))
    }

    /// Removes all three records, attempting each even if one fails.
    pub fn clear_all(&self) -> Result<()> {
        let mut first_error = None;
        for record in Record::ALL {
            if let Err(e) = self.remove(record) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn remove(&self, record: Record) -> Result<()> {
        self.backend
            .remove(record.key())
            .map_err(|e| log_write_failure(record, e))
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, record: Record) -> Result<Option<T>> {
        let Some(raw) = self.backend.read(record.key())? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(FlashdeckError::Serialization)?;
        Ok(Some(value))
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, record: Record, value: &T) -> Result<()> {
        let encoded = serde_json::to_string_pretty(value).map_err(FlashdeckError::Serialization)?;
        self.backend
            .write(record.key(), &encoded)
            .map_err(|e| log_write_failure(record, e))
    }
}

fn log_write_failure(record: Record, e: FlashdeckError) -> FlashdeckError {
    error!("Failed to write {}: {}", record.key(), e);
    e
}

#[cfg(test)]
mod tests {
    use super::mem_backend::fixtures::{card, set_with_cards};
    use super::mem_backend::MemBackend;
    use super::*;
    use crate::model::{ReviewMode, SetId};
    use chrono::{DateTime, Utc};

    fn persistence() -> Persistence<MemBackend> {
        Persistence::new(MemBackend::new())
    }

    #[test]
    fn card_sets_round_trip_with_timestamps() {
        let p = persistence();
        let mut set = set_with_cards("s1", "Biology", vec![card("c1", "Cell", 2, 1)]);
        set.review_mode = ReviewMode::TopReview;
        set.cards[0].hint = Some("membrane".into());
        set.cards[0].is_favorite = true;

        p.save_card_sets(std::slice::from_ref(&set)).unwrap();
        let loaded = p.load_card_sets();

        assert_eq!(loaded, vec![set.clone()]);
        assert_eq!(loaded[0].created_at, set.created_at);
    }

    #[test]
    fn timestamps_are_written_as_iso_text() {
        let p = persistence();
        let set = set_with_cards("s1", "Biology", vec![]);
        p.save_card_sets(&[set]).unwrap();

        let raw = p.backend().raw(Record::CardSets.key()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let text = json[0]["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(text).is_ok());
    }

    #[test]
    fn iso_timestamps_with_millis_load() {
        let p = persistence();
        p.backend().put_raw(
            Record::CardSets.key(),
            r#"[{"id":"1700000000000","name":"Old","cards":[],"createdAt":"2023-11-14T22:13:20.000Z","reviewMode":"normal"}]"#,
        );
        let loaded = p.load_card_sets();
        assert_eq!(loaded.len(), 1);
        let expected: DateTime<Utc> = "2023-11-14T22:13:20Z".parse().unwrap();
        assert_eq!(loaded[0].created_at, expected);
    }

    #[test]
    fn corrupt_card_sets_load_as_empty() {
        let p = persistence();
        p.backend().put_raw(Record::CardSets.key(), "{not json");
        assert!(p.load_card_sets().is_empty());
    }

    #[test]
    fn missing_records_load_as_empty_values() {
        let p = persistence();
        assert!(p.load_card_sets().is_empty());
        assert!(p.load_current_set().is_none());
        assert_eq!(p.load_credential(), "");
    }

    #[test]
    fn saving_no_current_set_removes_record() {
        let p = persistence();
        let set = set_with_cards("s1", "Biology", vec![]);
        p.save_current_set(Some(&set)).unwrap();
        assert_eq!(p.load_current_set().unwrap().id, SetId::new("s1"));

        p.save_current_set(None).unwrap();
        assert!(p.load_current_set().is_none());
        assert!(p.backend().raw(Record::CurrentSet.key()).is_none());
    }

    #[test]
    fn credential_round_trip() {
        let p = persistence();
        p.save_credential("secret-key").unwrap();
        assert_eq!(p.load_credential(), "secret-key");
    }

    #[test]
    fn write_failures_are_reported_not_panicking() {
        let p = persistence();
        p.backend().set_simulate_write_error(true);
        let result = p.save_card_sets(&[set_with_cards("s1", "Biology", vec![])]);
        assert!(matches!(result, Err(FlashdeckError::Store(_))));
    }

    #[test]
    fn availability_probe_leaves_no_trace() {
        let p = persistence();
        assert!(p.is_available());
        assert_eq!(p.backend().record_count(), 0);

        p.backend().set_unavailable(true);
        assert!(!p.is_available());
    }

    #[test]
    fn unavailable_store_loads_empty() {
        let p = persistence();
        p.backend().set_unavailable(true);
        assert!(p.load_card_sets().is_empty());
        assert_eq!(p.load_credential(), "");
    }

    #[test]
    fn clear_all_removes_every_record() {
        let p = persistence();
        let set = set_with_cards("s1", "Biology", vec![]);
        p.save_card_sets(std::slice::from_ref(&set)).unwrap();
        p.save_current_set(Some(&set)).unwrap();
        p.save_credential("k").unwrap();

        p.clear_all().unwrap();
        assert_eq!(p.backend().record_count(), 0);
    }
}
