//! # Backup Documents
//!
//! A backup is one JSON document holding the whole engine state:
//!
//! ```json
//! {
//!   "cardSets": [ ... ],
//!   "currentSet": { ... } | null,
//!   "credential": "...",
//!   "exportDate": "2024-03-01T12:30:00Z",
//!   "version": "1.0"
//! }
//! ```
//!
//! Parsing validates the shape before anything touches the repository: the text must
//! be JSON, `cardSets` must be present and be an array, and each set must decode into
//! a [`CardSet`]. Older backups that store the credential under `apiKey` still load.

use crate::error::{FlashdeckError, Result};
use crate::model::CardSet;
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub card_sets: Vec<CardSet>,
    #[serde(default)]
    pub current_set: Option<CardSet>,
    #[serde(default, alias = "apiKey")]
    pub credential: Option<String>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}

impl BackupDocument {
    pub fn capture(repo: &Repository) -> Self {
        let credential = repo.credential();
        Self {
            card_sets: repo.sets().to_vec(),
            current_set: repo.active_set().cloned(),
            credential: (!credential.is_empty()).then(|| credential.to_string()),
            export_date: Some(Utc::now()),
            version: Some(BACKUP_VERSION.to_string()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(FlashdeckError::Serialization)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| FlashdeckError::Format(format!("backup is not valid JSON: {}", e)))?;

        let Some(object) = value.as_object() else {
            return Err(FlashdeckError::Format(
                "backup must be a JSON object".to_string(),
            ));
        };
        match object.get("cardSets") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(FlashdeckError::Format(
                    "cardSets must be an array".to_string(),
                ))
            }
            None => {
                return Err(FlashdeckError::Format(
                    "missing cardSets collection".to_string(),
                ))
            }
        }

        serde_json::from_value(value)
            .map_err(|e| FlashdeckError::Format(format!("invalid card set data: {}", e)))
    }

    /// Name used when exporting to a directory.
    pub fn default_filename(&self) -> String {
        let date = self.export_date.unwrap_or_else(Utc::now);
        format!("flashdeck-backup-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn card_count(&self) -> usize {
        self.card_sets
            .iter()
            .filter(|s| !s.is_favorites())
            .map(|s| s.cards.len())
            .sum()
    }
}
