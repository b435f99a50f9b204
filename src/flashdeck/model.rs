use crate::error::FlashdeckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Id of the system-managed set that mirrors every favorited card.
pub const FAVORITES_SET_ID: &str = "favorites";

/// Display name given to the Favorites set when it is materialized.
pub const FAVORITES_SET_NAME: &str = "Collected";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to reference a card from the CLI.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(String);

impl SetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn favorites() -> Self {
        Self(FAVORITES_SET_ID.to_string())
    }

    pub fn is_favorites(&self) -> bool {
        self.0 == FAVORITES_SET_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewMode {
    #[default]
    Normal,
    NewOnly,
    TopReview,
    LeastMastered,
}

impl ReviewMode {
    pub const ALL: [ReviewMode; 4] = [
        ReviewMode::Normal,
        ReviewMode::NewOnly,
        ReviewMode::TopReview,
        ReviewMode::LeastMastered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewMode::Normal => "normal",
            ReviewMode::NewOnly => "new-only",
            ReviewMode::TopReview => "top-review",
            ReviewMode::LeastMastered => "least-mastered",
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewMode {
    type Err = FlashdeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                FlashdeckError::Api(format!(
                    "Unknown review mode '{}' (expected normal, new-only, top-review or least-mastered)",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub reviewed_count: u32,
    #[serde(default)]
    pub mastered_count: u32,
    #[serde(default)]
    pub is_mastered: bool,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: CardId::generate(),
            question: question.into(),
            answer: answer.into(),
            hint: None,
            code: None,
            formula: None,
            reviewed_count: 0,
            mastered_count: 0,
            is_mastered: false,
            is_favorite: false,
        }
    }

    /// Applies every field the patch carries. Counters are overwritten, not added.
    pub fn apply(&mut self, patch: &CardPatch) {
        if let Some(question) = &patch.question {
            self.question = question.clone();
        }
        if let Some(answer) = &patch.answer {
            self.answer = answer.clone();
        }
        if let Some(hint) = &patch.hint {
            self.hint = hint.clone();
        }
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(formula) = &patch.formula {
            self.formula = formula.clone();
        }
        if let Some(count) = patch.reviewed_count {
            self.reviewed_count = count;
        }
        if let Some(count) = patch.mastered_count {
            self.mastered_count = count;
        }
        if let Some(mastered) = patch.is_mastered {
            self.is_mastered = mastered;
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: SetId,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub review_mode: ReviewMode,
}

impl CardSet {
    pub fn new(id: SetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cards: Vec::new(),
            created_at: Utc::now(),
            review_mode: ReviewMode::Normal,
        }
    }

    pub fn favorites() -> Self {
        Self::new(SetId::favorites(), FAVORITES_SET_NAME)
    }

    pub fn is_favorites(&self) -> bool {
        self.id.is_favorites()
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.iter().any(|c| &c.id == id)
    }

    pub fn mastered_cards(&self) -> usize {
        self.cards.iter().filter(|c| c.is_mastered).count()
    }
}

/// Partial update for a card. `None` leaves a field untouched; for the optional
/// text fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub hint: Option<Option<String>>,
    pub code: Option<Option<String>>,
    pub formula: Option<Option<String>>,
    pub reviewed_count: Option<u32>,
    pub mastered_count: Option<u32>,
    pub is_mastered: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl CardPatch {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &CardPatch::default()
    }

    pub fn touches_counters(&self) -> bool {
        self.reviewed_count.is_some() || self.mastered_count.is_some() || self.is_mastered.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetPatch {
    pub name: Option<String>,
    pub review_mode: Option<ReviewMode>,
}

impl SetPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            review_mode: None,
        }
    }

    pub fn mode(mode: ReviewMode) -> Self {
        Self {
            name: None,
            review_mode: Some(mode),
        }
    }
}

/// Card text as it arrives from outside the engine (generation service, CLI).
/// Progress fields are never supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub question: String,
    pub answer: String,
    pub hint: Option<String>,
    pub code: Option<String>,
    pub formula: Option<String>,
}

impl NewCard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Default::default()
        }
    }

    pub fn into_card(self) -> Card {
        Card {
            hint: self.hint,
            code: self.code,
            formula: self.formula,
            ..Card::new(self.question, self.answer)
        }
    }
}
