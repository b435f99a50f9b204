//! # Command Layer
//!
//! This module contains the **business operations** of flashdeck. Each command lives in
//! its own submodule and is a plain function over the [`Repository`].
//!
//! ## Role and Responsibilities
//!
//! Commands:
//! - Take already-resolved ids (the API layer turns user references into ids)
//! - Mutate or read the repository
//! - Return a structured [`CmdResult`] with affected cards and messages
//!
//! ## What Commands Do NOT Do
//!
//! - **Persistence**: the API layer flushes after every mutation
//! - **Any terminal I/O**: no stdout, stderr, prompts or exit codes
//! - **Reference parsing**: positions and id prefixes are resolved before we get here
//!
//! ## Testing Strategy
//!
//! Commands are tested directly against an in-memory `Repository`; no storage
//! backend is involved.
//!
//! [`Repository`]: crate::repository::Repository

use crate::config::FlashdeckConfig;
use crate::index::{DisplayCard, SetSummary};
use serde::Serialize;
use std::path::PathBuf;

pub mod backup;
pub mod cards;
pub mod config;
pub mod generate;
pub mod review;
pub mod search;
pub mod sets;
pub mod stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Cards that were created or modified by the operation
    pub affected_cards: Vec<DisplayCard>,
    /// Cards to display (listing, search)
    pub listed_cards: Vec<DisplayCard>,
    pub listed_sets: Vec<SetSummary>,
    pub stats: Option<stats::Stats>,
    pub config: Option<FlashdeckConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
    /// Whether the repository changed and needs flushing
    pub mutated: bool,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn mutated() -> Self {
        Self {
            mutated: true,
            ..Default::default()
        }
    }

    pub fn with_affected_cards(mut self, cards: Vec<DisplayCard>) -> Self {
        self.affected_cards = cards;
        self
    }

    pub fn with_listed_cards(mut self, cards: Vec<DisplayCard>) -> Self {
        self.listed_cards = cards;
        self
    }

    pub fn with_listed_sets(mut self, sets: Vec<SetSummary>) -> Self {
        self.listed_sets = sets;
        self
    }

    pub fn with_config(mut self, config: FlashdeckConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}

/// Text edits for a card. Fields left as `None` are untouched; an empty string
/// clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct CardEdit {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub hint: Option<String>,
    pub code: Option<String>,
    pub formula: Option<String>,
}

impl CardEdit {
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.hint.is_none()
            && self.code.is_none()
            && self.formula.is_none()
    }
}
