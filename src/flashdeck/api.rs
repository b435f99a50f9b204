//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry
//! point for all flashdeck operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the state**: the [`Repository`], the [`Persistence`] adapter and the
//!   study [`ReviewQueue`]
//! - **Normalizes inputs**: positions, names and id prefixes become ids (see [`crate::index`])
//! - **Dispatches** to the appropriate command function
//! - **Flushes** all three records after every successful mutation
//!
//! ## Startup
//!
//! [`FlashdeckApi::open`] probes the store once, hydrates the repository from the
//! three records and materializes the favorites set if sets exist without one. An
//! unavailable store is not an error: the session runs in memory and
//! [`FlashdeckApi::storage_available`] reports it so the UI can warn once.
//!
//! ## Persistence Failures
//!
//! A failed flush never undoes the in-memory change. It is appended to the returned
//! [`CmdResult`] as a warning message.
//!
//! ## Generic Over StorageBackend
//!
//! `FlashdeckApi<B: StorageBackend>` is generic over the storage backend:
//! - Production: `FlashdeckApi<FsBackend>`
//! - Testing: `FlashdeckApi<MemBackend>`

use crate::commands;
use crate::config::FlashdeckConfig;
use crate::error::{FlashdeckError, Result};
use crate::generation::{CardGenerator, GenerationMode, GenerationRequest};
use crate::index::{resolve_card, resolve_cards, resolve_set};
use crate::mastery::MasteryAction;
use crate::model::{Card, NewCard, ReviewMode, SetId};
use crate::ordering::ReviewQueue;
use crate::repository::Repository;
use crate::store::fs_backend::FsBackend;
use crate::store::{Persistence, StorageBackend};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The card under the study cursor.
#[derive(Debug, Clone)]
pub struct StudyCard {
    /// 1-based position in the review order
    pub position: usize,
    pub total: usize,
    pub card: Card,
    pub set_name: String,
}

pub struct FlashdeckApi<B: StorageBackend> {
    persistence: Persistence<B>,
    repo: Repository,
    queue: ReviewQueue,
    data_dir: PathBuf,
    storage_available: bool,
}

impl FlashdeckApi<FsBackend> {
    /// Open the file-backed store under `data_dir`.
    pub fn open_dir(data_dir: PathBuf) -> Self {
        let backend = FsBackend::new(data_dir.clone());
        Self::open(Persistence::new(backend), data_dir)
    }
}

impl<B: StorageBackend> FlashdeckApi<B> {
    pub fn open(persistence: Persistence<B>, data_dir: PathBuf) -> Self {
        let storage_available = persistence.is_available();
        let repo = Repository::from_parts(
            persistence.load_card_sets(),
            persistence.load_current_set().map(|set| set.id),
            persistence.load_credential(),
        );
        debug!(
            "Hydrated {} sets from {}",
            repo.sets().len(),
            persistence.backend().location()
        );

        let mut api = Self {
            persistence,
            repo,
            queue: ReviewQueue::new(),
            data_dir,
            storage_available,
        };

        if api.repo.ensure_favorites() {
            api.repo.rebuild_favorites();
            let mut result = CmdResult::mutated();
            api.flush(&mut result);
            for message in &result.messages {
                warn!("{}", message.content);
            }
        }
        api
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn persistence(&self) -> &Persistence<B> {
        &self.persistence
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_config(&self) -> Result<FlashdeckConfig> {
        FlashdeckConfig::load(&self.data_dir)
    }

    // --- Sets ---

    pub fn list_sets(&self) -> CmdResult {
        commands::sets::list(&self.repo)
    }

    pub fn create_set(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::sets::create(&mut self.repo, name)?;
        Ok(self.commit(result))
    }

    pub fn use_set(&mut self, set: &str) -> Result<CmdResult> {
        let id = resolve_set(&self.repo, set)?;
        let result = commands::sets::select(&mut self.repo, &id)?;
        Ok(self.commit(result))
    }

    pub fn rename_set(&mut self, set: &str, name: &str) -> Result<CmdResult> {
        let id = resolve_set(&self.repo, set)?;
        let result = commands::sets::rename(&mut self.repo, &id, name)?;
        Ok(self.commit(result))
    }

    pub fn set_review_mode(&mut self, set: &str, mode: ReviewMode) -> Result<CmdResult> {
        let id = resolve_set(&self.repo, set)?;
        let result = commands::sets::set_mode(&mut self.repo, &id, mode)?;
        Ok(self.commit(result))
    }

    pub fn delete_set(&mut self, set: &str) -> Result<CmdResult> {
        let id = resolve_set(&self.repo, set)?;
        let result = commands::sets::delete(&mut self.repo, &id)?;
        Ok(self.commit(result))
    }

    // --- Cards ---

    pub fn list_cards(&self, set: Option<&str>) -> Result<CmdResult> {
        let id = set.map(|s| resolve_set(&self.repo, s)).transpose()?;
        commands::cards::list(&self.repo, id.as_ref())
    }

    /// Add a card to the given set, or to the active set.
    pub fn add_card(&mut self, card: NewCard, set: Option<&str>) -> Result<CmdResult> {
        let id = self.target_set(set)?;
        let result = commands::cards::add(&mut self.repo, &id, vec![card])?;
        Ok(self.commit(result))
    }

    pub fn edit_card(&mut self, card: &str, edit: CardEdit) -> Result<CmdResult> {
        let id = resolve_card(&self.repo, card)?;
        let result = commands::cards::edit(&mut self.repo, &id, edit)?;
        Ok(self.commit(result))
    }

    pub fn delete_cards<I: AsRef<str>>(&mut self, cards: &[I]) -> Result<CmdResult> {
        let ids = resolve_cards(&self.repo, cards)?;
        let result = commands::cards::delete(&mut self.repo, &ids)?;
        Ok(self.commit(result))
    }

    pub fn favorite_cards<I: AsRef<str>>(&mut self, cards: &[I]) -> Result<CmdResult> {
        let ids = resolve_cards(&self.repo, cards)?;
        let result = commands::cards::favorite(&mut self.repo, &ids)?;
        Ok(self.commit(result))
    }

    pub fn unfavorite_cards<I: AsRef<str>>(&mut self, cards: &[I]) -> Result<CmdResult> {
        let ids = resolve_cards(&self.repo, cards)?;
        let result = commands::cards::unfavorite(&mut self.repo, &ids)?;
        Ok(self.commit(result))
    }

    pub fn record<I: AsRef<str>>(&mut self, cards: &[I], action: MasteryAction) -> Result<CmdResult> {
        let ids = resolve_cards(&self.repo, cards)?;
        let result = commands::review::run(&mut self.repo, &ids, action)?;
        Ok(self.commit(result))
    }

    pub fn search(&self, query: &str) -> CmdResult {
        commands::search::run(&self.repo, query)
    }

    pub fn stats(&self) -> CmdResult {
        commands::stats::run(&self.repo)
    }

    // --- Generation ---

    /// Generate cards into the active set. Count and mode fall back to the config.
    pub fn generate<G: CardGenerator + ?Sized>(
        &mut self,
        prompt: &str,
        count: Option<u32>,
        mode: Option<GenerationMode>,
        generator: &G,
    ) -> Result<CmdResult> {
        let config = self.load_config()?;
        let id = self.target_set(None)?;
        let request = GenerationRequest::new(
            prompt.trim(),
            count.unwrap_or(config.default_card_count),
            mode.unwrap_or(config.default_mode),
        );
        let result = commands::generate::run(&mut self.repo, &id, &request, generator)?;
        Ok(self.commit(result))
    }

    pub fn set_credential(&mut self, credential: &str) -> CmdResult {
        let credential = credential.trim();
        self.repo.set_credential(credential);
        let mut result = CmdResult::mutated();
        result.add_message(if credential.is_empty() {
            CmdMessage::success("Generation credential removed")
        } else {
            CmdMessage::success("Generation credential saved")
        });
        self.commit(result)
    }

    // --- Backup ---

    pub fn export(&self, target: &Path) -> Result<CmdResult> {
        commands::backup::export(&self.repo, target)
    }

    pub fn import(&mut self, path: &Path) -> Result<CmdResult> {
        let result = commands::backup::import_file(&mut self.repo, path)?;
        self.queue.reset();
        Ok(self.commit(result))
    }

    pub fn clear(&mut self) -> Result<CmdResult> {
        let result = commands::backup::clear(&mut self.repo, &self.persistence)?;
        self.queue.reset();
        Ok(result)
    }

    pub fn config(&self, action: commands::config::ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.data_dir, action)
    }

    // --- Study session ---

    /// The card under the cursor, recomputing the order if anything changed.
    pub fn study_card(&mut self) -> Option<StudyCard> {
        let Some(set) = self.repo.active_set() else {
            self.queue.reset();
            return None;
        };
        self.queue.refresh(set);
        let idx = self.queue.current()?;
        Some(StudyCard {
            position: self.queue.position() + 1,
            total: self.queue.len(),
            card: set.cards[idx].clone(),
            set_name: set.name.clone(),
        })
    }

    pub fn study_next(&mut self) -> bool {
        if let Some(set) = self.repo.active_set() {
            self.queue.refresh(set);
        }
        self.queue.advance()
    }

    pub fn study_previous(&mut self) -> bool {
        if let Some(set) = self.repo.active_set() {
            self.queue.refresh(set);
        }
        self.queue.retreat()
    }

    /// Apply an action to the card under the cursor. Marking a card mastered moves
    /// on to the card that followed it before the action, wherever the reordering
    /// put it; on the last card the cursor stays with the mastered card. Reviewing
    /// keeps the cursor on the same card.
    pub fn study_act(&mut self, action: MasteryAction) -> Result<CmdResult> {
        let current = self
            .study_card()
            .ok_or_else(|| FlashdeckError::Api("No card to study".to_string()))?;
        let upcoming = self.repo.active_set().and_then(|set| {
            self.queue
                .upcoming()
                .and_then(|idx| set.cards.get(idx))
                .map(|card| card.id.clone())
        });

        let result = commands::review::run(
            &mut self.repo,
            std::slice::from_ref(&current.card.id),
            action,
        )?;
        let result = self.commit(result);

        let target = match action {
            MasteryAction::Mastered => upcoming.unwrap_or_else(|| current.card.id.clone()),
            MasteryAction::Reviewed => current.card.id.clone(),
        };
        if let Some(set) = self.repo.active_set() {
            self.queue.refresh(set);
            if !self.queue.focus(set, &target) {
                debug!("Study cursor lost card {}, keeping clamped position", target);
            }
        }
        Ok(result)
    }

    // --- Internals ---

    fn target_set(&self, set: Option<&str>) -> Result<SetId> {
        match set {
            Some(reference) => resolve_set(&self.repo, reference),
            None => self.repo.active_set_id().cloned().ok_or_else(|| {
                FlashdeckError::Api(
                    "No active set; create one with `flashdeck new` or pick one with `flashdeck use`"
                        .to_string(),
                )
            }),
        }
    }

    fn commit(&mut self, mut result: CmdResult) -> CmdResult {
        if result.mutated {
            self.queue.invalidate();
            self.flush(&mut result);
        }
        result
    }

    /// Write all three records. Failures become warnings on the result.
    fn flush(&self, result: &mut CmdResult) {
        if !self.storage_available {
            return;
        }
        let outcomes = [
            self.persistence.save_card_sets(self.repo.sets()),
            self.persistence.save_current_set(self.repo.active_set()),
            self.persistence.save_credential(self.repo.credential()),
        ];
        for outcome in outcomes {
            if let Err(e) = outcome {
                result.add_message(CmdMessage::warning(format!(
                    "Change kept for this session but not saved: {}",
                    e
                )));
            }
        }
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CardEdit, CmdMessage, CmdResult, MessageLevel};
