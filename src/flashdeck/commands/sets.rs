use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FlashdeckError, Result};
use crate::index::summarize_sets;
use crate::model::{ReviewMode, SetId, SetPatch};
use crate::repository::Repository;

pub fn list(repo: &Repository) -> CmdResult {
    let mut result = CmdResult::default().with_listed_sets(summarize_sets(repo));
    if repo.is_empty() {
        result.add_message(CmdMessage::info(
            "No card sets yet. Create one with `flashdeck new <name>`.",
        ));
    }
    result
}

pub fn create(repo: &mut Repository, name: &str) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FlashdeckError::Api("Set name cannot be empty".to_string()));
    }

    repo.create_set(name);
    let mut result = CmdResult::mutated().with_listed_sets(summarize_sets(repo));
    result.add_message(CmdMessage::success(format!(
        "Created set '{}' and made it active",
        name
    )));
    Ok(result)
}

pub fn select(repo: &mut Repository, id: &SetId) -> Result<CmdResult> {
    if !repo.set_active(id) {
        return Err(FlashdeckError::SetNotFound(id.to_string()));
    }
    let name = repo.active_set().map(|s| s.name.clone()).unwrap_or_default();
    let mut result = CmdResult::mutated();
    result.add_message(CmdMessage::success(format!("Now studying '{}'", name)));
    Ok(result)
}

pub fn rename(repo: &mut Repository, id: &SetId, name: &str) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FlashdeckError::Api("Set name cannot be empty".to_string()));
    }
    let old = repo
        .set(id)
        .map(|s| s.name.clone())
        .ok_or_else(|| FlashdeckError::SetNotFound(id.to_string()))?;

    repo.update_set(id, &SetPatch::rename(name));
    let mut result = CmdResult::mutated();
    result.add_message(CmdMessage::success(format!(
        "Renamed '{}' to '{}'",
        old, name
    )));
    Ok(result)
}

pub fn set_mode(repo: &mut Repository, id: &SetId, mode: ReviewMode) -> Result<CmdResult> {
    let name = repo
        .set(id)
        .map(|s| s.name.clone())
        .ok_or_else(|| FlashdeckError::SetNotFound(id.to_string()))?;

    repo.update_set(id, &SetPatch::mode(mode));
    let mut result = CmdResult::mutated();
    result.add_message(CmdMessage::success(format!(
        "Review mode for '{}' is now {}",
        name, mode
    )));
    Ok(result)
}

pub fn delete(repo: &mut Repository, id: &SetId) -> Result<CmdResult> {
    let set = repo
        .set(id)
        .cloned()
        .ok_or_else(|| FlashdeckError::SetNotFound(id.to_string()))?;

    repo.delete_set(id);
    let mut result = CmdResult::mutated();
    result.add_message(CmdMessage::success(format!(
        "Deleted set '{}' ({} cards)",
        set.name,
        set.cards.len()
    )));
    if set.is_favorites() {
        result.add_message(CmdMessage::info(
            "The favorites set comes back the next time a card is favorited",
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::fixtures::{card, set_with_cards};

    fn repo() -> Repository {
        Repository::from_parts(
            vec![set_with_cards("s1", "Biology", vec![card("a", "A", 0, 0)])],
            Some(SetId::new("s1")),
            String::new(),
        )
    }

    #[test]
    fn create_makes_set_active() {
        let mut repo = Repository::new();
        let result = create(&mut repo, "  Spanish ").unwrap();

        assert!(result.mutated);
        assert_eq!(repo.active_set().unwrap().name, "Spanish");
        assert_eq!(result.listed_sets.len(), 2);
        assert!(result.listed_sets[1].is_active);
    }

    #[test]
    fn create_rejects_blank_names() {
        let mut repo = Repository::new();
        assert!(create(&mut repo, "   ").is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn empty_listing_has_a_hint() {
        let result = list(&Repository::new());
        assert!(result.listed_sets.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn rename_and_mode_update_the_set() {
        let mut repo = repo();
        let id = SetId::new("s1");
        rename(&mut repo, &id, "Bio").unwrap();
        set_mode(&mut repo, &id, ReviewMode::NewOnly).unwrap();

        let set = repo.active_set().unwrap();
        assert_eq!(set.name, "Bio");
        assert_eq!(set.review_mode, ReviewMode::NewOnly);
    }

    #[test]
    fn unknown_sets_are_reported() {
        let mut repo = repo();
        let missing = SetId::new("nope");
        assert!(matches!(
            select(&mut repo, &missing),
            Err(FlashdeckError::SetNotFound(_))
        ));
        assert!(rename(&mut repo, &missing, "x").is_err());
        assert!(delete(&mut repo, &missing).is_err());
    }

    #[test]
    fn deleting_active_set_clears_it() {
        let mut repo = repo();
        let result = delete(&mut repo, &SetId::new("s1")).unwrap();
        assert!(repo.active_set().is_none());
        assert!(result.messages[0].content.contains("1 cards"));
    }
}
