use crate::backup::BackupDocument;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FlashdeckError, Result};
use crate::repository::Repository;
use crate::store::{Persistence, StorageBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a backup of everything. A directory target gets the dated default
/// file name; any other path is used as is.
pub fn export(repo: &Repository, target: &Path) -> Result<CmdResult> {
    let doc = BackupDocument::capture(repo);
    let path: PathBuf = if target.is_dir() {
        target.join(doc.default_filename())
    } else {
        target.to_path_buf()
    };

    fs::write(&path, doc.to_json_pretty()?).map_err(FlashdeckError::Io)?;
    info!("Exported backup to {}", path.display());

    let mut result = CmdResult::default().with_paths(vec![path.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Exported {} sets ({} cards) to {}",
        doc.card_sets.len(),
        doc.card_count(),
        path.display()
    )));
    Ok(result)
}

pub fn import_file(repo: &mut Repository, path: &Path) -> Result<CmdResult> {
    let text = fs::read_to_string(path).map_err(FlashdeckError::Io)?;
    import(repo, &text)
}

/// Replace the whole collection with a backup. The document is validated
/// before anything changes.
pub fn import(repo: &mut Repository, text: &str) -> Result<CmdResult> {
    let doc = BackupDocument::parse(text)?;
    let card_count = doc.card_count();
    let set_count = doc.card_sets.len();

    repo.import_all(doc.card_sets);
    repo.ensure_favorites();
    repo.rebuild_favorites();

    if let Some(current) = doc.current_set {
        if !repo.set_active(&current.id) {
            repo.clear_active();
        }
    }
    if let Some(credential) = doc.credential.filter(|c| !c.is_empty()) {
        repo.set_credential(credential);
    }

    let mut result = CmdResult::mutated();
    result.add_message(CmdMessage::success(format!(
        "Imported {} sets ({} cards)",
        set_count, card_count
    )));
    if let Some(version) = doc.version.filter(|v| v != crate::backup::BACKUP_VERSION) {
        result.add_message(CmdMessage::warning(format!(
            "Backup was written by format version {}",
            version
        )));
    }
    Ok(result)
}

/// Forget every set, the active set and the credential, in memory and on disk.
pub fn clear<B: StorageBackend>(
    repo: &mut Repository,
    persistence: &Persistence<B>,
) -> Result<CmdResult> {
    *repo = Repository::new();
    let mut result = CmdResult::default();
    match persistence.clear_all() {
        Ok(()) => result.add_message(CmdMessage::success("All data cleared")),
        Err(e) => result.add_message(CmdMessage::warning(format!(
            "Cleared in memory, but stored data could not be removed: {}",
            e
        ))),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, SetId};
    use crate::store::mem_backend::fixtures::{card, set_with_cards};
    use crate::store::mem_backend::MemBackend;

    fn repo() -> Repository {
        let mut starred = card("f", "Starred", 1, 0);
        starred.is_favorite = true;
        let mut repo = Repository::from_parts(
            vec![set_with_cards(
                "s1",
                "Biology",
                vec![card("a", "Cell", 0, 0), starred],
            )],
            Some(SetId::new("s1")),
            "secret".into(),
        );
        repo.ensure_favorites();
        repo.rebuild_favorites();
        repo
    }

    #[test]
    fn export_then_import_restores_everything() {
        let dir = tempfile::tempdir().unwrap();
        let original = repo();
        let result = export(&original, dir.path()).unwrap();
        let path = &result.paths[0];
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("flashdeck-backup-"));

        let mut restored = Repository::new();
        import_file(&mut restored, path).unwrap();

        assert_eq!(restored.sets(), original.sets());
        assert_eq!(restored.active_set_id(), Some(&SetId::new("s1")));
        assert_eq!(restored.credential(), "secret");
    }

    #[test]
    fn export_to_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mine.json");
        export(&repo(), &target).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn malformed_backup_leaves_repository_untouched() {
        let mut repo = repo();
        let before = repo.clone();

        for text in ["not json", r#"{"cardSets": "nope"}"#, r#"{"version": "1.0"}"#] {
            assert!(matches!(
                import(&mut repo, text),
                Err(FlashdeckError::Format(_))
            ));
            assert_eq!(repo, before);
        }
    }

    #[test]
    fn import_rebuilds_favorites_mirror() {
        let mut repo = Repository::new();
        let text = r#"{
            "cardSets": [{
                "id": "1700000000000",
                "name": "Legacy",
                "createdAt": "2024-01-05T10:00:00.000Z",
                "cards": [{"id": "1700000000001", "question": "Q", "answer": "A", "isFavorite": true}]
            }],
            "currentSet": null,
            "apiKey": "legacy-key",
            "version": "1.0"
        }"#;

        import(&mut repo, text).unwrap();

        assert!(repo.sets()[0].is_favorites());
        assert!(repo
            .favorites()
            .unwrap()
            .contains(&CardId::new("1700000000001")));
        assert_eq!(repo.credential(), "legacy-key");
        assert!(repo.active_set().is_none());
    }

    #[test]
    fn import_with_stale_current_set_clears_active() {
        let mut repo = repo();
        let text = r#"{
            "cardSets": [],
            "currentSet": {"id": "gone", "name": "Gone", "createdAt": "2024-01-05T10:00:00Z"}
        }"#;
        import(&mut repo, text).unwrap();
        assert!(repo.is_empty());
        assert!(repo.active_set().is_none());
        assert_eq!(repo.credential(), "secret");
    }

    #[test]
    fn clear_wipes_memory_and_records() {
        let persistence = Persistence::new(MemBackend::new());
        let mut repo = repo();
        persistence.save_card_sets(repo.sets()).unwrap();
        persistence.save_credential(repo.credential()).unwrap();

        clear(&mut repo, &persistence).unwrap();

        assert!(repo.is_empty());
        assert_eq!(repo.credential(), "");
        assert_eq!(persistence.backend().record_count(), 0);
    }
}
