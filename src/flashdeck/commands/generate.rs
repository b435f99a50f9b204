use crate::commands::cards::display_owned;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FlashdeckError, Result};
use crate::generation::{CardGenerator, GenerationRequest};
use crate::model::{CardId, NewCard, SetId};
use crate::repository::Repository;
use tracing::debug;

/// Ask the generator for cards and append them to the set. Nothing is added
/// unless the whole response is valid.
pub fn run<G: CardGenerator + ?Sized>(
    repo: &mut Repository,
    set_id: &SetId,
    request: &GenerationRequest,
    generator: &G,
) -> Result<CmdResult> {
    if request.prompt.trim().is_empty() {
        return Err(FlashdeckError::Api("Prompt cannot be empty".to_string()));
    }
    if request.number_of_cards == 0 {
        return Err(FlashdeckError::Api(
            "Number of cards must be at least 1".to_string(),
        ));
    }
    if repo.credential().is_empty() {
        return Err(FlashdeckError::MissingCredential);
    }
    let set_name = repo
        .set(set_id)
        .map(|s| s.name.clone())
        .ok_or_else(|| FlashdeckError::SetNotFound(set_id.to_string()))?;

    let generated = generator.generate(request, repo.credential())?;
    debug!("Generator returned {} cards", generated.len());

    let cards: Vec<_> = generated.into_iter().map(NewCard::into_card).collect();
    let ids: Vec<CardId> = cards.iter().map(|c| c.id.clone()).collect();
    let added = repo.add_cards(set_id, cards);

    let mut result = CmdResult::mutated().with_affected_cards(display_owned(repo, &ids));
    if added == 0 {
        result.add_message(CmdMessage::warning("The generator returned no cards"));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Generated {} {} card{} for '{}'",
            added,
            request.mode,
            if added == 1 { "" } else { "s" },
            set_name
        )));
    }
    if added < request.number_of_cards as usize && added > 0 {
        result.add_message(CmdMessage::info(format!(
            "Asked for {}, received {}",
            request.number_of_cards, added
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationMode;
    use crate::store::mem_backend::fixtures::set_with_cards;
    use std::cell::RefCell;

    /// Returns canned cards (or an error) and records what it was asked.
    struct StubGenerator {
        response: Option<Vec<NewCard>>,
        calls: RefCell<Vec<(GenerationRequest, String)>>,
    }

    impl StubGenerator {
        fn returning(cards: Vec<NewCard>) -> Self {
            Self {
                response: Some(cards),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CardGenerator for StubGenerator {
        fn generate(&self, request: &GenerationRequest, credential: &str) -> Result<Vec<NewCard>> {
            self.calls
                .borrow_mut()
                .push((request.clone(), credential.to_string()));
            self.response
                .clone()
                .ok_or_else(|| FlashdeckError::Generation("service unavailable".to_string()))
        }
    }

    fn repo(credential: &str) -> Repository {
        Repository::from_parts(
            vec![set_with_cards("s1", "Chemistry", vec![])],
            Some(SetId::new("s1")),
            credential.to_string(),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Acids and bases", 2, GenerationMode::Formula)
    }

    #[test]
    fn generated_cards_are_appended_with_fresh_progress() {
        let mut repo = repo("key-123");
        let mut with_formula = NewCard::new("pH of water?", "7");
        with_formula.formula = Some("pH = -log[H+]".into());
        let generator = StubGenerator::returning(vec![with_formula, NewCard::new("Base?", "OH-")]);

        let result = run(&mut repo, &SetId::new("s1"), &request(), &generator).unwrap();

        let set = repo.set(&SetId::new("s1")).unwrap();
        assert_eq!(set.cards.len(), 2);
        assert_eq!(set.cards[0].formula.as_deref(), Some("pH = -log[H+]"));
        assert!(set.cards.iter().all(|c| c.reviewed_count == 0 && !c.is_favorite));
        assert_ne!(set.cards[0].id, set.cards[1].id);
        assert_eq!(result.affected_cards.len(), 2);

        let calls = generator.calls.borrow();
        assert_eq!(calls[0].0, request());
        assert_eq!(calls[0].1, "key-123");
    }

    #[test]
    fn generator_failure_commits_nothing() {
        let mut repo = repo("key-123");
        let before = repo.clone();
        let err = run(&mut repo, &SetId::new("s1"), &request(), &StubGenerator::failing());
        assert!(matches!(err, Err(FlashdeckError::Generation(_))));
        assert_eq!(repo, before);
    }

    #[test]
    fn missing_credential_is_rejected_before_calling_out() {
        let mut repo = repo("");
        let generator = StubGenerator::returning(vec![]);
        let err = run(&mut repo, &SetId::new("s1"), &request(), &generator);
        assert!(matches!(err, Err(FlashdeckError::MissingCredential)));
        assert!(generator.calls.borrow().is_empty());
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let mut repo = repo("key");
        let generator = StubGenerator::returning(vec![]);
        let blank = GenerationRequest::new("  ", 3, GenerationMode::Basic);
        assert!(matches!(
            run(&mut repo, &SetId::new("s1"), &blank, &generator),
            Err(FlashdeckError::Api(_))
        ));
    }

    #[test]
    fn empty_response_warns() {
        let mut repo = repo("key");
        let result = run(
            &mut repo,
            &SetId::new("s1"),
            &request(),
            &StubGenerator::returning(vec![]),
        )
        .unwrap();
        assert!(result.has_warnings());
    }
}
