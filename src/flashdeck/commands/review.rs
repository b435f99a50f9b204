use crate::commands::cards::display_owned;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FlashdeckError, Result};
use crate::mastery::{state_of, transition, MasteryAction, MasteryState, MASTERY_THRESHOLD};
use crate::model::CardId;
use crate::repository::Repository;

/// Record a learner action on each card. The patch goes through
/// `Repository::update_card`, so the favorites copy moves in step.
pub fn run(repo: &mut Repository, ids: &[CardId], action: MasteryAction) -> Result<CmdResult> {
    let mut result = CmdResult::mutated();

    for id in ids {
        let Some((card, _)) = repo.find_card(id) else {
            return Err(FlashdeckError::CardNotFound(id.to_string()));
        };
        let was = state_of(card);
        let patch = transition(card, action);
        repo.update_card(id, &patch);

        if let Some((card, _)) = repo.find_card(id) {
            let now = state_of(card);
            let message = match (action, was, now) {
                (MasteryAction::Mastered, before, MasteryState::Mastered)
                    if before != MasteryState::Mastered =>
                {
                    CmdMessage::success(format!("Mastered '{}'", card.question))
                }
                (MasteryAction::Mastered, _, _) => CmdMessage::info(format!(
                    "'{}' mastered {}/{} times",
                    card.question,
                    card.mastered_count,
                    MASTERY_THRESHOLD
                )),
                (MasteryAction::Reviewed, _, _) => CmdMessage::info(format!(
                    "'{}' reviewed {} time{}",
                    card.question,
                    card.reviewed_count,
                    if card.reviewed_count == 1 { "" } else { "s" }
                )),
            };
            result.add_message(message);
        }
    }

    Ok(result.with_affected_cards(display_owned(repo, ids)))
}
