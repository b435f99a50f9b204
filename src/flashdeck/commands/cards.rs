use crate::commands::{CardEdit, CmdMessage, CmdResult};
use crate::error::{FlashdeckError, Result};
use crate::index::{index_set_cards, DisplayCard};
use crate::model::{CardId, CardPatch, NewCard, SetId};
use crate::repository::Repository;

/// Cards of a set in review order; the active set when none is given.
pub fn list(repo: &Repository, set_id: Option<&SetId>) -> Result<CmdResult> {
    let set = match set_id {
        Some(id) => repo
            .set(id)
            .ok_or_else(|| FlashdeckError::SetNotFound(id.to_string()))?,
        None => repo.active_set().ok_or_else(|| {
            FlashdeckError::Api("No active set; select one with `flashdeck use <set>`".to_string())
        })?,
    };
    let cards = index_set_cards(set);
    let mut result = CmdResult::default();
    if set.cards.is_empty() {
        result.add_message(CmdMessage::info(format!("'{}' has no cards yet", set.name)));
    } else if cards.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No cards in '{}' match the {} review mode",
            set.name, set.review_mode
        )));
    }
    Ok(result.with_listed_cards(cards))
}

pub fn add(repo: &mut Repository, set_id: &SetId, new_cards: Vec<NewCard>) -> Result<CmdResult> {
    let set_name = repo
        .set(set_id)
        .map(|s| s.name.clone())
        .ok_or_else(|| FlashdeckError::SetNotFound(set_id.to_string()))?;

    for new_card in &new_cards {
        if new_card.question.trim().is_empty() || new_card.answer.trim().is_empty() {
            return Err(FlashdeckError::Api(
                "Cards need both a question and an answer".to_string(),
            ));
        }
    }

    let cards: Vec<_> = new_cards.into_iter().map(NewCard::into_card).collect();
    let ids: Vec<CardId> = cards.iter().map(|c| c.id.clone()).collect();
    let added = repo.add_cards(set_id, cards);

    let mut result = CmdResult::mutated().with_affected_cards(display_owned(repo, &ids));
    result.add_message(CmdMessage::success(format!(
        "Added {} card{} to '{}'",
        added,
        if added == 1 { "" } else { "s" },
        set_name
    )));
    Ok(result)
}

pub fn edit(repo: &mut Repository, id: &CardId, edit: CardEdit) -> Result<CmdResult> {
    if repo.find_card(id).is_none() {
        return Err(FlashdeckError::CardNotFound(id.to_string()));
    }
    if edit.is_empty() {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("Nothing to change"));
        return Ok(result);
    }
    if edit.question.as_deref().is_some_and(|q| q.trim().is_empty())
        || edit.answer.as_deref().is_some_and(|a| a.trim().is_empty())
    {
        return Err(FlashdeckError::Api(
            "Question and answer cannot be empty".to_string(),
        ));
    }

    let patch = CardPatch {
        question: edit.question,
        answer: edit.answer,
        hint: edit.hint.map(clear_if_blank),
        code: edit.code.map(clear_if_blank),
        formula: edit.formula.map(clear_if_blank),
        ..Default::default()
    };
    repo.update_card(id, &patch);

    let affected = display_owned(repo, std::slice::from_ref(id));
    let mut result = CmdResult::mutated().with_affected_cards(affected);
    result.add_message(CmdMessage::success(format!("Updated card {}", id.short())));
    Ok(result)
}

pub fn delete(repo: &mut Repository, ids: &[CardId]) -> Result<CmdResult> {
    let affected = display_owned(repo, ids);
    let mut result = CmdResult::mutated();
    for id in ids {
        if !repo.delete_card(id) {
            return Err(FlashdeckError::CardNotFound(id.to_string()));
        }
    }
    for dc in &affected {
        result.add_message(CmdMessage::success(format!(
            "Deleted '{}' from '{}'",
            dc.card.question, dc.set_name
        )));
    }
    Ok(result.with_affected_cards(affected))
}

pub fn favorite(repo: &mut Repository, ids: &[CardId]) -> Result<CmdResult> {
    set_favorite(repo, ids, true)
}

pub fn unfavorite(repo: &mut Repository, ids: &[CardId]) -> Result<CmdResult> {
    set_favorite(repo, ids, false)
}

fn set_favorite(repo: &mut Repository, ids: &[CardId], is_favorite: bool) -> Result<CmdResult> {
    let mut result = CmdResult::mutated();
    for id in ids {
        if !repo.update_card(id, &CardPatch::favorite(is_favorite)) {
            return Err(FlashdeckError::CardNotFound(id.to_string()));
        }
    }

    let affected = display_owned(repo, ids);
    let verb = if is_favorite { "Favorited" } else { "Unfavorited" };
    for dc in &affected {
        result.add_message(CmdMessage::success(format!(
            "{} '{}'",
            verb, dc.card.question
        )));
    }
    Ok(result.with_affected_cards(affected))
}

fn clear_if_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Look cards up by id, reporting the set that owns each one.
pub(crate) fn display_owned(repo: &Repository, ids: &[CardId]) -> Vec<DisplayCard> {
    ids.iter()
        .enumerate()
        .filter_map(|(i, id)| {
            repo.find_card(id)
                .map(|(card, set)| DisplayCard::new(i + 1, card, set))
        })
        .collect()
}
