use crate::commands::{CmdMessage, CmdResult};
use crate::index::DisplayCard;
use crate::repository::Repository;
use crate::search::search;

pub fn run(repo: &Repository, query: &str) -> CmdResult {
    let hits: Vec<DisplayCard> = search(repo.sets(), query)
        .into_iter()
        .enumerate()
        .map(|(i, hit)| DisplayCard::new(i + 1, hit.card, hit.set))
        .collect();

    let mut result = CmdResult::default();
    if query.trim().is_empty() {
        result.add_message(CmdMessage::warning("Empty search query"));
    } else if hits.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No cards match '{}'",
            query.trim()
        )));
    }
    result.with_listed_cards(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, CardPatch};
    use crate::store::mem_backend::fixtures::{card, set_with_cards};

    #[test]
    fn hits_carry_their_set_name() {
        let mut repo = Repository::from_parts(
            vec![
                set_with_cards("s1", "Biology", vec![card("a", "Photosynthesis", 0, 0)]),
                set_with_cards("s2", "Physics", vec![card("b", "Photon", 0, 0)]),
            ],
            None,
            String::new(),
        );
        repo.ensure_favorites();
        repo.update_card(&CardId::new("b"), &CardPatch::favorite(true));

        let result = run(&repo, "photo");
        let found: Vec<_> = result
            .listed_cards
            .iter()
            .map(|dc| (dc.position, dc.set_name.as_str()))
            .collect();
        assert_eq!(found, vec![(1, "Collected"), (2, "Biology"), (3, "Physics")]);
    }

    #[test]
    fn blank_query_warns() {
        let result = run(&Repository::new(), " ");
        assert!(result.listed_cards.is_empty());
        assert!(result.has_warnings());
    }
}
