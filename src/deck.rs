//! Card pools
//!
//! A deck keeps two independent pools (prompts and responses) and a matching
//! "dealt" pool for each. Drawing moves a card from its pool to the dealt
//! pool, so every card the deck was given sits in exactly one of the two.

use crate::types::{Card, CardKind};
use rand::seq::SliceRandom;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("no more {kind} cards")]
    NoMoreCards { kind: CardKind },

    #[error("card index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no dealt {kind} card to put back")]
    NothingToUndo { kind: CardKind },
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    prompts: Vec<Card>,
    responses: Vec<Card>,
    dealt_prompts: Vec<Card>,
    dealt_responses: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut deck = Self::new();
        for card in cards {
            deck.add(card);
        }
        deck
    }

    /// Append a card to the pool matching its kind
    pub fn add(&mut self, card: Card) {
        self.pool_mut(card.kind()).push(card);
    }

    /// Take a card out of the pool, from the end or at `index`
    pub fn draw(&mut self, kind: CardKind, index: Option<usize>) -> Result<Card, DeckError> {
        let pool = self.pool_mut(kind);
        if pool.is_empty() {
            return Err(DeckError::NoMoreCards { kind });
        }

        let card = match index {
            None => pool.pop().ok_or(DeckError::NoMoreCards { kind })?,
            Some(index) if index < pool.len() => pool.remove(index),
            Some(index) => {
                return Err(DeckError::IndexOutOfRange {
                    index,
                    len: pool.len(),
                })
            }
        };

        self.dealt_mut(kind).push(card.clone());
        Ok(card)
    }

    /// Move the most recently dealt card of `kind` back into its pool
    pub fn undo_last_draw(&mut self, kind: CardKind) -> Result<(), DeckError> {
        let card = self
            .dealt_mut(kind)
            .pop()
            .ok_or(DeckError::NothingToUndo { kind })?;
        self.pool_mut(kind).push(card);
        Ok(())
    }

    /// Shuffle both pools independently
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.prompts.shuffle(&mut rng);
        self.responses.shuffle(&mut rng);
    }

    /// Return every dealt card to its pool. Does not shuffle.
    pub fn reset(&mut self) {
        let dealt = std::mem::take(&mut self.dealt_prompts);
        self.prompts.extend(dealt);
        let dealt = std::mem::take(&mut self.dealt_responses);
        self.responses.extend(dealt);
    }

    /// Cards still available in both pools (dealt cards don't count)
    pub fn len(&self) -> usize {
        self.prompts.len() + self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self, kind: CardKind) -> usize {
        self.pool(kind).len()
    }

    pub fn cards(&self, kind: CardKind) -> &[Card] {
        self.pool(kind)
    }

    pub fn dealt(&self, kind: CardKind) -> &[Card] {
        match kind {
            CardKind::Prompt => &self.dealt_prompts,
            CardKind::Response => &self.dealt_responses,
        }
    }

    fn pool(&self, kind: CardKind) -> &Vec<Card> {
        match kind {
            CardKind::Prompt => &self.prompts,
            CardKind::Response => &self.responses,
        }
    }

    fn pool_mut(&mut self, kind: CardKind) -> &mut Vec<Card> {
        match kind {
            CardKind::Prompt => &mut self.prompts,
            CardKind::Response => &mut self.responses,
        }
    }

    fn dealt_mut(&mut self, kind: CardKind) -> &mut Vec<Card> {
        match kind {
            CardKind::Prompt => &mut self.dealt_prompts,
            CardKind::Response => &mut self.dealt_responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_responses(n: usize) -> Vec<Card> {
        (0..n).map(|i| Card::response(format!("Card {}", i))).collect()
    }

    #[test]
    fn test_new_deck_is_empty() {
        let deck = Deck::new();
        assert!(deck.is_empty());
        assert!(deck.dealt(CardKind::Prompt).is_empty());
        assert!(deck.dealt(CardKind::Response).is_empty());
    }

    #[test]
    fn test_response_only_deck_has_no_prompts() {
        let mut deck = Deck::from_cards(numbered_responses(1));
        assert_eq!(
            deck.draw(CardKind::Prompt, None),
            Err(DeckError::NoMoreCards {
                kind: CardKind::Prompt
            })
        );
        assert_eq!(deck.draw(CardKind::Response, None).unwrap().text(), "Card 0");
    }

    #[test]
    fn test_draw_moves_card_to_dealt_pool() {
        let mut deck = Deck::from_cards(vec![Card::prompt("Test card")]);
        let card = deck.draw(CardKind::Prompt, None).unwrap();
        assert_eq!(card.text(), "Test card");
        assert_eq!(deck.remaining(CardKind::Prompt), 0);
        assert_eq!(deck.dealt(CardKind::Prompt), &[card]);
    }

    #[test]
    fn test_draw_from_emptied_pool_fails() {
        let mut deck = Deck::from_cards(vec![Card::prompt("Only one")]);
        deck.draw(CardKind::Prompt, None).unwrap();
        assert!(matches!(
            deck.draw(CardKind::Prompt, None),
            Err(DeckError::NoMoreCards { .. })
        ));
    }

    #[test]
    fn test_draw_defaults_to_last_card() {
        let mut deck = Deck::from_cards(numbered_responses(4));
        assert_eq!(deck.draw(CardKind::Response, None).unwrap().text(), "Card 3");
    }

    #[test]
    fn test_draw_at_index() {
        let mut deck = Deck::from_cards(numbered_responses(4));
        assert_eq!(
            deck.draw(CardKind::Response, Some(2)).unwrap().text(),
            "Card 2"
        );
        assert_eq!(
            deck.draw(CardKind::Response, Some(9)),
            Err(DeckError::IndexOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_undo_last_draw_restores_card() {
        let mut deck = Deck::from_cards(numbered_responses(3));
        deck.draw(CardKind::Response, Some(0)).unwrap();
        deck.undo_last_draw(CardKind::Response).unwrap();
        assert_eq!(deck.remaining(CardKind::Response), 3);
        assert!(deck.dealt(CardKind::Response).is_empty());
        assert!(deck
            .cards(CardKind::Response)
            .iter()
            .any(|c| c.text() == "Card 0"));

        assert_eq!(
            deck.undo_last_draw(CardKind::Response),
            Err(DeckError::NothingToUndo {
                kind: CardKind::Response
            })
        );
    }

    #[test]
    fn test_partition_invariant_holds() {
        let mut cards = numbered_responses(6);
        cards.push(Card::prompt("%s?"));
        cards.push(Card::prompt("Why %s?"));
        let mut deck = Deck::from_cards(cards);

        deck.draw(CardKind::Response, None).unwrap();
        deck.draw(CardKind::Response, Some(1)).unwrap();
        deck.undo_last_draw(CardKind::Response).unwrap();
        deck.draw(CardKind::Prompt, None).unwrap();

        for kind in [CardKind::Prompt, CardKind::Response] {
            let total = deck.remaining(kind) + deck.dealt(kind).len();
            let expected = if kind == CardKind::Prompt { 2 } else { 6 };
            assert_eq!(total, expected);
            for card in deck.dealt(kind) {
                assert!(!deck.cards(kind).contains(card));
            }
        }
    }

    #[test]
    fn test_len_counts_only_pools() {
        let mut cards = numbered_responses(4);
        cards.push(Card::prompt("%s"));
        let mut deck = Deck::from_cards(cards);
        assert_eq!(deck.len(), 5);
        deck.draw(CardKind::Response, None).unwrap();
        assert_eq!(deck.len(), 4);
    }

    #[test]
    fn test_reset_returns_dealt_cards() {
        let mut deck = Deck::from_cards(numbered_responses(4));
        deck.draw(CardKind::Response, None).unwrap();
        deck.draw(CardKind::Response, None).unwrap();
        deck.reset();

        let mut texts: Vec<_> = deck
            .cards(CardKind::Response)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["Card 0", "Card 1", "Card 2", "Card 3"]);
        assert!(deck.dealt(CardKind::Response).is_empty());
    }

    #[test]
    fn test_shuffle_keeps_every_card() {
        let mut deck = Deck::from_cards(numbered_responses(20));
        deck.shuffle();
        assert_eq!(deck.remaining(CardKind::Response), 20);
        for i in 0..20 {
            let text = format!("Card {}", i);
            assert!(deck.cards(CardKind::Response).iter().any(|c| c.text() == text));
        }
    }
}
