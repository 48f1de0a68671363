use crate::deck::{Deck, DeckError};
use crate::types::{Card, CardKind, Nick};
use serde::Serialize;

/// A participant, identified by nickname alone.
#[derive(Debug, Clone)]
pub struct Player {
    nick: Nick,
    hand: Deck,
    pub round_wins: u32,
    pub overall_wins: u32,
    pub games_played: u32,
}

/// Score line exposed over the status API
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerStats {
    pub nick: Nick,
    pub round_wins: u32,
    pub overall_wins: u32,
    pub games_played: u32,
    pub hand_size: usize,
}

impl Player {
    pub fn new(nick: impl Into<Nick>) -> Self {
        Self {
            nick: nick.into(),
            hand: Deck::new(),
            round_wins: 0,
            overall_wins: 0,
            games_played: 0,
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.add(card);
    }

    /// Remove and return the hand card at `index`
    pub fn deal(&mut self, index: usize) -> Result<Card, DeckError> {
        self.hand.draw(CardKind::Response, Some(index))
    }

    pub fn hand(&self) -> &[Card] {
        self.hand.cards(CardKind::Response)
    }

    pub fn hand_len(&self) -> usize {
        self.hand.remaining(CardKind::Response)
    }

    /// Drop every card, played or not (a veteran rejoining a new game)
    pub fn clear_hand(&mut self) {
        self.hand = Deck::new();
    }

    pub fn record_round_win(&mut self) {
        self.round_wins += 1;
    }

    /// Roll this game's result into the lifetime counters
    pub fn reset_game_stats(&mut self, won: bool) {
        self.round_wins = 0;
        self.games_played += 1;
        if won {
            self.overall_wins += 1;
        }
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            nick: self.nick.clone(),
            round_wins: self.round_wins,
            overall_wins: self.overall_wins,
            games_played: self.games_played,
            hand_size: self.hand_len(),
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.nick == other.nick
    }
}

impl Eq for Player {}

impl std::hash::Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nick.hash(state);
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, {}/{}]",
            self.nick, self.round_wins, self.overall_wins, self.games_played
        )
    }
}
