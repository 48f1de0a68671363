//! Card-set loading
//!
//! A card set is a JSON array of records:
//! `{"type": "Question"|"Answer", "value": "..", "pick": 1, "draw": 0, "source": ".."}`.
//! Every `*.json` file in the configured directory is read and merged into a
//! single deck.

use crate::command::MAX_NUMERIC_ARGS;
use crate::config::Settings;
use crate::deck::Deck;
use crate::types::{Card, CardKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed card file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("card set in {} has no {} cards", .0.display(), .1)]
    Empty(PathBuf, CardKind),

    #[error(
        "prompt {:?} in {} asks for {} cards, must be 1 to {}",
        value,
        path.display(),
        pick,
        MAX_NUMERIC_ARGS
    )]
    BadPick {
        path: PathBuf,
        value: String,
        pick: usize,
    },
}

/// One entry of a card-set file
#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub value: String,
    #[serde(default)]
    pub pick: Option<usize>,
    #[serde(default)]
    pub draw: usize,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "unknown".to_string()
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        let card = Card::new(record.kind, record.value);
        let pick = record
            .pick
            .unwrap_or_else(|| card.blank_count().max(1));
        card.with_pick(pick)
            .with_draw(record.draw)
            .with_source(record.source)
    }
}

/// Supplies a fresh, unshuffled deck whenever a game starts
pub trait CardSource: Send + Sync {
    fn load(&self, settings: &Settings) -> Result<Deck, LoadError>;
}

/// Reads every card file in `settings.card_dir`
#[derive(Debug, Clone, Copy, Default)]
pub struct CardDir;

impl CardSource for CardDir {
    fn load(&self, settings: &Settings) -> Result<Deck, LoadError> {
        load_dir(&settings.card_dir)
    }
}

/// Hands out copies of a fixed list of cards
#[derive(Debug, Clone, Default)]
pub struct FixedCards(pub Vec<Card>);

impl CardSource for FixedCards {
    fn load(&self, _settings: &Settings) -> Result<Deck, LoadError> {
        Ok(Deck::from_cards(self.0.iter().cloned()))
    }
}

/// Parse one card file's contents
pub fn parse_cards(json: &str) -> Result<Vec<Card>, serde_json::Error> {
    let records: Vec<CardRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Card::from).collect())
}

/// Merge every `*.json` file in `dir` into one deck
pub fn load_dir(dir: &Path) -> Result<Deck, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut deck = Deck::new();
    for path in files {
        let json = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let cards = parse_cards(&json).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Loaded {} cards from {}", cards.len(), path.display());
        for card in cards {
            // A play can name at most MAX_NUMERIC_ARGS cards
            let pick = card.pick_count();
            if card.kind() == CardKind::Prompt && !(1..=MAX_NUMERIC_ARGS).contains(&pick) {
                return Err(LoadError::BadPick {
                    path: path.clone(),
                    value: card.text().to_string(),
                    pick,
                });
            }
            deck.add(card);
        }
    }

    for kind in [CardKind::Prompt, CardKind::Response] {
        if deck.remaining(kind) == 0 {
            return Err(LoadError::Empty(dir.to_path_buf(), kind));
        }
    }

    tracing::info!(
        "Card set ready: {} prompts, {} responses",
        deck.remaining(CardKind::Prompt),
        deck.remaining(CardKind::Response)
    );
    Ok(deck)
}
