use serde::{Deserialize, Serialize};

/// Nicknames are the only player identity the chat layer gives us
pub type Nick = String;

/// Marker embedded in prompt text wherever an answer goes
pub const BLANK_MARKER: &str = "%s";

/// What a blank looks like when shown in chat
pub const BLANK_GLYPH: &str = "___";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    /// Fill-in-the-blank card dealt once per round ("Question" in card files)
    #[serde(rename = "Question")]
    Prompt,
    /// Card held in hands and played into a prompt ("Answer" in card files)
    #[serde(rename = "Answer")]
    Response,
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardKind::Prompt => write!(f, "Prompt"),
            CardKind::Response => write!(f, "Response"),
        }
    }
}

/// A single prompt or response card. Fields are private so a card cannot
/// change once the loader has built it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Card {
    kind: CardKind,
    text: String,
    blank_count: usize,
    pick_count: usize,
    draw_count: usize,
    source: String,
}

impl Card {
    pub fn new(kind: CardKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let blank_count = text.matches(BLANK_MARKER).count();
        Self {
            kind,
            text,
            blank_count,
            pick_count: 1,
            draw_count: 0,
            source: "unknown".to_string(),
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        let card = Self::new(CardKind::Prompt, text);
        let pick = card.blank_count.max(1);
        card.with_pick(pick)
    }

    pub fn response(text: impl Into<String>) -> Self {
        Self::new(CardKind::Response, text)
    }

    pub fn with_pick(mut self, pick_count: usize) -> Self {
        self.pick_count = pick_count;
        self
    }

    pub fn with_draw(mut self, draw_count: usize) -> Self {
        self.draw_count = draw_count;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blank_count(&self) -> usize {
        self.blank_count
    }

    pub fn pick_count(&self) -> usize {
        self.pick_count
    }

    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text with every blank marker replaced by a visible placeholder
    pub fn formatted_text(&self) -> String {
        self.text.replace(BLANK_MARKER, BLANK_GLYPH)
    }

    /// One-line description used in logs
    pub fn info(&self) -> String {
        format!(
            "[{}] {}: {} (pick {} draw {})",
            self.source, self.kind, self.text, self.pick_count, self.draw_count
        )
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Inactive,
    WaitingForPlayers,
    WaitingForAnswers,
    WaitingForJudge,
}

/// Where an outbound line goes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// The shared game channel
    Channel(String),
    /// A private message to one player
    Player(Nick),
}

/// One outbound chat line produced by the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Say {
    pub to: Destination,
    pub text: String,
}

/// One inbound chat line handed over by a transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Nick,
    pub text: String,
    pub is_direct_message: bool,
}

impl ChatMessage {
    pub fn public(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            is_direct_message: false,
        }
    }

    pub fn direct(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            is_direct_message: true,
        }
    }
}
