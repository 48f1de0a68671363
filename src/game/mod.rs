//! The game engine
//!
//! [`Game`] is a plain synchronous state machine. Each call to
//! [`Game::execute`] runs one command to completion and hands back every
//! line it wants said, in order. Handlers are split by concern across the
//! submodules, all as `impl Game` blocks.

mod filler;
mod roster;
mod round;
mod score;

use crate::cards::{CardSource, LoadError};
use crate::command::{self, Command, ParsedCommand};
use crate::config::{ConfigError, ConfigSource, Settings};
use crate::deck::{Deck, DeckError};
use crate::player::{Player, PlayerStats};
use crate::text::TextCatalog;
use crate::types::{Card, ChatMessage, Destination, GameStatus, Nick, Say};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::Arc;

pub use round::format_answer;

/// Conditions that end the current game
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Text announced in the channel when this error aborts a game
    pub fn text_key(&self) -> &'static str {
        match self {
            GameError::Deck(_) => "out_of_cards",
            GameError::Load(_) => "load_failed",
            GameError::Config(_) => "config_failed",
        }
    }
}

/// An expected refusal, said once in the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub key: &'static str,
    pub args: Vec<(&'static str, String)>,
}

impl Rejection {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: impl Display) -> Self {
        self.args.push((name, value.to_string()));
        self
    }
}

/// Outcome of a command that didn't hit a fatal error
pub type Reply = Result<(), Rejection>;

/// Where the game reloads settings and cards from
#[derive(Clone)]
pub struct Sources {
    pub config: Arc<dyn ConfigSource>,
    pub cards: Arc<dyn CardSource>,
}

impl Sources {
    pub fn new(config: impl ConfigSource + 'static, cards: impl CardSource + 'static) -> Self {
        Self {
            config: Arc::new(config),
            cards: Arc::new(cards),
        }
    }
}

/// Read-only view of the game for the status API
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub id: String,
    pub status: GameStatus,
    pub round_number: u32,
    pub czar: Option<Nick>,
    pub prompt: Option<String>,
    pub players: Vec<PlayerStats>,
    pub answered: Vec<Nick>,
    pub filler_enabled: bool,
}

pub struct Game {
    id: ulid::Ulid,
    status: GameStatus,
    round_number: u32,
    players: Vec<Player>,
    czar_index: usize,
    current_prompt: Option<Card>,
    answers: HashMap<Nick, Vec<Card>>,
    /// Judging order, regenerated every round
    answer_order: BTreeMap<usize, Nick>,
    deck: Deck,
    settings: Arc<Settings>,
    text: Arc<TextCatalog>,
    sources: Sources,
    /// Whether the filler sits down when the next game starts
    filler_enabled: bool,
    /// The filler's nick while it is seated
    filler: Option<Nick>,
    /// Players kept between games when history is on
    veterans: HashMap<Nick, Player>,
    outbox: Vec<Say>,
}

impl Game {
    pub fn new(settings: Settings, text: TextCatalog, sources: Sources) -> Self {
        let filler_enabled = settings.filler.active;
        Self {
            id: ulid::Ulid::new(),
            status: GameStatus::Inactive,
            round_number: 0,
            players: Vec::new(),
            czar_index: 0,
            current_prompt: None,
            answers: HashMap::new(),
            answer_order: BTreeMap::new(),
            deck: Deck::new(),
            settings: Arc::new(settings),
            text: Arc::new(text),
            sources,
            filler_enabled,
            filler: None,
            veterans: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, nick: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.nick() == nick)
    }

    pub fn is_player(&self, nick: &str) -> bool {
        self.player(nick).is_some()
    }

    pub fn current_prompt(&self) -> Option<&Card> {
        self.current_prompt.as_ref()
    }

    pub fn answers(&self) -> &HashMap<Nick, Vec<Card>> {
        &self.answers
    }

    pub fn answer_order(&self) -> &BTreeMap<usize, Nick> {
        &self.answer_order
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn text(&self) -> &TextCatalog {
        &self.text
    }

    pub fn channel(&self) -> &str {
        &self.settings.channel
    }

    /// The card czar, once a round is running
    pub fn czar(&self) -> Option<&Player> {
        match self.status {
            GameStatus::WaitingForAnswers | GameStatus::WaitingForJudge => {
                self.players.get(self.czar_index)
            }
            GameStatus::Inactive | GameStatus::WaitingForPlayers => None,
        }
    }

    pub fn is_czar(&self, nick: &str) -> bool {
        self.czar().is_some_and(|czar| czar.nick() == nick)
    }

    pub fn is_filler(&self, nick: &str) -> bool {
        self.filler.as_deref() == Some(nick)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut answered: Vec<Nick> = self.answers.keys().cloned().collect();
        answered.sort();
        GameSnapshot {
            id: self.id.to_string(),
            status: self.status,
            round_number: self.round_number,
            czar: self.czar().map(|p| p.nick().to_string()),
            prompt: self.current_prompt.as_ref().map(Card::formatted_text),
            players: self.players.iter().map(Player::stats).collect(),
            answered,
            filler_enabled: self.filler_enabled,
        }
    }

    /// Recognize a command in a line of chat, judged against the current state
    pub fn parse(&self, message: &ChatMessage) -> Option<ParsedCommand> {
        if self.is_filler(&message.sender) {
            return None;
        }
        command::parse(
            &message.text,
            &message.sender,
            self.status,
            self.is_player(&message.sender),
        )
    }

    /// Run one command and return what it wants said.
    ///
    /// On error the lines produced so far stay queued; call [`Game::abort`]
    /// to collect them along with the abort notice.
    pub fn execute(&mut self, parsed: ParsedCommand) -> Result<Vec<Say>, GameError> {
        tracing::debug!(
            game = %self.id,
            "{} called {} {:?}",
            parsed.actor.nick(),
            parsed.command,
            parsed.args
        );

        if let Err(rejection) = self.dispatch(&parsed)? {
            tracing::debug!(game = %self.id, "Refused {}: {}", parsed.command, rejection.key);
            let line = self.render_owned(rejection.key, &rejection.args);
            self.say_channel(line);
        }

        Ok(std::mem::take(&mut self.outbox))
    }

    /// Reset after a fatal error, returning everything left to say
    pub fn abort(&mut self, err: &GameError) -> Vec<Say> {
        tracing::error!(game = %self.id, "Game aborted: {}", err);
        self.reset();
        let line = self.text.render(err.text_key(), &[]);
        self.say_channel(line);
        std::mem::take(&mut self.outbox)
    }

    fn dispatch(&mut self, parsed: &ParsedCommand) -> Result<Reply, GameError> {
        let nick = parsed.actor.nick();
        if !parsed.command.spec().anonymous && !parsed.actor.is_registered() {
            return Ok(Err(Rejection::new("not_in_game").with("name", nick)));
        }

        let first_arg = parsed.args.first().copied();
        match parsed.command {
            Command::Cards => Ok(self.cards(nick)),
            Command::Commands => Ok(self.commands()),
            Command::Help => Ok(self.help()),
            Command::Join => self.join(nick),
            Command::List => Ok(self.list()),
            Command::Play => self.play(nick, &parsed.args),
            Command::Quit => self.quit(nick),
            Command::Rando => self.rando(first_arg),
            Command::Reload => self.reload(),
            Command::Score => Ok(self.score()),
            Command::Start => self.start(&parsed.actor),
            Command::State => Ok(self.state()),
            Command::Winner => self.winner(nick, first_arg),
        }
    }

    fn help(&mut self) -> Reply {
        let line = self.text.get("help_blurb").to_string();
        self.say_channel(line);
        Ok(())
    }

    fn commands(&mut self) -> Reply {
        let usages: Vec<String> = Command::ALL.iter().map(|c| c.usage()).collect();
        let line = self.render("commands_list", &[("commands", &usages.join(", "))]);
        self.say_channel(line);
        Ok(())
    }

    /// Swap in fresh settings, text, and cards; only between games
    fn reload(&mut self) -> Result<Reply, GameError> {
        if self.status != GameStatus::Inactive {
            return Ok(Err(Rejection::new("reload_wait")));
        }

        let settings = self.sources.config.load()?;
        let text = TextCatalog::for_settings(&settings)?;
        self.sources.cards.load(&settings)?;

        tracing::info!(
            game = %self.id,
            "Reloaded settings (language {}, {} to {} players)",
            settings.language,
            settings.min_players,
            settings.max_players
        );
        self.filler_enabled = settings.filler.active;
        self.settings = Arc::new(settings);
        self.text = Arc::new(text);

        let line = self.text.get("reload_announcement").to_string();
        self.say_channel(line);
        Ok(Ok(()))
    }

    /// Back to a fresh, inactive game. Settings, text, filler toggle and
    /// veterans survive.
    fn reset(&mut self) {
        self.id = ulid::Ulid::new();
        self.status = GameStatus::Inactive;
        self.round_number = 0;
        self.players.clear();
        self.czar_index = 0;
        self.current_prompt = None;
        self.answers.clear();
        self.answer_order.clear();
        self.deck = Deck::new();
        self.filler = None;
    }

    fn render(&self, key: &str, args: &[(&str, &dyn Display)]) -> String {
        self.text.render(key, args)
    }

    fn render_owned(&self, key: &str, args: &[(&'static str, String)]) -> String {
        let args: Vec<(&str, &dyn Display)> = args
            .iter()
            .map(|(name, value)| (*name, value as &dyn Display))
            .collect();
        self.text.render(key, &args)
    }

    fn say_channel(&mut self, text: String) {
        let to = Destination::Channel(self.settings.channel.clone());
        self.outbox.push(Say { to, text });
    }

    /// Private line to a player; the filler never gets one
    fn say_to(&mut self, nick: &str, text: String) {
        if self.is_filler(nick) {
            return;
        }
        let to = Destination::Player(nick.to_string());
        self.outbox.push(Say { to, text });
    }
}
