//! Chat command parsing
//!
//! Turns a line of chat into a [`ParsedCommand`]. Parsing is forgiving:
//! anything that doesn't look like a command yields `None` instead of an
//! error, so ordinary conversation in the channel is simply ignored.

use crate::types::{GameStatus, Nick};

/// Most numeric arguments a single command accepts
pub const MAX_NUMERIC_ARGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Cards,
    Commands,
    Help,
    Join,
    List,
    Play,
    Quit,
    Rando,
    Reload,
    Score,
    Start,
    State,
    Winner,
}

/// Argument shape and access rules for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub takes_args: bool,
    /// Without at least one numeric argument the line is not a command
    pub args_required: bool,
    /// Arguments are indices into the sender's hand
    pub card_indices: bool,
    /// May be used by someone who hasn't joined
    pub anonymous: bool,
}

impl CommandSpec {
    const fn bare(anonymous: bool) -> Self {
        Self {
            takes_args: false,
            args_required: false,
            card_indices: false,
            anonymous,
        }
    }
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::Cards,
        Command::Commands,
        Command::Help,
        Command::Join,
        Command::List,
        Command::Play,
        Command::Quit,
        Command::Rando,
        Command::Reload,
        Command::Score,
        Command::Start,
        Command::State,
        Command::Winner,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Cards => "cards",
            Command::Commands => "commands",
            Command::Help => "help",
            Command::Join => "join",
            Command::List => "list",
            Command::Play => "play",
            Command::Quit => "quit",
            Command::Rando => "rando",
            Command::Reload => "reload",
            Command::Score => "score",
            Command::Start => "start",
            Command::State => "state",
            Command::Winner => "winner",
        }
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn spec(self) -> CommandSpec {
        match self {
            Command::Cards | Command::Quit => CommandSpec::bare(false),
            Command::Commands
            | Command::Help
            | Command::Join
            | Command::List
            | Command::Reload
            | Command::Score
            | Command::State => CommandSpec::bare(true),
            Command::Play => CommandSpec {
                takes_args: true,
                args_required: true,
                card_indices: true,
                anonymous: false,
            },
            Command::Winner => CommandSpec {
                takes_args: true,
                args_required: true,
                card_indices: false,
                anonymous: false,
            },
            Command::Rando | Command::Start => CommandSpec {
                takes_args: true,
                args_required: false,
                card_indices: false,
                anonymous: true,
            },
        }
    }

    /// Short usage hint, e.g. `play <card>...` or `rando [n]`
    pub fn usage(self) -> String {
        let spec = self.spec();
        let hint = match (spec.takes_args, spec.args_required, spec.card_indices) {
            (false, _, _) => "",
            (true, _, true) => " <card>...",
            (true, true, false) => " <n>",
            (true, false, false) => " [n]",
        };
        format!("{}{}", self.name(), hint)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed word that stands in for a command, optionally only in one state
struct Alias {
    word: &'static str,
    command: Command,
    when: Option<GameStatus>,
}

/// First match wins
const ALIASES: &[Alias] = &[
    Alias {
        word: "join",
        command: Command::Start,
        when: Some(GameStatus::Inactive),
    },
    Alias {
        word: "leave",
        command: Command::Quit,
        when: None,
    },
    Alias {
        word: "pick",
        command: Command::Winner,
        when: Some(GameStatus::WaitingForJudge),
    },
    Alias {
        word: "pick",
        command: Command::Play,
        when: None,
    },
    Alias {
        word: "players",
        command: Command::List,
        when: None,
    },
    Alias {
        word: "shame",
        command: Command::Score,
        when: None,
    },
    Alias {
        word: "status",
        command: Command::State,
        when: None,
    },
];

/// Resolve a typed verb to a command for the given game state
pub fn resolve(word: &str, status: GameStatus) -> Option<Command> {
    ALIASES
        .iter()
        .find(|alias| alias.word == word && alias.when.map_or(true, |s| s == status))
        .map(|alias| alias.command)
        .or_else(|| Command::from_name(word))
}

/// Who issued a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Already seated in the current game
    Registered(Nick),
    /// Not (yet) in the game
    Provisional(Nick),
}

impl Actor {
    pub fn nick(&self) -> &str {
        match self {
            Actor::Registered(nick) | Actor::Provisional(nick) => nick,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Actor::Registered(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: Vec<usize>,
    pub actor: Actor,
}

impl ParsedCommand {
    pub fn new(command: Command, args: Vec<usize>, actor: Actor) -> Self {
        Self {
            command,
            args,
            actor,
        }
    }
}

/// Parse one line of chat.
///
/// Only single-digit tokens count as arguments and anything else after the
/// verb is ignored, so `winner 1 because we rock` is `winner [1]`.
pub fn parse(
    text: &str,
    sender: &str,
    status: GameStatus,
    is_registered: bool,
) -> Option<ParsedCommand> {
    let mut tokens = text.split_whitespace();
    let command = resolve(tokens.next()?, status)?;
    let spec = command.spec();
    let rest: Vec<&str> = tokens.collect();

    if !spec.takes_args && !rest.is_empty() {
        return None;
    }

    let args: Vec<usize> = rest
        .iter()
        .filter(|token| token.len() == 1)
        .filter_map(|token| token.chars().next()?.to_digit(10))
        .map(|digit| digit as usize)
        .take(MAX_NUMERIC_ARGS)
        .collect();

    if spec.args_required && args.is_empty() {
        return None;
    }

    let actor = if is_registered {
        Actor::Registered(sender.to_string())
    } else {
        Actor::Provisional(sender.to_string())
    };

    Some(ParsedCommand::new(command, args, actor))
}
