use crate::types::{ChatMessage, Destination, Nick, Say};
use serde::{Deserialize, Serialize};

/// Wire protocol version sent in `welcome`
pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A line typed in the shared channel
    Say { text: String },
    /// A private line to the bot
    Whisper { text: String },
}

impl ClientMessage {
    pub fn text(&self) -> &str {
        match self {
            ClientMessage::Say { text } | ClientMessage::Whisper { text } => text,
        }
    }

    pub fn into_chat(self, sender: &str) -> ChatMessage {
        match self {
            ClientMessage::Say { text } => ChatMessage::public(sender, text),
            ClientMessage::Whisper { text } => ChatMessage::direct(sender, text),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        nick: Nick,
        channel: String,
        server_now: String,
    },
    Message {
        to: Destination,
        text: String,
        server_now: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn welcome(nick: &str, channel: &str) -> Self {
        ServerMessage::Welcome {
            protocol: PROTOCOL_VERSION.to_string(),
            nick: nick.to_string(),
            channel: channel.to_string(),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn message(say: &Say) -> Self {
        ServerMessage::Message {
            to: say.to.clone(),
            text: say.text.clone(),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Channel lines go to everyone, private lines only to their player
    pub fn is_visible_to(&self, nick: &str) -> bool {
        match self {
            ServerMessage::Message {
                to: Destination::Player(player),
                ..
            } => player == nick,
            _ => true,
        }
    }
}
