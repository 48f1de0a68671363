//! WebSocket message dispatch

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Longest line accepted from a client
pub const MAX_LINE_LEN: usize = 500;

/// Handle a client message and return an optional direct response.
///
/// Game output is not returned here; it reaches every socket, this one
/// included, through the broadcast channel.
pub async fn handle_message(
    msg: ClientMessage,
    nick: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    if msg.text().trim().is_empty() {
        return Some(ServerMessage::Error {
            code: "EMPTY_MESSAGE".to_string(),
            msg: "Message text is empty".to_string(),
        });
    }
    if msg.text().len() > MAX_LINE_LEN {
        return Some(ServerMessage::Error {
            code: "MESSAGE_TOO_LONG".to_string(),
            msg: format!("Messages are limited to {} bytes", MAX_LINE_LEN),
        });
    }

    let says = state.handle_chat(msg.into_chat(nick)).await;
    if !says.is_empty() {
        tracing::debug!("{} produced {} lines", nick, says.len());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::FixedCards;
    use crate::config::{FixedConfig, Settings};
    use crate::game::{Game, Sources};
    use crate::text::TextCatalog;
    use crate::types::{Card, GameStatus};

    fn state() -> Arc<AppState> {
        let settings = Settings::default();
        let mut cards = vec![Card::prompt("%s?")];
        cards.extend((0..40).map(|i| Card::response(format!("A{}", i))));
        let sources = Sources::new(FixedConfig(settings.clone()), FixedCards(cards));
        Arc::new(AppState::new(Game::new(
            settings,
            TextCatalog::english(),
            sources,
        )))
    }

    #[tokio::test]
    async fn test_say_reaches_the_game() {
        let state = state();
        let response = handle_message(
            ClientMessage::Say {
                text: "start".to_string(),
            },
            "Bob",
            &state,
        )
        .await;
        assert!(response.is_none());
        assert_eq!(state.snapshot().await.status, GameStatus::WaitingForPlayers);
    }

    #[tokio::test]
    async fn test_empty_line_is_an_error() {
        let state = state();
        let response = handle_message(
            ClientMessage::Whisper {
                text: "   ".to_string(),
            },
            "Bob",
            &state,
        )
        .await;
        assert!(matches!(
            response,
            Some(ServerMessage::Error { ref code, .. }) if code == "EMPTY_MESSAGE"
        ));
    }

    #[tokio::test]
    async fn test_overlong_line_is_an_error() {
        let state = state();
        let response = handle_message(
            ClientMessage::Say {
                text: "x".repeat(MAX_LINE_LEN + 1),
            },
            "Bob",
            &state,
        )
        .await;
        assert!(matches!(
            response,
            Some(ServerMessage::Error { ref code, .. }) if code == "MESSAGE_TOO_LONG"
        ));
        assert_eq!(state.snapshot().await.status, GameStatus::Inactive);
    }
}
