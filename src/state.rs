use crate::cards::CardDir;
use crate::config::{ConfigError, EnvConfig, Settings};
use crate::game::{Game, GameSnapshot, Sources};
use crate::protocol::ServerMessage;
use crate::text::TextCatalog;
use crate::types::{ChatMessage, Destination, Say};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Shared application state.
///
/// The game sits behind one lock. A chat line is parsed, executed, and its
/// output published while that lock is held, so every subscriber sees lines
/// in the order the game produced them.
#[derive(Clone)]
pub struct AppState {
    game: Arc<Mutex<Game>>,
    /// Every outbound chat line, for all connected clients
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            game: Arc::new(Mutex::new(game)),
            broadcast: tx,
        }
    }

    /// Game wired to the environment and the card directory
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let text = TextCatalog::for_settings(&settings)?;
        let sources = Sources::new(EnvConfig, CardDir);
        Ok(Self::new(Game::new(settings, text, sources)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcast.subscribe()
    }

    /// Feed one inbound chat line to the game and publish what it says
    pub async fn handle_chat(&self, message: ChatMessage) -> Vec<Say> {
        let mut game = self.game.lock().await;
        let Some(parsed) = game.parse(&message) else {
            return Vec::new();
        };

        let says = match game.execute(parsed) {
            Ok(says) => says,
            Err(e) => game.abort(&e),
        };

        for say in &says {
            tracing::debug!("say {:?}: {}", say.to, say.text);
            // No subscribers is fine; nobody is listening yet
            let _ = self.broadcast.send(ServerMessage::message(say));
        }
        says
    }

    /// Say a catalog line in the channel outside of any command
    pub async fn announce(&self, key: &str) -> Say {
        let game = self.game.lock().await;
        let say = Say {
            to: Destination::Channel(game.channel().to_string()),
            text: game.text().render(key, &[]),
        };
        let _ = self.broadcast.send(ServerMessage::message(&say));
        say
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.game.lock().await.snapshot()
    }

    pub async fn channel(&self) -> String {
        self.game.lock().await.channel().to_string()
    }
}
