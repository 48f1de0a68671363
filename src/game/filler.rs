//! The house player. It sits in like anyone else, plays random cards the
//! moment a round opens, and is never the czar.

use super::round::take_cards;
use super::{Game, GameError, Rejection, Reply};
use crate::player::Player;
use crate::types::GameStatus;

impl Game {
    pub(super) fn is_filler_name(&self, nick: &str) -> bool {
        nick == self.settings.filler.name
    }

    pub(super) fn filler_name_taken(&self) -> Rejection {
        Rejection::new("no_rando_players").with("rando", &self.settings.filler.name)
    }

    /// Put the filler at the table; may be the seat that lets the game begin
    pub(super) fn seat_filler(&mut self) -> Result<(), GameError> {
        let name = self.settings.filler.name.clone();
        if self.is_player(&name) {
            return Ok(());
        }

        self.players.push(Player::new(name.clone()));
        self.filler = Some(name);
        tracing::info!(game = %self.id, "Filler seated ({} seated)", self.players.len());

        if self.status == GameStatus::WaitingForPlayers && self.players_missing() == 0 {
            self.commence()?;
        }
        Ok(())
    }

    fn unseat_filler(&mut self) {
        if let Some(name) = self.filler.take() {
            self.players.retain(|p| p.nick() != name);
            tracing::info!(game = %self.id, "Filler left ({} seated)", self.players.len());
        }
    }

    /// `rando` reports, `rando 1` / `rando 0` switches the filler on or off
    pub(super) fn rando(&mut self, arg: Option<usize>) -> Result<Reply, GameError> {
        let rando = self.settings.filler.name.clone();

        let Some(value) = arg else {
            let playing = if self.filler.is_some() {
                "rando_is_playing"
            } else {
                "rando_not_playing"
            };
            let line = self.render(playing, &[("rando", &rando)]);
            self.say_channel(line);
            let line = self.render(self.toggle_key(), &[("rando", &rando)]);
            self.say_channel(line);
            return Ok(Ok(()));
        };

        let enable = value != 0;
        let seated_human = self.is_player(&rando) && !self.is_filler(&rando);
        if enable && seated_human && self.status == GameStatus::WaitingForPlayers {
            return Ok(Err(self.filler_name_taken()));
        }

        self.filler_enabled = enable;
        tracing::info!(game = %self.id, "Filler {}", if enable { "enabled" } else { "disabled" });
        let line = self.render(self.toggle_key(), &[("rando", &rando)]);
        self.say_channel(line);

        match self.status {
            GameStatus::Inactive => {}
            GameStatus::WaitingForPlayers => {
                if enable {
                    self.seat_filler()?;
                } else {
                    self.unseat_filler();
                }
            }
            GameStatus::WaitingForAnswers | GameStatus::WaitingForJudge => {
                if enable != self.filler.is_some() {
                    let line = self.render("rando_deferred", &[("rando", &rando)]);
                    self.say_channel(line);
                }
            }
        }
        Ok(Ok(()))
    }

    fn toggle_key(&self) -> &'static str {
        if self.filler_enabled {
            "rando_enabled"
        } else {
            "rando_disabled"
        }
    }

    /// The filler answers with random cards as soon as the prompt is out
    pub(super) fn filler_play(&mut self) -> Result<(), GameError> {
        let Some(name) = self.filler.clone() else {
            return Ok(());
        };
        let Some(pick) = self.current_prompt.as_ref().map(|p| p.pick_count()) else {
            return Ok(());
        };
        if self.is_czar(&name) {
            return Ok(());
        }
        let Some(player) = self.players.iter_mut().find(|p| p.nick() == name) else {
            return Ok(());
        };

        let hand_len = player.hand_len();
        if hand_len < pick {
            tracing::warn!(game = %self.id, "Filler holds {} cards, needs {}; sitting out", hand_len, pick);
            return Ok(());
        }
        let indices = rand::seq::index::sample(&mut rand::rng(), hand_len, pick);
        let cards = take_cards(player, &indices.into_vec())?;
        self.answers.insert(name.clone(), cards);
        tracing::debug!(game = %self.id, "Filler played");

        let line = self.render("rando_played", &[("rando", &name)]);
        self.say_channel(line);
        Ok(())
    }
}
