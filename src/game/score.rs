use super::{Game, Reply};
use crate::player::Player;
use crate::types::{GameStatus, Nick};

impl Game {
    /// Players ranked by points this game; ties keep seating order
    pub fn ranking(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.round_wins.cmp(&a.round_wins));
        ranked
    }

    /// "Joe: 2 points, Bob: 1 point, ..."
    pub(super) fn score_list(&self) -> String {
        self.ranking()
            .iter()
            .map(|player| {
                let points = player.round_wins;
                let point_word = self.text.plural("point", points as usize);
                self.render(
                    "score_element",
                    &[
                        ("player", &player.nick()),
                        ("points", &points),
                        ("point_word", &point_word),
                    ],
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(super) fn score(&mut self) -> Reply {
        if self.status == GameStatus::Inactive {
            return Ok(());
        }
        let scores = self.score_list();
        let line = self.render("score_announcement", &[("scores", &scores)]);
        self.say_channel(line);
        Ok(())
    }

    /// Report what the game is waiting on
    pub(super) fn state(&mut self) -> Reply {
        match self.status {
            GameStatus::Inactive => {
                let line = self.text.get("status.inactive").to_string();
                self.say_channel(line);
            }
            GameStatus::WaitingForPlayers => {
                let missing = self.players_missing();
                let word = self.text.plural("player", missing);
                let line = self.render(
                    "status.wait_players",
                    &[("num", &missing), ("player_word", &word)],
                );
                self.say_channel(line);
            }
            GameStatus::WaitingForAnswers => {
                let pending: Vec<Nick> = self
                    .players
                    .iter()
                    .map(|p| p.nick().to_string())
                    .filter(|nick| !self.is_czar(nick) && !self.answers.contains_key(nick))
                    .collect();
                let question = self
                    .current_prompt
                    .as_ref()
                    .map(|card| card.formatted_text())
                    .unwrap_or_default();
                let line = self.render(
                    "status.wait_answers",
                    &[
                        ("players", &self.text.join_names(&pending)),
                        ("question", &question),
                    ],
                );
                self.say_channel(line);
            }
            GameStatus::WaitingForJudge => {
                let czar = self.czar().map(|p| p.nick().to_string()).unwrap_or_default();
                let line = self.render("status.wait_czar", &[("czar", &czar)]);
                self.say_channel(line);
                for line in self.judge_lines() {
                    self.say_channel(line);
                }
            }
        }
        Ok(())
    }

    pub(super) fn announce_game_winner(&mut self, winner: &str, points: u32) {
        let point_word = self.text.plural("point", points as usize);
        let scores = self.score_list();
        let line = self.render(
            "game_winner",
            &[
                ("player", &winner),
                ("points", &points),
                ("point_word", &point_word),
                ("scores", &scores),
            ],
        );
        self.say_channel(line);
    }

    /// Close out a finished game and go back to a fresh one
    pub(super) fn end_game(&mut self, winner: Option<&str>) {
        tracing::info!(
            game = %self.id,
            "Game over after {} rounds, winner {:?}",
            self.round_number,
            winner
        );

        let players = std::mem::take(&mut self.players);
        if self.settings.keep_history {
            for mut player in players {
                if self.is_filler(player.nick()) {
                    continue;
                }
                let won = winner == Some(player.nick());
                player.reset_game_stats(won);
                player.clear_hand();
                self.veterans.insert(player.nick().to_string(), player);
            }
        }

        self.reset();
        let line = self.text.get("game_start").to_string();
        self.say_channel(line);
    }
}
