use super::{Game, GameError, Rejection, Reply};
use crate::command::Actor;
use crate::player::Player;
use crate::types::{Card, GameStatus};

impl Game {
    /// Open a new game and seat the actor
    pub(super) fn start(&mut self, actor: &Actor) -> Result<Reply, GameError> {
        if self.status != GameStatus::Inactive {
            return Ok(Err(Rejection::new("game_already_started")));
        }
        if self.filler_enabled && self.is_filler_name(actor.nick()) {
            return Ok(Err(self.filler_name_taken()));
        }

        let mut deck = self.sources.cards.load(&self.settings)?;
        deck.shuffle();
        self.deck = deck;
        self.status = GameStatus::WaitingForPlayers;
        tracing::info!(game = %self.id, "{} started a game", actor.nick());

        let line = self.text.get("round_start").to_string();
        self.say_channel(line);

        self.add_player(actor.nick())?;
        if self.filler_enabled && self.status == GameStatus::WaitingForPlayers {
            self.seat_filler()?;
        }
        Ok(Ok(()))
    }

    pub(super) fn join(&mut self, nick: &str) -> Result<Reply, GameError> {
        if self.status == GameStatus::Inactive {
            return self.start(&Actor::Provisional(nick.to_string()));
        }
        if self.filler_enabled && self.is_filler_name(nick) {
            return Ok(Err(self.filler_name_taken()));
        }
        if self.is_player(nick) {
            return Ok(Err(Rejection::new("double_join")));
        }
        if self.players.len() >= self.settings.max_players {
            return Ok(Err(Rejection::new("game_full")
                .with("name", nick)
                .with("max", self.settings.max_players)));
        }

        self.add_player(nick)?;
        Ok(Ok(()))
    }

    /// Seat a player; does nothing if they are already seated
    pub(super) fn add_player(&mut self, nick: &str) -> Result<(), GameError> {
        if self.is_player(nick) {
            return Ok(());
        }

        let player = self.recruit(nick);
        self.players.push(player);
        tracing::info!(game = %self.id, "{} joined ({} seated)", nick, self.players.len());

        match self.status {
            GameStatus::WaitingForPlayers => {
                let missing = self.players_missing();
                if missing > 0 {
                    let word = self.text.plural("player", missing);
                    let line = self.render(
                        "welcome_wait",
                        &[("name", &nick), ("num", &missing), ("player_word", &word)],
                    );
                    self.say_channel(line);
                } else {
                    let line = self.render("welcome_start", &[("name", &nick)]);
                    self.say_channel(line);
                    self.commence()?;
                }
            }
            GameStatus::WaitingForAnswers | GameStatus::WaitingForJudge => {
                self.fill_hand(nick)?;
                let line = self.render("welcome_join", &[("name", &nick)]);
                self.say_channel(line);
                self.show_hand(nick);
            }
            GameStatus::Inactive => {}
        }
        Ok(())
    }

    /// A returning veteran when history is kept, otherwise a new player
    fn recruit(&mut self, nick: &str) -> Player {
        match self.veterans.remove(nick) {
            Some(mut veteran) => {
                veteran.clear_hand();
                tracing::debug!("Welcoming back {}", veteran);
                veteran
            }
            None => Player::new(nick),
        }
    }

    /// Seats still to fill before a round can run. The filler counts toward
    /// `min_players`, but a round always needs two humans.
    pub(super) fn players_missing(&self) -> usize {
        let seats = self.settings.min_players.saturating_sub(self.players.len());
        let humans = 2usize.saturating_sub(self.human_count());
        seats.max(humans)
    }

    fn human_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| !self.is_filler(p.nick()))
            .count()
    }

    pub(super) fn quit(&mut self, nick: &str) -> Result<Reply, GameError> {
        let Some(index) = self.players.iter().position(|p| p.nick() == nick) else {
            return Ok(Err(Rejection::new("not_in_game").with("name", nick)));
        };

        let was_czar = self.is_czar(nick);
        let mut player = self.players.remove(index);
        self.answers.remove(nick);
        self.answer_order.retain(|_, answered| answered.as_str() != nick);
        tracing::info!(game = %self.id, "{} quit ({} left)", nick, self.players.len());

        let line = self.render("quit_message", &[("player", &nick)]);
        self.say_channel(line);

        if self.settings.keep_history {
            player.reset_game_stats(false);
            player.clear_hand();
            self.veterans.insert(nick.to_string(), player);
        }

        if self.players.iter().all(|p| self.is_filler(p.nick())) {
            self.reset();
            let line = self.text.get("game_start").to_string();
            self.say_channel(line);
            return Ok(Ok(()));
        }

        if index < self.czar_index {
            self.czar_index -= 1;
        }
        self.czar_index %= self.players.len();
        self.skip_filler_czar();

        if !matches!(
            self.status,
            GameStatus::WaitingForAnswers | GameStatus::WaitingForJudge
        ) {
            return Ok(Ok(()));
        }

        if self.human_count() < 2 {
            self.return_answers();
            self.current_prompt = None;
            self.status = GameStatus::WaitingForPlayers;
            tracing::info!(game = %self.id, "Too few players left, waiting for more");
            return Ok(self.state());
        }

        if was_czar {
            // The next czar already sits at czar_index
            self.return_answers();
            self.start_round()?;
        } else if self.status == GameStatus::WaitingForJudge && self.answers.is_empty() {
            self.start_round()?;
        } else {
            self.check_all_played();
        }
        Ok(Ok(()))
    }

    /// Hand every played card back to whoever played it
    fn return_answers(&mut self) {
        let answers: Vec<(String, Vec<Card>)> = self.answers.drain().collect();
        for (nick, cards) in answers {
            if let Some(player) = self.players.iter_mut().find(|p| p.nick() == nick) {
                for card in cards {
                    player.add_card(card);
                }
            }
        }
        self.answer_order.clear();
    }

    pub(super) fn list(&mut self) -> Reply {
        let line = if self.players.is_empty() {
            self.text.get("no_players").to_string()
        } else {
            let nicks: Vec<&str> = self.players.iter().map(Player::nick).collect();
            let names = self.text.join_names(&nicks);
            self.render("player_list", &[("players", &names)])
        };
        self.say_channel(line);
        Ok(())
    }

    /// Pass the czar role along, never to the filler
    pub(super) fn next_czar(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.czar_index = (self.czar_index + 1) % self.players.len();
        self.skip_filler_czar();
    }

    pub(super) fn skip_filler_czar(&mut self) {
        for _ in 0..self.players.len() {
            match self.players.get(self.czar_index) {
                Some(p) if self.is_filler(p.nick()) => {
                    self.czar_index = (self.czar_index + 1) % self.players.len();
                }
                _ => return,
            }
        }
    }
}
