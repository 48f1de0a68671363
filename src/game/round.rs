use super::{Game, GameError, Rejection, Reply};
use crate::player::Player;
use crate::types::{Card, CardKind, GameStatus, Nick, BLANK_GLYPH, BLANK_MARKER};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Fill a prompt's blanks with the played cards, in order.
///
/// Cards beyond the last blank are appended after the prompt, so a prompt
/// with no blanks reads as "question answer". Blanks left over show as
/// `___`.
pub fn format_answer(prompt: &Card, cards: &[Card]) -> String {
    let mut pieces = prompt.text().split(BLANK_MARKER);
    let mut out = pieces.next().unwrap_or_default().to_string();
    let mut cards = cards.iter();

    for piece in pieces {
        match cards.next() {
            Some(card) => out.push_str(card.text()),
            None => out.push_str(BLANK_GLYPH),
        }
        out.push_str(piece);
    }
    for card in cards {
        out.push(' ');
        out.push_str(card.text());
    }
    out
}

/// Remove the cards at `indices` from a hand, returned in the order asked
pub(super) fn take_cards(player: &mut Player, indices: &[usize]) -> Result<Vec<Card>, GameError> {
    // Highest index first so earlier removals don't shift later ones
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|a, b| indices[*b].cmp(&indices[*a]));

    let mut taken: Vec<Option<Card>> = vec![None; indices.len()];
    for slot in order {
        taken[slot] = Some(player.deal(indices[slot])?);
    }
    Ok(taken.into_iter().flatten().collect())
}

impl Game {
    /// Enough players are seated: deal everyone in and play round one
    pub(super) fn commence(&mut self) -> Result<(), GameError> {
        tracing::info!(game = %self.id, "Game commencing with {} players", self.players.len());
        self.status = GameStatus::WaitingForAnswers;
        self.top_up()?;
        self.czar_index = 0;
        self.skip_filler_czar();
        self.start_round()
    }

    /// Deal one card at a time around the table until every hand is full
    pub(super) fn top_up(&mut self) -> Result<(), GameError> {
        let hand_size = self.settings.hand_size;
        loop {
            let mut dealt = false;
            for player in self.players.iter_mut() {
                if player.hand_len() < hand_size {
                    player.add_card(self.deck.draw(CardKind::Response, None)?);
                    dealt = true;
                }
            }
            if !dealt {
                return Ok(());
            }
        }
    }

    /// Fill one player's hand
    pub(super) fn fill_hand(&mut self, nick: &str) -> Result<(), GameError> {
        let hand_size = self.settings.hand_size;
        if let Some(player) = self.players.iter_mut().find(|p| p.nick() == nick) {
            while player.hand_len() < hand_size {
                player.add_card(self.deck.draw(CardKind::Response, None)?);
            }
        }
        Ok(())
    }

    pub(super) fn start_round(&mut self) -> Result<(), GameError> {
        self.round_number += 1;
        self.status = GameStatus::WaitingForAnswers;
        self.answers.clear();
        self.answer_order.clear();
        self.top_up()?;

        let prompt = self.deck.draw(CardKind::Prompt, None)?;
        tracing::info!(game = %self.id, "Round {}: {}", self.round_number, prompt.info());
        let czar = self
            .czar()
            .map(|p| p.nick().to_string())
            .unwrap_or_default();

        let line = self.render(
            "round_announcement",
            &[("round_num", &self.round_number), ("czar", &czar)],
        );
        self.say_channel(line);
        let line = self.render("question_announcement", &[("card", &prompt.formatted_text())]);
        self.say_channel(line);
        self.current_prompt = Some(prompt);

        self.filler_play()?;

        let nicks: Vec<Nick> = self
            .players
            .iter()
            .map(|p| p.nick().to_string())
            .filter(|nick| *nick != czar)
            .collect();
        for nick in nicks {
            self.show_hand(&nick);
        }

        self.check_all_played();
        Ok(())
    }

    /// Submit cards from `nick`'s hand for the current prompt
    pub(super) fn play(&mut self, nick: &str, indices: &[usize]) -> Result<Reply, GameError> {
        if self.status != GameStatus::WaitingForAnswers {
            return Ok(Err(Rejection::new("not_accepting_answers")));
        }
        if self.is_czar(nick) {
            return Ok(Err(Rejection::new("not_player")));
        }
        if self.answers.contains_key(nick) {
            return Ok(Err(Rejection::new("already_played")));
        }

        let Some(prompt) = self.current_prompt.clone() else {
            return Ok(Err(Rejection::new("not_accepting_answers")));
        };
        let pick = prompt.pick_count();
        if indices.len() != pick {
            return Ok(Err(Rejection::new("card_num_wrong")
                .with("num", pick)
                .with("answer_word", self.text.plural("answer", pick))
                .with("wrong_num", indices.len())));
        }

        let Some(player) = self.players.iter_mut().find(|p| p.nick() == nick) else {
            return Ok(Err(Rejection::new("not_in_game").with("name", nick)));
        };
        let hand_len = player.hand_len();
        let mut seen = HashSet::new();
        if indices.iter().any(|&i| i >= hand_len || !seen.insert(i)) {
            return Ok(Err(Rejection::new("invalid_card")
                .with("max", hand_len.saturating_sub(1))));
        }

        let cards = take_cards(player, indices)?;
        let answer = format_answer(&prompt, &cards);
        self.answers.insert(nick.to_string(), cards);
        tracing::info!(
            game = %self.id,
            "{} played ({} of {} answered)",
            nick,
            self.answers.len(),
            self.players.len().saturating_sub(1)
        );

        let line = self.render("answer_played", &[("answer", &answer)]);
        self.say_to(nick, line);

        self.check_all_played();
        Ok(Ok(()))
    }

    /// Move to judging once everyone but the czar has answered
    pub(super) fn check_all_played(&mut self) {
        if self.status != GameStatus::WaitingForAnswers || self.answers.is_empty() {
            return;
        }
        if self.answers.len() != self.players.len().saturating_sub(1) {
            return;
        }

        self.status = GameStatus::WaitingForJudge;
        self.randomize_answers();

        let czar = self.czar().map(|p| p.nick().to_string()).unwrap_or_default();
        let line = self.render("all_cards_played", &[("czar", &czar)]);
        self.say_channel(line);
        for line in self.judge_lines() {
            self.say_channel(line);
        }
    }

    /// Fresh random judging order over whoever answered
    fn randomize_answers(&mut self) {
        let mut nicks: Vec<Nick> = self
            .players
            .iter()
            .map(|p| p.nick().to_string())
            .filter(|nick| self.answers.contains_key(nick))
            .collect();
        nicks.shuffle(&mut rand::rng());
        self.answer_order = nicks.into_iter().enumerate().collect();
    }

    /// One `[i] answer` line per submission, in judging order
    pub(super) fn judge_lines(&self) -> Vec<String> {
        let Some(prompt) = &self.current_prompt else {
            return Vec::new();
        };
        self.answer_order
            .iter()
            .filter_map(|(index, nick)| {
                let cards = self.answers.get(nick)?;
                let answer = format_answer(prompt, cards);
                Some(self.render("answer_line", &[("index", index), ("answer", &answer)]))
            })
            .collect()
    }

    /// The czar names the funniest answer
    pub(super) fn winner(&mut self, nick: &str, index: Option<usize>) -> Result<Reply, GameError> {
        if !self.is_czar(nick) {
            return Ok(Err(Rejection::new("not_czar")));
        }
        if self.status != GameStatus::WaitingForJudge {
            return Ok(Err(Rejection::new("not_judging")));
        }
        let index = index.unwrap_or_default();
        let Some(winner) = self.answer_order.get(&index).cloned() else {
            return Ok(Err(Rejection::new("invalid_pick").with("index", index)));
        };

        let answer = match (&self.current_prompt, self.answers.get(&winner)) {
            (Some(prompt), Some(cards)) => format_answer(prompt, cards),
            _ => String::new(),
        };
        let Some(player) = self.players.iter_mut().find(|p| p.nick() == winner) else {
            return Ok(Err(Rejection::new("invalid_pick").with("index", index)));
        };
        player.record_round_win();
        let points = player.round_wins;
        tracing::info!(game = %self.id, "{} won round {} ({} points)", winner, self.round_number, points);

        let point_word = self.text.plural("point", points as usize);
        let line = self.render(
            "winner_announcement",
            &[
                ("player", &winner),
                ("card", &answer),
                ("points", &points),
                ("point_word", &point_word),
            ],
        );
        self.say_channel(line);

        self.next_czar();
        if points >= self.settings.max_points {
            self.announce_game_winner(&winner, points);
            self.end_game(Some(&winner));
        } else {
            self.start_round()?;
        }
        Ok(Ok(()))
    }

    /// Private reminder of the prompt and the player's hand
    pub(super) fn cards(&mut self, nick: &str) -> Reply {
        if !matches!(
            self.status,
            GameStatus::WaitingForAnswers | GameStatus::WaitingForJudge
        ) {
            return Err(Rejection::new("game_not_started"));
        }
        if let Some(prompt) = &self.current_prompt {
            let line = self.render("question_announcement", &[("card", &prompt.formatted_text())]);
            self.say_to(nick, line);
        }
        self.show_hand(nick);
        Ok(())
    }

    /// Send a player their numbered hand
    pub(super) fn show_hand(&mut self, nick: &str) {
        let Some(player) = self.player(nick) else {
            return;
        };
        let cards: String = player
            .hand()
            .iter()
            .enumerate()
            .map(|(i, card)| format!("[{}] {} ", i, card.text()))
            .collect();
        let line = self.render("player_hand", &[("cards", &cards.trim_end())]);
        self.say_to(nick, line);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::command::Command;
    use crate::config::Settings;

    fn two_blank_prompt() -> Card {
        Card::prompt("%s meets %s.")
    }

    #[test]
    fn test_format_answer_fills_blanks_in_order() {
        let cards = [Card::response("Cats"), Card::response("Dogs")];
        assert_eq!(format_answer(&two_blank_prompt(), &cards), "Cats meets Dogs.");
    }

    #[test]
    fn test_format_answer_appends_extra_cards() {
        let prompt = Card::prompt("What's my superpower?");
        let cards = [Card::response("Jazz hands")];
        assert_eq!(format_answer(&prompt, &cards), "What's my superpower? Jazz hands");
    }

    #[test]
    fn test_format_answer_marks_missing_cards() {
        let cards = [Card::response("Cats")];
        assert_eq!(format_answer(&two_blank_prompt(), &cards), "Cats meets ___.");
    }

    #[test]
    fn test_take_cards_keeps_requested_order() {
        let mut player = Player::new("Bob");
        for i in 0..5 {
            player.add_card(Card::response(format!("Card {}", i)));
        }
        let cards = take_cards(&mut player, &[1, 3]).unwrap();
        let texts: Vec<_> = cards.iter().map(Card::text).collect();
        assert_eq!(texts, vec!["Card 1", "Card 3"]);

        let cards = take_cards(&mut player, &[2, 0]).unwrap();
        let texts: Vec<_> = cards.iter().map(Card::text).collect();
        assert_eq!(texts, vec!["Card 4", "Card 0"]);
        assert_eq!(player.hand_len(), 1);
    }

    #[test]
    fn test_round_start_announcements() {
        let mut game = game();
        chat(&mut game, "Bob", "start");
        chat(&mut game, "Joe", "join");
        let out = chat(&mut game, "Jim", "join");

        assert_eq!(out[0].text, "Welcome Jim! We have enough players, let the game begin!");
        assert_eq!(out[1].text, "Round 1! Bob is the card czar.");
        assert!(out[2].text.starts_with("The card is: Prompt "));
        assert!(private_to(&out, "Bob").is_empty());
        assert_eq!(private_to(&out, "Joe").len(), 1);
        assert_eq!(private_to(&out, "Jim").len(), 1);
    }

    #[test]
    fn test_play_confirms_privately() {
        let mut game = three_player_game();
        let first = game.player("Joe").unwrap().hand()[0].text().to_string();
        let out = chat(&mut game, "Joe", "play 0");
        assert_eq!(private_to(&out, "Joe").len(), 1);
        assert!(private_to(&out, "Joe")[0].starts_with("You played: "));
        assert!(private_to(&out, "Joe")[0].contains(&first));
        assert_eq!(game.player("Joe").unwrap().hand_len(), 4);
    }

    #[test]
    fn test_czar_cannot_play() {
        let mut game = three_player_game();
        let out = chat(&mut game, "Bob", "play 0");
        assert_eq!(texts(&out), vec!["The card czar can't play a card this round."]);
        assert!(!game.answers().contains_key("Bob"));
        assert_eq!(game.player("Bob").unwrap().hand_len(), 5);
    }

    #[test]
    fn test_double_play_leaves_hand_intact() {
        let mut game = three_player_game();
        chat(&mut game, "Joe", "play 0");
        let before = game.player("Joe").unwrap().hand().to_vec();

        let out = chat(&mut game, "Joe", "play 1");
        assert_eq!(texts(&out), vec!["You've already played this round."]);
        assert_eq!(game.player("Joe").unwrap().hand(), before.as_slice());
    }

    #[test]
    fn test_wrong_card_count_is_refused() {
        let mut game = three_player_game();
        let out = chat(&mut game, "Joe", "play 0 1");
        assert_eq!(texts(&out), vec!["You need to play 1 answer, not 2."]);
        assert_eq!(game.player("Joe").unwrap().hand_len(), 5);
        assert!(game.answers().is_empty());
    }

    #[test]
    fn test_out_of_range_card_is_refused() {
        let mut game = three_player_game();
        let out = chat(&mut game, "Joe", "play 7");
        assert_eq!(
            texts(&out),
            vec!["That's not a card in your hand. Use numbers from 0 to 4, each card once."]
        );
        assert_eq!(game.player("Joe").unwrap().hand_len(), 5);
    }

    #[test]
    fn test_pick_two_takes_both_cards() {
        let mut game = game_with(settings(), deck_cards(10, 2, 60));
        chat(&mut game, "Bob", "start");
        chat(&mut game, "Joe", "join");
        chat(&mut game, "Jim", "join");

        let out = chat(&mut game, "Joe", "play 1 1");
        assert!(texts(&out)[0].starts_with("That's not a card"));

        let hand: Vec<String> = game.player("Joe").unwrap().hand()[..2]
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        chat(&mut game, "Joe", "play 1 0");
        assert_eq!(game.player("Joe").unwrap().hand_len(), 3);

        let cards = &game.answers()["Joe"];
        assert_eq!(cards[0].text(), hand[1]);
        assert_eq!(cards[1].text(), hand[0]);
    }

    #[test]
    fn test_play_outside_answering_is_refused() {
        let mut game = game();
        chat(&mut game, "Bob", "start");
        let out = run(&mut game, Command::Play, vec![0], "Bob");
        assert_eq!(texts(&out), vec!["We're not taking answers right now."]);
    }

    #[test]
    fn test_all_answers_in_moves_to_judging() {
        let mut game = three_player_game();
        chat(&mut game, "Joe", "play 0");
        assert_eq!(game.status(), GameStatus::WaitingForAnswers);

        let out = chat(&mut game, "Jim", "play 0");
        assert_eq!(game.status(), GameStatus::WaitingForJudge);
        assert_eq!(game.answer_order().len(), 2);
        assert_eq!(out.last().unwrap().to, crate::types::Destination::Channel("#cards".to_string()));

        let public = texts(&out);
        assert!(public.contains(&"All cards have been played! Bob, pick the winner:"));
        assert!(public.iter().any(|t| t.starts_with("[0] ")));
        assert!(public.iter().any(|t| t.starts_with("[1] ")));

        let mut ordered: Vec<&String> = game.answer_order().values().collect();
        ordered.sort();
        assert_eq!(ordered, vec!["Jim", "Joe"]);
    }

    #[test]
    fn test_play_after_judging_started() {
        let mut game = three_player_game();
        everyone_plays(&mut game);
        let out = chat(&mut game, "Joe", "play 0");
        assert_eq!(texts(&out), vec!["We're not taking answers right now."]);
    }

    #[test]
    fn test_full_round_resolution() {
        let mut game = three_player_game();
        everyone_plays(&mut game);
        let expected_winner = game.answer_order()[&0].clone();

        let out = chat(&mut game, "Bob", "winner 0");
        assert!(out[0].text.starts_with(&format!("Winner is: {} with ", expected_winner)));
        assert_eq!(game.player(&expected_winner).unwrap().round_wins, 1);
        assert_eq!(game.czar().unwrap().nick(), "Joe");
        assert_eq!(game.round_number(), 2);
        assert_eq!(game.status(), GameStatus::WaitingForAnswers);
        for nick in ["Bob", "Joe", "Jim"] {
            assert_eq!(game.player(nick).unwrap().hand_len(), 5);
        }
        assert!(texts(&out).contains(&"Round 2! Joe is the card czar."));
    }

    #[test]
    fn test_pick_resolves_to_winner_while_judging() {
        let mut game = three_player_game();
        everyone_plays(&mut game);
        chat(&mut game, "Bob", "pick 1");
        assert_eq!(game.round_number(), 2);
    }

    #[test]
    fn test_only_czar_picks() {
        let mut game = three_player_game();
        everyone_plays(&mut game);
        let out = chat(&mut game, "Joe", "winner 0");
        assert_eq!(texts(&out), vec!["Only the card czar can pick the winner."]);
        assert_eq!(game.status(), GameStatus::WaitingForJudge);
    }

    #[test]
    fn test_winner_before_judging() {
        let mut game = three_player_game();
        let out = chat(&mut game, "Bob", "winner 0");
        assert_eq!(texts(&out), vec!["There's nothing to judge yet."]);
    }

    #[test]
    fn test_invalid_pick() {
        let mut game = three_player_game();
        everyone_plays(&mut game);
        let out = chat(&mut game, "Bob", "winner 5");
        assert_eq!(texts(&out), vec!["There's no answer number 5."]);
        assert_eq!(game.status(), GameStatus::WaitingForJudge);
    }

    #[test]
    fn test_czar_never_answers() {
        let mut game = three_player_game();
        for _ in 0..4 {
            let czar = game.czar().unwrap().nick().to_string();
            chat(&mut game, &czar, "play 0");
            assert!(!game.answers().contains_key(&czar));
            everyone_plays(&mut game);
            assert!(!game.answers().contains_key(&czar));
            if game.status() != GameStatus::WaitingForJudge {
                break;
            }
            chat(&mut game, &czar, "winner 0");
            if game.status() == GameStatus::Inactive {
                break;
            }
        }
    }

    #[test]
    fn test_game_winner_ends_game() {
        let mut game = three_player_game();
        let mut rounds = 0;
        while game.status() != GameStatus::Inactive {
            everyone_plays(&mut game);
            let czar = game.czar().unwrap().nick().to_string();
            let out = run(&mut game, Command::Winner, vec![0], &czar);
            rounds += 1;
            if game.status() == GameStatus::Inactive {
                let public = texts(&out);
                assert!(public.iter().any(|t| t.contains("wins the game with 2 points!")));
                assert_eq!(
                    public.last().copied(),
                    Some("Cards Against Humanity is ready. Type 'start' to begin a game.")
                );
            }
            assert!(rounds <= 4, "someone must reach two points within four rounds");
        }
        assert!(game.players().is_empty());
        assert_eq!(game.round_number(), 0);
    }

    #[test]
    fn test_running_out_of_prompts_is_fatal() {
        let mut game = game_with(settings(), deck_cards(1, 1, 60));
        chat(&mut game, "Bob", "start");
        chat(&mut game, "Joe", "join");
        chat(&mut game, "Jim", "join");
        everyone_plays(&mut game);

        let parsed = game
            .parse(&crate::types::ChatMessage::public("Bob", "winner 0"))
            .unwrap();
        let err = game.execute(parsed).unwrap_err();
        assert!(matches!(err, GameError::Deck(_)));
        game.abort(&err);
        assert_eq!(game.status(), GameStatus::Inactive);
    }

    #[test]
    fn test_cards_command_is_private() {
        let mut game = three_player_game();
        let out = chat(&mut game, "Joe", "cards");
        assert_eq!(private_to(&out, "Joe").len(), 2);
        assert!(private_to(&out, "Joe")[0].starts_with("The card is: "));
        assert!(private_to(&out, "Joe")[1].starts_with("Your cards: [0] Answer "));
    }

    #[test]
    fn test_cards_before_game() {
        let mut game = game();
        chat(&mut game, "Bob", "start");
        let out = chat(&mut game, "Bob", "cards");
        assert_eq!(
            texts(&out),
            vec!["The game hasn't started yet. Type 'start' to begin."]
        );
    }

    #[test]
    fn test_deal_is_round_robin() {
        let settings = Settings {
            hand_size: 2,
            ..settings()
        };
        let cards = vec![
            Card::prompt("%s?"),
            Card::response("A"),
            Card::response("B"),
            Card::response("C"),
            Card::response("D"),
            Card::response("E"),
            Card::response("F"),
        ];
        // The deck is shuffled on start; every card is dealt exactly once
        let mut game = game_with(settings, cards);
        chat(&mut game, "Bob", "start");
        chat(&mut game, "Joe", "join");
        chat(&mut game, "Jim", "join");

        let mut dealt: Vec<String> = game
            .players()
            .iter()
            .flat_map(|p| p.hand().iter().map(|c| c.text().to_string()))
            .collect();
        dealt.sort();
        assert_eq!(dealt, vec!["A", "B", "C", "D", "E", "F"]);
    }
}
