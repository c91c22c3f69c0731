//! Drawing phase state machine for one player
//!
//! Each iteration: ask to continue, draw k chips into the palm, commit one of
//! them (the rest go straight back), offer the potion undo for bust chips,
//! advance the position tracker, offer the round's first-return option, run
//! on-commit rules, and check for an explosion. The tracker only ever grows,
//! even when a rule later pulls a chip out of the pot.

use crate::core::{ChipId, Color, PlayerId};
use crate::game::controller::{GameStateView, PalmChoice, PlayerController, MAX_PROMPTS};
use crate::game::effects::ChipRules;
use crate::game::logger::LogCategory;
use crate::game::round_context::{DrawResult, RoundContext};
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use rand::RngCore;

/// Round-wide settings of the drawing phase
pub struct Drawing<'r> {
    pub rules: &'r ChipRules,
    /// Bust limit after modifiers
    pub limit: u32,
    /// Color of the round modifier's first-return option, if one is active
    pub first_return: Option<Color>,
}

impl<'r> Drawing<'r> {
    /// Run one player's drawing sequence to its end (voluntary stop, empty
    /// bag, or explosion). The palm is empty afterwards.
    pub fn run(
        &self,
        game: &mut GameState,
        controller: &mut dyn PlayerController,
        ctx: &mut RoundContext,
        player: PlayerId,
        rng: &mut dyn RngCore,
    ) -> Result<DrawResult> {
        let track_pos = game.player(player)?.track_pos;
        let bonus = ctx.pre_draw_count(player);
        let pos_start = track_pos.saturating_add(bonus);
        let mut pos_last = pos_start;
        let mut exploded = false;

        game.logger.normal(
            LogCategory::Phase,
            &format!("--- Player {player} drawing starts ---"),
        );
        game.logger.normal(
            LogCategory::Phase,
            &format!(
                "[Player {player}] START POS | track={track_pos} + pre-draw={bonus} => start={pos_start}"
            ),
        );

        loop {
            let (bust_sum, _) = game.pot_sums(player)?;
            let keep_going = {
                let view = GameStateView::new(game, player);
                controller.wants_to_continue(&view, bust_sum, self.limit)
            };
            if !keep_going {
                game.logger
                    .controller_choice(player, "chose to stop drawing");
                break;
            }

            let count = self.ask_draw_count(game, controller, player);
            game.logger
                .controller_choice(player, &format!("chose to draw {count} chip(s)"));

            let drawn = game.draw_n(player, count, rng)?;
            if drawn.is_empty() {
                game.logger.normal(
                    LogCategory::ChipMove,
                    &format!("[Player {player}] Bag is empty. No chip drawn."),
                );
                flush_palm(game, player, "Returned leftover palm chips")?;
                break;
            }
            game.logger.normal(
                LogCategory::ChipMove,
                &format!("[Player {player}] PALM {}", game.describe_chips(&drawn)),
            );

            let Some(placed) =
                self.ask_palm_action(game, controller, ctx.allow_palm_return, player)?
            else {
                let returned = game.return_all(player, Zone::Palm)?;
                game.logger.controller_choice(
                    player,
                    &format!("chose to return the palm {}", game.describe_chips(&returned)),
                );
                continue;
            };

            game.move_specific(player, placed, Zone::Palm, Zone::Pot)?;
            game.logger.controller_choice(
                player,
                &format!("chose to commit {}", game.describe_chip(placed)),
            );
            flush_palm(game, player, "Returned remaining palm chips")?;

            let placed_color = game.chip(placed)?.color();

            if placed_color.is_bust() && game.player(player)?.potion_filled {
                let use_it = {
                    let view = GameStateView::new(game, player);
                    controller.use_potion(&view, placed)
                };
                if use_it {
                    game.move_specific(player, placed, Zone::Pot, Zone::Bag)?;
                    game.player_mut(player)?.consume_potion();
                    game.logger.controller_choice(
                        player,
                        &format!(
                            "chose to use the potion: {} back to bag, potion is now EMPTY",
                            game.describe_chip(placed)
                        ),
                    );
                    continue;
                }
                game.logger
                    .controller_choice(player, "chose to keep the potion");
            }

            let step = self.rules.effective_placement_step(game, player, placed)?;
            pos_last = pos_last.saturating_add(step);

            self.offer_first_return(game, controller, ctx, player, placed, placed_color)?;

            self.rules
                .apply_on_commit_effects(game, controller, player, placed)?;

            let (bust_sum, chip_sum) = game.pot_sums(player)?;
            let (landing_index, field) = game.board.landing(pos_last);
            game.logger.normal(
                LogCategory::Reward,
                &format!(
                    "[Player {player}] PLACED {} step={step} | BUST_SUM={bust_sum} CHIP_SUM={chip_sum} | \
                     POS_START={pos_start} POS_LAST={pos_last} => LAND={landing_index}: coins={}, score={}, ruby={}",
                    game.describe_chip(placed),
                    field.coins,
                    field.score,
                    yes_no(field.ruby),
                ),
            );

            if bust_sum > self.limit {
                exploded = true;
                game.logger.minimal(
                    LogCategory::Reward,
                    &format!(
                        "[Player {player}] EXPLODED: BUST_SUM {bust_sum} > {}. Drawing stops.",
                        self.limit
                    ),
                );
                break;
            }
        }

        // No path should leave chips in the palm, but the round relies on it
        flush_palm(game, player, "SAFETY: Returned leftover palm chips")?;

        let (bust_sum, chip_sum) = game.pot_sums(player)?;
        let (landing_index, landing) = game.board.landing(pos_last);
        let result = DrawResult {
            player,
            pos_start,
            pos_last,
            bust_sum,
            chip_sum,
            exploded,
            landing_index,
            landing,
        };
        game.logger.normal(
            LogCategory::Reward,
            &format!(
                "[Player {player}] DRAW RESULT | POS_START={pos_start} POS_LAST={pos_last} CHIP_SUM={chip_sum} \
                 BUST_SUM={bust_sum} EXPLODED={} | LAND={landing_index} coins={} score={} ruby={}",
                yes_no(exploded),
                landing.coins,
                landing.score,
                yes_no(landing.ruby),
            ),
        );
        Ok(result)
    }

    fn ask_draw_count(
        &self,
        game: &GameState,
        controller: &mut dyn PlayerController,
        player: PlayerId,
    ) -> usize {
        for _ in 0..MAX_PROMPTS {
            let view = GameStateView::new(game, player);
            let count = controller.choose_draw_count(&view);
            if count >= 1 {
                return count;
            }
            game.logger.normal(
                LogCategory::Decision,
                &format!("Player {player}: draw count must be at least 1, choose again"),
            );
        }
        1
    }

    /// Ask for a palm action until it names a palm chip or a permitted
    /// return. `None` means the whole palm goes back to the bag.
    fn ask_palm_action(
        &self,
        game: &GameState,
        controller: &mut dyn PlayerController,
        allow_return: bool,
        player: PlayerId,
    ) -> Result<Option<ChipId>> {
        let palm = game.zones(player)?.palm.chips.clone();
        for _ in 0..MAX_PROMPTS {
            let view = GameStateView::new(game, player);
            match controller.choose_palm_action(&view, &palm, allow_return) {
                PalmChoice::ReturnAll if allow_return => return Ok(None),
                PalmChoice::ReturnAll => game.logger.normal(
                    LogCategory::Decision,
                    &format!("Player {player}: returning the palm is not allowed this round"),
                ),
                PalmChoice::Commit(idx) => match palm.get(idx) {
                    Some(&chip) => return Ok(Some(chip)),
                    None => game.logger.normal(
                        LogCategory::Decision,
                        &format!("Player {player}: palm index {idx} is out of range, choose again"),
                    ),
                },
            }
        }
        game.logger.normal(
            LogCategory::Decision,
            &format!("Player {player}: no valid palm choice, committing the first palm chip"),
        );
        Ok(palm.first().copied())
    }

    /// Offer the round modifier's once-per-round return of the first chip of
    /// its color. The option is used up whether it is accepted or declined.
    fn offer_first_return(
        &self,
        game: &mut GameState,
        controller: &mut dyn PlayerController,
        ctx: &mut RoundContext,
        player: PlayerId,
        placed: ChipId,
        placed_color: Color,
    ) -> Result<()> {
        let Some(color) = self.first_return else {
            return Ok(());
        };
        if placed_color != color || !ctx.first_return_used.insert((player, color)) {
            return Ok(());
        }

        let accept = {
            let view = GameStateView::new(game, player);
            controller.return_first_chip(&view, placed)
        };
        let described = game.describe_chip(placed);
        if accept {
            game.move_specific(player, placed, Zone::Pot, Zone::Bag)?;
            game.logger.controller_choice(
                player,
                &format!("chose to return first {color} chip {described} to bag (option used)"),
            );
        } else {
            game.logger.controller_choice(
                player,
                &format!("chose to keep first {color} chip {described} (option used)"),
            );
        }
        Ok(())
    }
}

fn flush_palm(game: &mut GameState, player: PlayerId, what: &str) -> Result<()> {
    if game.zones(player)?.palm.is_empty() {
        return Ok(());
    }
    let returned = game.return_all(player, Zone::Palm)?;
    game.logger.normal(
        LogCategory::ChipMove,
        &format!("[Player {player}] {what} to bag: {}", game.describe_chips(&returned)),
    );
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChipTypeId;
    use crate::game::scripted_controller::{Answer, ScriptedController};
    use crate::game::state::small_game;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn setup(bag: &[(Color, u8, usize)]) -> GameState {
        let mut game = small_game();
        for &(color, value, count) in bag {
            game.give_bag_subset(PlayerId::new(0), ChipTypeId::new(color, value), count)
                .unwrap();
        }
        game
    }

    fn run(
        game: &mut GameState,
        answers: Vec<Answer>,
        limit: u32,
        ctx: &mut RoundContext,
    ) -> DrawResult {
        let rules = ChipRules::standard();
        let drawing = Drawing {
            rules: &rules,
            limit,
            first_return: None,
        };
        let mut controller = ScriptedController::new(PlayerId::new(0), answers);
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        drawing
            .run(game, &mut controller, ctx, PlayerId::new(0), &mut rng)
            .unwrap()
    }

    #[test]
    fn test_stop_immediately() {
        let mut game = setup(&[(Color::Gray, 1, 3)]);
        let mut ctx = RoundContext::new(1, false);
        let result = run(&mut game, vec![Answer::Continue(false)], 7, &mut ctx);
        assert_eq!(result.pos_last, 0);
        assert_eq!(result.chip_sum, 0);
        assert!(!result.exploded);
        assert_eq!(game.zones(PlayerId::new(0)).unwrap().bag.len(), 3);
    }

    #[test]
    fn test_explodes_strictly_above_limit() {
        let mut game = setup(&[(Color::Gray, 1, 3)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![Answer::Continue(true); 3];
        let result = run(&mut game, answers, 2, &mut ctx);
        assert!(result.exploded);
        assert_eq!(result.bust_sum, 3);
        assert_eq!(result.pos_last, 3);

        // Exactly at the limit is safe
        let mut game = setup(&[(Color::Gray, 1, 3)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![Answer::Continue(true); 3];
        let result = run(&mut game, answers, 3, &mut ctx);
        assert!(!result.exploded);
        assert_eq!(result.bust_sum, 3);
    }

    #[test]
    fn test_empty_bag_ends_sequence() {
        let mut game = setup(&[(Color::Orange, 1, 1)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![Answer::Continue(true); 3];
        let result = run(&mut game, answers, 7, &mut ctx);
        assert_eq!(result.pos_last, 1);
        assert!(game
            .logger
            .messages()
            .iter()
            .any(|m| m.contains("Bag is empty")));
        assert!(game.zones(PlayerId::new(0)).unwrap().palm.is_empty());
    }

    #[test]
    fn test_pre_draw_bonus_sets_start() {
        let mut game = setup(&[(Color::Orange, 1, 1)]);
        game.player_mut(PlayerId::new(0)).unwrap().track_pos = 2;
        let mut ctx = RoundContext::new(1, false);
        ctx.pre_draw_counts = Some([(PlayerId::new(0), 3)].into_iter().collect());
        let result = run(&mut game, vec![Answer::Continue(true)], 7, &mut ctx);
        assert_eq!(result.pos_start, 5);
        assert_eq!(result.pos_last, 6);
    }

    #[test]
    fn test_draw_two_commit_second_returns_first() {
        let mut game = setup(&[(Color::Gray, 1, 1), (Color::Orange, 1, 1)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![
            Answer::Continue(true),
            Answer::DrawCount(2),
            Answer::Palm(PalmChoice::Commit(1)),
        ];
        let result = run(&mut game, answers, 7, &mut ctx);
        let zones = game.zones(PlayerId::new(0)).unwrap();
        assert_eq!(zones.pot.len(), 1);
        assert_eq!(zones.bag.len(), 1);
        assert!(zones.palm.is_empty());
        assert_eq!(result.chip_sum, 1);
        assert!(game.validate_locations().is_ok());
    }

    #[test]
    fn test_palm_return_refused_when_not_allowed() {
        let mut game = setup(&[(Color::Orange, 1, 1)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![Answer::Continue(true), Answer::Palm(PalmChoice::ReturnAll)];
        let result = run(&mut game, answers, 7, &mut ctx);
        // Invalid answer re-prompts; the scripted default commits index 0
        assert_eq!(result.pos_last, 1);
        assert!(game
            .logger
            .messages()
            .iter()
            .any(|m| m.contains("not allowed this round")));
    }

    #[test]
    fn test_palm_return_when_allowed() {
        let mut game = setup(&[(Color::Orange, 1, 1)]);
        let mut ctx = RoundContext::new(1, true);
        let answers = vec![Answer::Continue(true), Answer::Palm(PalmChoice::ReturnAll)];
        let result = run(&mut game, answers, 7, &mut ctx);
        assert_eq!(result.pos_last, 0);
        assert_eq!(game.zones(PlayerId::new(0)).unwrap().bag.len(), 1);
    }

    #[test]
    fn test_potion_undoes_bust_chip() {
        let mut game = setup(&[(Color::Gray, 1, 1)]);
        let mut ctx = RoundContext::new(1, false);
        let answers = vec![Answer::Continue(true), Answer::Potion(true)];
        let result = run(&mut game, answers, 7, &mut ctx);
        assert_eq!(result.pos_last, 0);
        assert_eq!(result.bust_sum, 0);
        let player = game.player(PlayerId::new(0)).unwrap();
        assert!(!player.potion_filled);
        assert_eq!(game.zones(PlayerId::new(0)).unwrap().bag.len(), 1);
    }

    #[test]
    fn test_first_return_consumed_once() {
        let mut game = setup(&[(Color::Gray, 1, 2)]);
        game.player_mut(PlayerId::new(0)).unwrap().consume_potion();
        let rules = ChipRules::standard();
        let drawing = Drawing {
            rules: &rules,
            limit: 7,
            first_return: Some(Color::Gray),
        };
        let mut controller = ScriptedController::new(
            PlayerId::new(0),
            vec![
                Answer::Continue(true),
                Answer::ReturnFirst(true),
                Answer::Continue(true),
                Answer::Continue(true),
                Answer::Continue(true),
            ],
        );
        let mut ctx = RoundContext::new(1, false);
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let result = drawing
            .run(&mut game, &mut controller, &mut ctx, PlayerId::new(0), &mut rng)
            .unwrap();
        // The returned chip still moved the tracker; it is drawn again later
        assert!(ctx.first_return_used.contains(&(PlayerId::new(0), Color::Gray)));
        assert_eq!(result.pos_last, 3);
        assert_eq!(result.bust_sum, 2);
        assert!(game.zones(PlayerId::new(0)).unwrap().bag.is_empty());
    }

    #[test]
    fn test_yellow_removal_keeps_the_tracker() {
        let mut game = small_game();
        game.add_chip_type(
            crate::core::ChipType::new(ChipTypeId::new(Color::Yellow, 1), "Alraune"),
            1,
        )
        .unwrap();
        let p0 = PlayerId::new(0);
        game.give_bag_subset(p0, ChipTypeId::new(Color::Gray, 1), 1)
            .unwrap();
        game.give_bag_subset(p0, ChipTypeId::new(Color::Yellow, 1), 1)
            .unwrap();
        game.player_mut(p0).unwrap().consume_potion();

        // Gray first, then yellow pulls the gray back out of the pot
        let answers = vec![
            Answer::Continue(true),
            Answer::DrawCount(2),
            Answer::CommitChip(ChipId::new(0)),
            Answer::Continue(true),
            Answer::RemovePreceding(true),
        ];
        let mut ctx = RoundContext::new(1, false);
        let rules = ChipRules::standard();
        let drawing = Drawing {
            rules: &rules,
            limit: 7,
            first_return: None,
        };
        let mut controller = ScriptedController::new(p0, answers);
        let mut rng = ChaCha12Rng::seed_from_u64(8);
        let result = drawing
            .run(&mut game, &mut controller, &mut ctx, p0, &mut rng)
            .unwrap();

        assert_eq!(controller.remaining(), 0);
        assert_eq!(result.pos_last, 2);
        assert_eq!(result.bust_sum, 0);
        assert_eq!(result.chip_sum, 1);
        let zones = game.zones(p0).unwrap();
        assert_eq!(zones.pot.chips, vec![ChipId::new(5)]);
        assert_eq!(zones.bag.chips, vec![ChipId::new(0)]);
        assert!(game.validate_locations().is_ok());
    }

    #[test]
    fn test_huge_pre_draw_bonus_saturates() {
        let mut game = setup(&[(Color::Orange, 1, 1)]);
        game.player_mut(PlayerId::new(0)).unwrap().track_pos = 1;
        let mut ctx = RoundContext::new(1, false);
        ctx.pre_draw_counts = Some([(PlayerId::new(0), u32::MAX)].into_iter().collect());
        let result = run(&mut game, vec![Answer::Continue(true)], 7, &mut ctx);
        assert_eq!(result.pos_start, u32::MAX);
        assert_eq!(result.pos_last, u32::MAX);
        // Clamped to the last of the five fields
        assert_eq!(result.landing_index, 4);
    }
}
