//! Property tests for chip accounting
//!
//! Random sequences of zone transitions (legal and illegal) must never lose,
//! duplicate, or misplace a chip, and a failed action must change nothing.

use cauldron::core::{Board, BoardField, ChipId, ChipType, ChipTypeId, Color, PlayerId};
use cauldron::game::{GameLoop, GameState, OutputMode, PlayerController, RandomController};
use cauldron::loader::{GameInitializer, GameSetup, GameTables};
use cauldron::zones::Zone;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

#[derive(Debug, Clone)]
enum Op {
    Draw { player: u32, to_pot: bool },
    DrawMany { player: u32, n: usize },
    Move { player: u32, chip: u32, from: Zone, to: Zone },
    ReturnAll { player: u32, zone: Zone },
    Take { player: u32, color: Color },
    GiveBack { player: u32, chip: u32 },
}

fn zone() -> impl Strategy<Value = Zone> {
    prop_oneof![
        Just(Zone::Supply),
        Just(Zone::Bag),
        Just(Zone::Palm),
        Just(Zone::Desktop),
        Just(Zone::Pot),
    ]
}

fn color() -> impl Strategy<Value = Color> {
    prop_oneof![Just(Color::Gray), Just(Color::Orange), Just(Color::Purple)]
}

fn op() -> impl Strategy<Value = Op> {
    // Player 2 does not exist and exercises the unknown-player path
    let player = 0u32..3;
    prop_oneof![
        (player.clone(), any::<bool>()).prop_map(|(player, to_pot)| Op::Draw { player, to_pot }),
        (player.clone(), 0usize..4).prop_map(|(player, n)| Op::DrawMany { player, n }),
        (player.clone(), 0u32..22, zone(), zone())
            .prop_map(|(player, chip, from, to)| Op::Move { player, chip, from, to }),
        (player.clone(), zone()).prop_map(|(player, zone)| Op::ReturnAll { player, zone }),
        (player.clone(), color()).prop_map(|(player, color)| Op::Take { player, color }),
        (player, 0u32..22).prop_map(|(player, chip)| Op::GiveBack { player, chip }),
    ]
}

/// 20 chips: 10 gray, 8 orange, 2 purple; two players with 4 gray each
fn pool() -> GameState {
    let mut game = GameState::new(Board::new(vec![BoardField::new(0, 0, false)]), Vec::new());
    game.logger.set_output_mode(OutputMode::Memory);
    for (color, count) in [(Color::Gray, 10), (Color::Orange, 8), (Color::Purple, 2)] {
        game.add_chip_type(ChipType::new(ChipTypeId::new(color, 1), color.as_str()), count)
            .unwrap();
    }
    for name in ["Alice", "Bob"] {
        let player = game.add_player(name);
        game.give_bag_subset(player, ChipTypeId::new(Color::Gray, 1), 4)
            .unwrap();
    }
    game
}

/// Contents of every container, in order
fn snapshot(game: &GameState) -> Vec<Vec<ChipId>> {
    let mut containers = vec![game.supply().chips.clone()];
    for player in game.player_ids() {
        let zones = game.zones(player).unwrap();
        for zone in [&zones.bag, &zones.palm, &zones.desktop, &zones.pot] {
            containers.push(zone.chips.clone());
        }
    }
    containers
}

fn apply(game: &mut GameState, op: &Op, rng: &mut ChaCha12Rng) -> bool {
    let result = match *op {
        Op::Draw { player, to_pot } => {
            let to = if to_pot { Zone::Pot } else { Zone::Palm };
            game.draw_random(PlayerId::new(player), to, rng).map(|_| ())
        }
        Op::DrawMany { player, n } => game.draw_n(PlayerId::new(player), n, rng).map(|_| ()),
        Op::Move {
            player,
            chip,
            from,
            to,
        } => game.move_specific(PlayerId::new(player), ChipId::new(chip), from, to),
        Op::ReturnAll { player, zone } => game.return_all(PlayerId::new(player), zone).map(|_| ()),
        Op::Take { player, color } => game.take_from_supply(PlayerId::new(player), color).map(|_| ()),
        Op::GiveBack { player, chip } => {
            game.return_to_supply(PlayerId::new(player), ChipId::new(chip))
        }
    };
    result.is_ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every chip stays in exactly one container whatever happens
    #[test]
    fn prop_chips_are_conserved(ops in prop::collection::vec(op(), 1..60), seed in any::<u64>()) {
        let mut game = pool();
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let total = game.total_chips();

        for op in &ops {
            let before = snapshot(&game);
            let ok = apply(&mut game, op, &mut rng);
            if !ok {
                prop_assert_eq!(&before, &snapshot(&game), "failed {:?} changed state", op);
            }
            prop_assert!(game.validate_locations().is_ok(), "index broken after {:?}", op);
            let counted: usize = snapshot(&game).iter().map(Vec::len).sum();
            prop_assert_eq!(counted, total);
        }
    }

    /// Drawing never grows the bag and always empties it eventually
    #[test]
    fn prop_drawing_drains_the_bag(draws in 1usize..12, seed in any::<u64>()) {
        let mut game = pool();
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let alice = PlayerId::new(0);

        let mut last = game.zones(alice).unwrap().bag.len();
        for _ in 0..draws {
            let drawn = game.draw_n(alice, 1, &mut rng).unwrap();
            let now = game.zones(alice).unwrap().bag.len();
            prop_assert_eq!(now + drawn.len(), last);
            last = now;
        }
        prop_assert_eq!(last, 4usize.saturating_sub(draws));
        prop_assert_eq!(game.zones(alice).unwrap().palm.len(), 4 - last);
    }

    /// Same seed, same chips drawn
    #[test]
    fn prop_draws_are_reproducible(seed in any::<u64>()) {
        let draw_all = |seed: u64| {
            let mut game = pool();
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            game.draw_n(PlayerId::new(0), 4, &mut rng).unwrap().to_vec()
        };
        prop_assert_eq!(draw_all(seed), draw_all(seed));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Whole games with random players keep the pool intact
    #[test]
    fn prop_random_games_conserve_chips(seed in any::<u64>()) {
        let tables = GameTables::default();
        let setup = GameSetup::new(vec!["A".into(), "B".into(), "C".into()]).quiet();
        let mut game = GameInitializer::new(&tables).init_game(&setup).unwrap();
        let total = game.total_chips();

        let mut controllers: Vec<Box<dyn PlayerController>> = game
            .player_ids()
            .into_iter()
            .map(|p| {
                Box::new(RandomController::with_seed(p, seed ^ u64::from(p.as_u32())))
                    as Box<dyn PlayerController>
            })
            .collect();
        let result = GameLoop::new(&mut game, seed)
            .with_rounds(3)
            .with_prices(tables.price_table())
            .run_game(&mut controllers);
        prop_assert!(result.is_ok(), "game failed: {:?}", result.err());

        prop_assert!(game.validate_locations().is_ok());
        let counted: usize = snapshot(&game).iter().map(Vec::len).sum();
        prop_assert_eq!(counted, total);
        for player in game.player_ids() {
            let zones = game.zones(player).unwrap();
            prop_assert!(zones.palm.is_empty());
            prop_assert!(zones.pot.is_empty());
        }
    }
}
