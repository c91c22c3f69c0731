//! Performance benchmarks for the cauldron engine
//!
//! Two iteration modes:
//!
//! 1. **Fresh** - build a new game from the tables for each iteration
//! 2. **Snapshot** - clone a pre-built game state for each iteration
//!
//! Both play a full 9-round game, heuristic vs random, on the built-in tables.

use cauldron::{
    core::PlayerId,
    game::{
        GameLoop, GameResult, GameState, HeuristicController, PlayerController,
        RandomController, VerbosityLevel,
    },
    loader::{GameInitializer, GameSetup, GameTables},
    Result,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};

/// Metrics collected during game execution
#[derive(Debug, Clone)]
struct GameMetrics {
    rounds: u32,
    /// Public log lines written
    log_lines: usize,
    duration: Duration,
}

impl GameMetrics {
    fn games_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn log_lines_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.log_lines as f64 / self.rounds as f64
        }
    }
}

fn setup() -> GameSetup {
    GameSetup::new(vec!["Player 1".to_string(), "Player 2".to_string()]).quiet()
}

fn controllers(seed: u64) -> Vec<Box<dyn PlayerController>> {
    vec![
        Box::new(HeuristicController::new(PlayerId::new(0))),
        Box::new(RandomController::with_seed(PlayerId::new(1), seed + 1)),
    ]
}

fn play(game: &mut GameState, tables: &GameTables, seed: u64) -> Result<GameResult> {
    let mut controllers = controllers(seed);
    let mut game_loop = GameLoop::new(game, seed)
        .with_prices(tables.price_table())
        .with_verbosity(VerbosityLevel::Silent);
    game_loop.run_game(&mut controllers)
}

fn run_game_with_metrics(tables: &GameTables, seed: u64) -> Result<GameMetrics> {
    let start = Instant::now();
    let mut game = GameInitializer::new(tables).init_game(&setup())?;
    let result = play(&mut game, tables, seed)?;

    Ok(GameMetrics {
        rounds: result.rounds_played,
        log_lines: game.logger.logs().len(),
        duration: start.elapsed(),
    })
}

fn bench_game_fresh(c: &mut Criterion) {
    let tables = GameTables::default();
    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    println!("\nWarmup game (seed {seed}):");
    if let Ok(metrics) = run_game_with_metrics(&tables, seed) {
        println!("  Rounds: {}", metrics.rounds);
        println!("  Log lines: {}", metrics.log_lines);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Games/sec: {:.2}", metrics.games_per_sec());
        println!("  Log lines/round: {:.2}", metrics.log_lines_per_round());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| {
            run_game_with_metrics(&tables, black_box(seed))
                .expect("Game should complete successfully")
        });
    });

    group.finish();
}

fn bench_game_snapshot(c: &mut Criterion) {
    let tables = GameTables::default();
    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    let initial_game = GameInitializer::new(&tables)
        .init_game(&setup())
        .expect("Failed to initialize game");

    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| {
            let mut game = initial_game.clone();
            play(&mut game, &tables, black_box(seed)).expect("Game should complete successfully")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_game_fresh, bench_game_snapshot);
criterion_main!(benches);
