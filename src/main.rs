//! Cauldron - Main Binary
//!
//! Plays a game of the bag-building chip game from the command line, runs
//! batch simulations, and dumps the built-in tables.

use anyhow::{bail, Context, Result};
use cauldron::{
    core::PlayerId,
    game::{
        FixedScriptController, GameLoop, HeuristicController, OutputFormat, OutputMode,
        PlayerController, RandomController, VerbosityLevel,
    },
    loader::{parse_bag_recipe, GameInitializer, GameSetup, GameTables},
    tournament::{self, TournamentConfig},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Controller type for a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ControllerType {
    /// Makes random choices
    Random,
    /// Press-your-luck AI that stops when the bust risk gets too high
    Heuristic,
    /// Fixed script controller with predetermined choices (requires --fixed-inputs)
    Fixed,
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

/// `<SEAT>=<VALUE>` pair, seats counted from 1
#[derive(Debug, Clone)]
struct SeatArg {
    seat: usize,
    value: String,
}

impl std::str::FromStr for SeatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (seat, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <SEAT>=<VALUE>, got '{s}'"))?;
        let seat: usize = seat
            .trim()
            .parse()
            .map_err(|_| format!("invalid seat number '{seat}'"))?;
        if seat == 0 {
            return Err("seats are numbered from 1".to_string());
        }
        Ok(SeatArg {
            seat: seat - 1,
            value: value.to_string(),
        })
    }
}

#[derive(Parser)]
#[command(name = "cauldron")]
#[command(about = "Cauldron - bag-building chip game engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and print the public log
    Play {
        /// Player names in seat order
        #[arg(long, value_delimiter = ',', default_value = "Player 1,Player 2")]
        players: Vec<String>,

        /// Controller per seat; missing seats use the last one given
        #[arg(long, value_enum, value_delimiter = ',', default_value = "heuristic")]
        controllers: Vec<ControllerType>,

        /// Fixed script for a seat, e.g. `1=0,1,0,0` (space or comma separated choices)
        #[arg(long, value_name = "SEAT=CHOICES")]
        fixed_inputs: Vec<SeatArg>,

        /// Starting bag for a seat, e.g. `2=4 gray:1, 2 gray:2, 1 orange:1`
        #[arg(long, value_name = "SEAT=RECIPE")]
        bag: Vec<SeatArg>,

        /// Starting track position for a seat, e.g. `2=1`
        #[arg(long, value_name = "SEAT=POS")]
        start_position: Vec<SeatArg>,

        /// Rubies every player starts with
        #[arg(long, default_value_t = 2)]
        starting_rubies: u32,

        /// Set random seed for deterministic games
        #[arg(long)]
        seed: Option<u64>,

        /// Number of rounds
        #[arg(long, default_value_t = 9)]
        rounds: u32,

        /// Bust-color limit before round modifiers
        #[arg(long, default_value_t = 7)]
        limit: u32,

        /// Allow returning the whole palm instead of committing a chip
        #[arg(long)]
        palm_return: bool,

        /// JSON tables file (missing tables fall back to the built-in ones)
        #[arg(long, value_name = "TABLES_FILE")]
        tables: Option<PathBuf>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Echo log lines as JSON objects instead of text
        #[arg(long)]
        json: bool,

        /// Write the complete public log as JSON lines to this file
        #[arg(long, value_name = "LOG_FILE")]
        log_output: Option<PathBuf>,
    },

    /// Run many silent games in parallel and report per-seat statistics
    Simulate {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Tournament seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Controller per seat (random or heuristic)
        #[arg(long, value_enum, value_delimiter = ',', default_value = "heuristic,random")]
        controllers: Vec<ControllerType>,

        /// Number of rounds
        #[arg(long, default_value_t = 9)]
        rounds: u32,

        /// Bust-color limit before round modifiers
        #[arg(long, default_value_t = 7)]
        limit: u32,

        /// JSON tables file
        #[arg(long, value_name = "TABLES_FILE")]
        tables: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in tables as JSON (a starting point for a tables file)
    Tables {
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            players,
            controllers,
            fixed_inputs,
            bag,
            start_position,
            starting_rubies,
            seed,
            rounds,
            limit,
            palm_return,
            tables,
            verbosity,
            json,
            log_output,
        } => {
            let options = PlayOptions {
                players,
                controllers,
                fixed_inputs,
                bags: bag,
                start_positions: start_position,
                starting_rubies,
                seed,
                rounds,
                limit,
                palm_return,
                verbosity: verbosity.into(),
                json,
            };
            run_play(&load_tables(tables.as_deref())?, options, log_output)?
        }
        Commands::Simulate {
            games,
            seed,
            controllers,
            rounds,
            limit,
            tables,
            json,
        } => run_simulate(
            &load_tables(tables.as_deref())?,
            games,
            seed,
            &controllers,
            rounds,
            limit,
            json,
        )?,
        Commands::Tables { output } => {
            let text = serde_json::to_string_pretty(&GameTables::default())
                .context("failed to serialize the built-in tables")?;
            match output {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{text}"),
            }
        }
    }

    Ok(())
}

fn load_tables(path: Option<&Path>) -> Result<GameTables> {
    match path {
        Some(path) => GameTables::load_from_file(path)
            .with_context(|| format!("failed to load tables from {}", path.display())),
        None => Ok(GameTables::default()),
    }
}

struct PlayOptions {
    players: Vec<String>,
    controllers: Vec<ControllerType>,
    fixed_inputs: Vec<SeatArg>,
    bags: Vec<SeatArg>,
    start_positions: Vec<SeatArg>,
    starting_rubies: u32,
    seed: Option<u64>,
    rounds: u32,
    limit: u32,
    palm_return: bool,
    verbosity: VerbosityLevel,
    json: bool,
}

fn run_play(tables: &GameTables, options: PlayOptions, log_output: Option<PathBuf>) -> Result<()> {
    if options.players.is_empty() {
        bail!("at least one player is required");
    }
    let seat_count = options.players.len();
    let check_seat = |arg: &SeatArg| -> Result<()> {
        if arg.seat >= seat_count {
            bail!("seat {} does not exist ({} players)", arg.seat + 1, seat_count);
        }
        Ok(())
    };

    let mut setup = GameSetup::new(options.players.clone())
        .with_starting_rubies(options.starting_rubies)
        .with_logging(options.verbosity, OutputMode::Stdout);
    for arg in &options.bags {
        check_seat(arg)?;
        let recipe = parse_bag_recipe(&arg.value)
            .with_context(|| format!("invalid bag for seat {}", arg.seat + 1))?;
        setup = setup.with_bag(arg.seat, recipe);
    }
    for arg in &options.start_positions {
        check_seat(arg)?;
        let position: u32 = arg
            .value
            .trim()
            .parse()
            .with_context(|| format!("invalid start position for seat {}", arg.seat + 1))?;
        setup = setup.with_start_position(arg.seat, position);
    }
    for arg in &options.fixed_inputs {
        check_seat(arg)?;
    }

    let seed = options.seed.unwrap_or_else(rand::random);
    let mut game = GameInitializer::new(tables)
        .init_game(&setup)
        .context("failed to set up the game")?;
    if options.json {
        game.logger.set_output_format(OutputFormat::Json);
    }
    println!("Using seed: {seed}");

    let mut controllers: Vec<Box<dyn PlayerController>> = Vec::with_capacity(seat_count);
    for (seat, player) in game.player_ids().into_iter().enumerate() {
        let kind = options
            .controllers
            .get(seat)
            .or_else(|| options.controllers.last())
            .copied()
            .unwrap_or(ControllerType::Heuristic);
        controllers.push(make_controller(kind, player, seat, seed, &options.fixed_inputs)?);
    }

    let result = {
        let mut game_loop = GameLoop::new(&mut game, seed)
            .with_rounds(options.rounds)
            .with_draw_limit(options.limit)
            .with_palm_return(options.palm_return)
            .with_prices(tables.price_table())
            .with_verbosity(options.verbosity);
        game_loop.run_game(&mut controllers)?
    };

    if let Some(path) = log_output {
        let lines = game.logger.to_json_lines()?;
        std::fs::write(&path, lines)
            .with_context(|| format!("failed to write log to {}", path.display()))?;
    }

    println!("\n=== Game Over ===");
    for standing in &result.standings {
        let marker = if result.winners.contains(&standing.player) {
            " (winner)"
        } else {
            ""
        };
        println!(
            "  {}: {} points, {} coins, {} rubies{marker}",
            standing.name, standing.score, standing.coins, standing.rubies
        );
    }
    println!("Rounds played: {}", result.rounds_played);
    Ok(())
}

fn make_controller(
    kind: ControllerType,
    player: PlayerId,
    seat: usize,
    seed: u64,
    fixed_inputs: &[SeatArg],
) -> Result<Box<dyn PlayerController>> {
    Ok(match kind {
        ControllerType::Random => Box::new(RandomController::with_seed(
            player,
            seed.wrapping_add(0x1234_5678_9ABC_DEF0 ^ seat as u64),
        )),
        ControllerType::Heuristic => Box::new(HeuristicController::new(player)),
        ControllerType::Fixed => {
            let Some(arg) = fixed_inputs.iter().find(|arg| arg.seat == seat) else {
                bail!("seat {} uses the fixed controller but has no --fixed-inputs", seat + 1);
            };
            let script = FixedScriptController::parse_script(&arg.value)
                .with_context(|| format!("invalid fixed inputs for seat {}", seat + 1))?;
            Box::new(FixedScriptController::new(player, script))
        }
    })
}

fn run_simulate(
    tables: &GameTables,
    games: usize,
    seed: u64,
    controllers: &[ControllerType],
    rounds: u32,
    limit: u32,
    json: bool,
) -> Result<()> {
    let seats = controllers
        .iter()
        .map(|kind| match kind {
            ControllerType::Random => Ok(tournament::ControllerType::Random),
            ControllerType::Heuristic => Ok(tournament::ControllerType::Heuristic),
            ControllerType::Fixed => bail!("the fixed controller cannot be used in simulations"),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut config = TournamentConfig::new(games, seed, seats);
    config.rounds = rounds;
    config.draw_limit = limit;

    if !json {
        println!("=== Cauldron - Simulation ===\n");
        println!("Running {games} games with seed {seed}");
    }
    let report = tournament::run_tournament(tables, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        tournament::print_report(&report);
    }
    Ok(())
}
