//! # Geodesic Y
//!
//! Command-line front end: plays one game of Y between two configured agents
//! and prints the winner and the move history.
//!
//! ## Usage
//! ```text
//! play --base-size 6 --black human --white mcts --white-trials 5000
//! play --black negamax --black-depth 3 --white external --seed 7 --show-board
//! ```
//! Diagnostics go to stderr through `tracing`; `RUST_LOG` overrides
//! `--log-level`.

use clap::Parser;
use geodesic_y::config::{DEFAULT_BASE_SIZE, DEFAULT_DEPTH, DEFAULT_TRIALS};
use geodesic_y::{
    AgentConfig, AgentKind, AgentWrapper, GameConfig, GameController, GameError, MoveResult,
    Player,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the connection game Y on a geodesic board", long_about = None)]
struct Args {
    /// Number of rings of the board (at least 2)
    #[arg(long, default_value_t = DEFAULT_BASE_SIZE)]
    base_size: usize,

    /// Agent playing black (moves first)
    #[arg(long, value_enum, default_value_t = AgentKind::Human)]
    black: AgentKind,

    /// Agent playing white
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    white: AgentKind,

    /// Negamax search depth for black
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    black_depth: u32,

    /// Negamax search depth for white
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    white_depth: u32,

    /// Monte Carlo trials (or engine iterations) per move for black
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    black_trials: u32,

    /// Monte Carlo trials (or engine iterations) per move for white
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    white_trials: u32,

    /// Seed for every random source, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the board after every move
    #[arg(long, default_value_t = false)]
    show_board: bool,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            base_size: self.base_size,
            black: AgentConfig::from_kind(self.black, self.black_depth, self.black_trials),
            white: AgentConfig::from_kind(self.white, self.white_depth, self.white_trials),
            seed: self.seed,
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: &Args) -> Result<(), GameError> {
    let config = args.game_config();
    config.validate()?;

    let mut controller = GameController::new(config.base_size)?;
    let geometry = Arc::clone(controller.board().geometry());
    let mut black = AgentWrapper::from_config(config.black, Player::Black, &geometry, config.seed_for(0))?;
    let mut white = AgentWrapper::from_config(config.white, Player::White, &geometry, config.seed_for(1))?;
    info!(
        black = %config.black.label(),
        white = %config.white.label(),
        base_size = config.base_size,
        "agents ready"
    );

    let show_board = args.show_board
        || config.black == AgentConfig::Human
        || config.white == AgentConfig::Human;
    if show_board {
        println!("{}", controller.board());
    }

    let winner = controller.run_with(&mut black, &mut white, |controller, result| {
        if let MoveResult::Success { cell, player, .. } = result {
            if show_board {
                println!("{} played {}\n{}", player, cell, controller.board());
            }
        }
    })?;

    println!("{}", controller.format_history());
    println!(
        "{} ({}) wins after {} moves",
        winner,
        agent_name(&black, &white, winner),
        controller.move_count()
    );
    Ok(())
}

fn agent_name(black: &AgentWrapper, white: &AgentWrapper, player: Player) -> &'static str {
    match player {
        Player::Black => black.kind_name(),
        Player::White => white.kind_name(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "game aborted");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
