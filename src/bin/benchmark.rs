use clap::Parser;
use geodesic_y::config::{DEFAULT_DEPTH, DEFAULT_TRIALS};
use geodesic_y::{
    Agent, AgentConfig, AgentKind, AgentWrapper, Board, GameConfig, GameController, GameError,
    Player,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays a series of Y games between two agents", long_about = None)]
struct Args {
    /// Board base size (default: 5)
    #[arg(long, default_value_t = 5)]
    base_size: usize,

    /// Number of games to play (default: 20)
    #[arg(long, default_value_t = 20)]
    games: u32,

    /// Agent playing black
    #[arg(long, value_enum, default_value_t = AgentKind::Negamax)]
    black: AgentKind,

    /// Agent playing white
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    white: AgentKind,

    /// Negamax depth for black
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    black_depth: u32,

    /// Negamax depth for white
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    white_depth: u32,

    /// Trials or iterations per move for black
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    black_trials: u32,

    /// Trials or iterations per move for white
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    white_trials: u32,

    /// Base seed; game `i` uses `seed + 2 * i` for black and one more for white
    #[arg(long)]
    seed: Option<u64>,
}

/// Forwards to an agent while timing its decisions.
struct Timed<'a> {
    inner: &'a mut AgentWrapper,
    thinking: Duration,
    moves: u32,
}

impl Agent for Timed<'_> {
    fn color(&self) -> Player {
        self.inner.color()
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        let start = Instant::now();
        let cell = self.inner.select_move(board)?;
        self.thinking += start.elapsed();
        self.moves += 1;
        Ok(cell)
    }

    fn observe_opponent_move(&mut self, cell: usize) -> Result<(), GameError> {
        self.inner.observe_opponent_move(cell)
    }

    fn observe_history(&mut self, cells: &[usize]) -> Result<(), GameError> {
        self.inner.observe_history(cells)
    }
}

#[derive(Default)]
struct SideStats {
    wins: u32,
    thinking: Duration,
    moves: u32,
}

impl SideStats {
    fn average_move(&self) -> Duration {
        if self.moves == 0 {
            Duration::ZERO
        } else {
            self.thinking / self.moves
        }
    }
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if args.black == AgentKind::Human || args.white == AgentKind::Human {
        eprintln!("error: the benchmark only runs computer agents");
        std::process::exit(2);
    }

    let black = AgentConfig::from_kind(args.black, args.black_depth, args.black_trials);
    let white = AgentConfig::from_kind(args.white, args.white_depth, args.white_trials);

    println!("Geodesic Y - Benchmark Tool");
    println!("===========================");
    println!("Base size: {}", args.base_size);
    println!("Games: {}", args.games);
    println!("Black: {}", black.label());
    println!("White: {}", white.label());
    println!("---------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    match run_series(&args, black, white) {
        Ok(stats) => print_stats(&stats, &args, black, white),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run_series(args: &Args, black: AgentConfig, white: AgentConfig) -> Result<[SideStats; 2], GameError> {
    let mut stats = [SideStats::default(), SideStats::default()];
    let start = Instant::now();

    for game in 0..args.games {
        let config = GameConfig {
            base_size: args.base_size,
            black,
            white,
            seed: args.seed.map(|seed| seed.wrapping_add(2 * game as u64)),
        };
        config.validate()?;

        let mut controller = GameController::new(config.base_size)?;
        let geometry = Arc::clone(controller.board().geometry());
        let mut black_agent = AgentWrapper::from_config(black, Player::Black, &geometry, config.seed_for(0))?;
        let mut white_agent = AgentWrapper::from_config(white, Player::White, &geometry, config.seed_for(1))?;

        let mut timed_black = Timed { inner: &mut black_agent, thinking: Duration::ZERO, moves: 0 };
        let mut timed_white = Timed { inner: &mut white_agent, thinking: Duration::ZERO, moves: 0 };
        let winner = controller.run(&mut timed_black, &mut timed_white)?;

        for (side, timed) in [(0, &timed_black), (1, &timed_white)] {
            stats[side].thinking += timed.thinking;
            stats[side].moves += timed.moves;
        }
        stats[winner.index()].wins += 1;
        println!(
            "Game {:>3}: {} wins in {} moves",
            game + 1,
            winner,
            controller.move_count()
        );
    }

    println!("Total time: {:.3}s", start.elapsed().as_secs_f64());
    Ok(stats)
}

fn print_stats(stats: &[SideStats; 2], args: &Args, black: AgentConfig, white: AgentConfig) {
    println!("\nResults:");
    for (player, config, side) in [(Player::Black, black, &stats[0]), (Player::White, white, &stats[1])] {
        let rate = if args.games == 0 {
            0.0
        } else {
            100.0 * side.wins as f64 / args.games as f64
        };
        println!("  {} ({}):", player, config.label());
        println!("    Wins: {} ({:.1}%)", side.wins, rate);
        println!("    Moves: {}", side.moves);
        println!("    Avg move time: {:.3}ms", side.average_move().as_secs_f64() * 1000.0);
    }
}
