//! NoGo-RAVE: a Monte Carlo Tree Search engine for capture Go and NoGo.
//!
//! ## Usage
//!
//! - `nogo-rave` - Answer one JSON request from stdin
//! - `nogo-rave lines` - Answer one line-encoded request from stdin
//! - `nogo-rave demo` - Play a few moves and run a search
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nogo_rave::board::{Rules, str_coord};
use nogo_rave::config::SearchConfig;
use nogo_rave::game::Game;
use nogo_rave::mcts::auto_search;
use nogo_rave::protocol::{Engine, Format};

/// NoGo-RAVE: a Monte Carlo Tree Search engine with RAVE
#[derive(Parser)]
#[command(name = "nogo-rave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ruleset. The host protocol plays NoGo, where capturing is illegal
    #[arg(long, value_enum, default_value_t = Rules::NoCapture, global = true)]
    rules: Rules,

    /// JSON search configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Time limit per move in milliseconds (0 = none)
    #[arg(long, global = true)]
    time_ms: Option<u64>,

    /// Iteration cap per move (0 = none)
    #[arg(long, global = true)]
    iterations: Option<usize>,

    /// Random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one JSON request from stdin
    Json,
    /// Answer one line-encoded request from stdin
    Lines,
    /// Run a simple demo of the engine
    Demo,
}

impl Cli {
    fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_path(path)?,
            None => SearchConfig::default(),
        };
        if let Some(ms) = self.time_ms {
            config = config.with_time_limit_ms(ms);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_max_iterations(iterations);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.search_config()?;

    let format = match cli.command {
        Some(Commands::Demo) => return run_demo(cli.rules, &config),
        Some(Commands::Lines) => Format::Lines,
        Some(Commands::Json) | None => Format::Json,
    };
    let mut engine = Engine::new(cli.rules, config);
    engine
        .run(format, io::stdin().lock(), io::stdout().lock())
        .context("answering request")?;
    Ok(())
}

fn run_demo(rules: Rules, config: &SearchConfig) -> anyhow::Result<()> {
    println!("NoGo-RAVE ({rules:?} rules)\n");

    let history = [(2, 2), (6, 6), (2, 3), (6, 5)];
    let game = Game::replay(&history, rules)?;
    println!("After {} moves, {} to play:", game.placed, game.to_move);
    println!("{}", game.board);

    let mut rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let round = game.placed / 2 + 1;
    let report = auto_search(&game.board, game.to_move, round, config, &mut rng)?;

    match report.best_move {
        Some(pt) => println!("Best move: {}", str_coord(pt)),
        None => println!("Best move: none"),
    }
    println!("Win rate: {:.1}%", report.win_rate * 100.0);
    println!(
        "{} iterations, {} nodes, {} evaluator, {} ms",
        report.iterations,
        report.tree_nodes,
        report.evaluator,
        report.elapsed.as_millis()
    );
    Ok(())
}
