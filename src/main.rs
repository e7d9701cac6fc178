//! # Tic-Tac-Toe vs. MCTS
//!
//! Interactive demo front-end for the generic MCTS engine: a terminal
//! tic-tac-toe game against the search. Engine tunables (time budget, UCT
//! constant, expansion and selection thresholds, iteration floor) are exposed
//! as command line flags, and the final search tree of every engine move can
//! be dumped as a Graphviz `.dot` file for inspection.
//!
//! ## Usage
//! ```text
//! play [--time-ms 500] [--c 0.5] [--min-t 5] [--min-visits 5]
//!      [--min-iterations 0] [--engine-first] [--dot-file tree.dot]
//! ```
//! Enter moves as `x y` with coordinates in 0..=2.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use mcts::games::tictactoe::{
    Board, Player, TttAction, TttActionGenerator, TttBackpropagation, TttPlayoutGenerator,
    TttScoring, TttTerminationCheck,
};
use mcts::{graphviz, Action, Mcts};

type TttMcts = Mcts<Board, TttAction, TttActionGenerator, TttPlayoutGenerator>;

/// Play tic-tac-toe against a Monte Carlo Tree Search engine.
#[derive(Parser, Debug)]
#[command(name = "play", about = "Play tic-tac-toe against an MCTS engine")]
struct Args {
    /// Thinking time per engine move in milliseconds
    #[arg(long, default_value_t = 500)]
    time_ms: u64,

    /// Exploration constant C of the UCT formula
    #[arg(long, default_value_t = 0.5)]
    c: f32,

    /// Minimum visits before a node is expanded
    #[arg(long, default_value_t = 5)]
    min_t: i32,

    /// Minimum visits before UCT replaces random child selection
    #[arg(long, default_value_t = 5)]
    min_visits: i32,

    /// Iteration floor; the engine goes over its time budget to reach it
    #[arg(long, default_value_t = 0)]
    min_iterations: usize,

    /// Let the engine make the first move
    #[arg(long)]
    engine_first: bool,

    /// Write a Graphviz dump of each engine move's search tree to this file
    #[arg(long)]
    dot_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut board = Board::new();
    let engine_player = if args.engine_first {
        Player::Cross
    } else {
        Player::Circle
    };

    println!(
        "You are {}, the engine is {}.",
        render_player(engine_player.opponent()),
        render_player(engine_player)
    );
    print_board(&board);

    while !is_over(&board) {
        if board.current_player() == engine_player {
            let action = engine_move(&args, &board)?;
            println!("Engine plays {}", action.to_string().bold());
            action.execute(&mut board);
        } else {
            let action = read_human_move(&board)?;
            action.execute(&mut board);
        }
        print_board(&board);
    }

    match board.winner() {
        Some(p) if p == engine_player => println!("{}", "The engine wins.".red().bold()),
        Some(_) => println!("{}", "You win!".green().bold()),
        None => println!("{}", "Draw.".yellow().bold()),
    }

    Ok(())
}

/// Runs one full search session for the current board and returns the chosen
/// action, optionally dumping the finished tree.
fn engine_move(args: &Args, board: &Board) -> io::Result<TttAction> {
    let player = board.current_player();
    let mut engine: TttMcts = Mcts::new(
        board.clone(),
        Box::new(TttBackpropagation::new(player)),
        Box::new(TttTerminationCheck),
        Box::new(TttScoring::new(player)),
    );
    engine.set_time(Duration::from_millis(args.time_ms));
    engine.set_c(args.c);
    engine.set_min_t(args.min_t);
    engine.set_min_visits(args.min_visits);
    engine.set_min_iterations(args.min_iterations);

    let action = engine.calculate_action();

    if let Some(path) = &args.dot_file {
        let mut file = File::create(path)?;
        graphviz::write_dot_file(engine.tree(), &mut file)?;
        println!(
            "({} iterations, {} nodes, tree written to {})",
            engine.iterations(),
            engine.tree().len(),
            path.display()
        );
    }

    Ok(action)
}

/// Prompts until the human enters a legal `x y` move.
fn read_human_move(board: &Board) -> io::Result<TttAction> {
    let stdin = io::stdin();
    loop {
        print!("Your move (x y): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF: treat as a resignation-free exit.
            std::process::exit(0);
        }

        let mut parts = line.split_whitespace().map(|p| p.parse::<usize>());
        match (parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y))) if x < 3 && y < 3 => {
                if board.position(x, y).is_none() {
                    return Ok(TttAction::new(x, y));
                }
                println!("{}", "That square is taken.".red());
            }
            _ => println!("{}", "Enter two numbers in 0..=2, e.g. `1 2`.".red()),
        }
    }
}

fn is_over(board: &Board) -> bool {
    board.winner().is_some() || board.turns() == 9
}

fn render_player(player: Player) -> String {
    match player {
        Player::Cross => "x".red().bold().to_string(),
        Player::Circle => "o".blue().bold().to_string(),
    }
}

/// Prints the board with colored markers and axis labels.
fn print_board(board: &Board) {
    println!("  0 1 2");
    for y in 0..3 {
        print!("{} ", y);
        for x in 0..3 {
            match board.position(x, y) {
                Some(p) => print!("{} ", render_player(p)),
                None => print!("{} ", "-".dimmed()),
            }
        }
        println!();
    }
}
