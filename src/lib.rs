//! # Generic Monte Carlo Tree Search Engine
//!
//! This crate implements a generic, anytime Monte Carlo Tree Search (MCTS)
//! decision engine. Given the current state of a sequential decision process,
//! [`Mcts::calculate_action`] searches for the best next action within a
//! bounded time/iteration budget by incrementally building and statistically
//! evaluating a partial lookahead tree.
//!
//! The engine itself knows nothing about any particular game. Everything
//! game-specific is supplied by the host through five capability contracts:
//!
//! - [`ActionGenerator`]: lazily enumerates the legal actions of one state
//! - [`PlayoutGenerator`]: samples one random legal action for rollouts
//! - [`TerminationCheck`]: recognizes end-of-episode states
//! - [`Scoring`]: evaluates a terminal state
//! - [`Backpropagation`]: adjusts a score per node while it travels to the root
//!
//! Host states and actions are opaque to the engine: a state only needs to be
//! [`Clone`] (an independent deep copy), and an action only needs to implement
//! [`Action`] so the engine can apply it to a cloned state.
//!
//! ## Usage
//! Implement the capability traits for your game, then drive a search:
//!
//! ```no_run
//! use mcts::Mcts;
//! use mcts::games::tictactoe::*;
//!
//! let board = Board::new();
//! let mut engine: Mcts<Board, TttAction, TttActionGenerator, TttPlayoutGenerator> = Mcts::new(
//!     board.clone(),
//!     Box::new(TttBackpropagation::new(board.current_player())),
//!     Box::new(TttTerminationCheck),
//!     Box::new(TttScoring::new(board.current_player())),
//! );
//! let action = engine.calculate_action();
//! ```
//!
//! The search is single-threaded, synchronous and blocking: one
//! `calculate_action` call occupies the caller until the time budget (and the
//! optional minimum-iteration floor) is spent. The tree lives for one search
//! session and is dropped wholesale with the engine.

pub mod games;
pub mod graphviz;
mod search;
mod tree;

pub use search::Mcts;
pub use tree::{Node, Tree};

/// An action a player can execute on a state.
///
/// An action transforms a state into its successor. For example in chess an
/// action could be to move the queen to g5. The engine never mutates a host
/// state directly: it clones the state and applies an action to the clone.
///
/// `Default` is required because the root node, which was not produced by any
/// action, stores a placeholder action that is never executed.
pub trait Action<S>: Clone + Default {
    /// Applies this action to the given state, transforming it in place.
    fn execute(&self, state: &mut S);
}

/// Lazily generates the actions available in one state.
///
/// One generator instance is embedded in every tree node, constructed from
/// that node's state when the node is created and incrementally drained over
/// the node's lifetime. Implementations must never return the same action
/// twice from one instance; beyond that, no ordering is guaranteed or
/// required.
///
/// The generator snapshots whatever it needs from the state at construction
/// time (a cursor, an occupancy mask, ...) rather than materializing every
/// legal action up front, which keeps expansion cheap for large branching
/// factors.
pub trait ActionGenerator {
    /// The state type this generator enumerates actions for.
    type State;
    /// The action type this generator produces.
    type Action;

    /// Creates a generator scoped to the given state.
    fn new(state: &Self::State) -> Self;

    /// Produces one action that has not been returned before by this
    /// instance, or `None` once the legal actions are exhausted.
    fn generate_next(&mut self) -> Option<Self::Action>;

    /// Returns true while [`generate_next`](Self::generate_next) can still
    /// produce a new action.
    fn can_generate_next(&self) -> bool;
}

/// Samples random legal actions for the playout (simulation) stage.
///
/// A fresh generator is constructed from the rollout-local state at every
/// simulation step; each call is an independent draw. Implementations MUST
/// only ever produce legal actions; an illegal action can keep a rollout
/// from terminating.
pub trait PlayoutGenerator {
    /// The state type this generator samples actions for.
    type State;
    /// The action type this generator produces.
    type Action;

    /// Creates a generator scoped to the given state.
    fn new(state: &Self::State) -> Self;

    /// Returns one randomly sampled legal action.
    fn generate_random(&mut self) -> Self::Action;
}

/// Recognizes terminal states.
pub trait TerminationCheck<S> {
    /// Returns true iff the given state has no further actions, i.e. the end
    /// of the episode is reached.
    fn is_terminal(&self, state: &S) -> bool;
}

/// Evaluates a terminal state.
///
/// By convention a score is higher when the state is better for the player
/// about to act at that state; the engine treats the value as opaque and only
/// ever averages and compares it.
pub trait Scoring<S> {
    /// Calculates the score of the given (terminal) state.
    fn score(&self, state: &S) -> f32;
}

/// Adjusts a score while it is backpropagated through the tree.
///
/// [`update_score`](Self::update_score) is called once per node on the
/// root-bound path, before that node's statistics update, and its result is
/// what the node records. Every call receives the original playout score, not
/// the previous node's adjusted value. This lets the host flip perspective
/// across turns, e.g. invert the score on the opponent's nodes in an
/// adversarial two-player game.
pub trait Backpropagation<S> {
    /// Returns the score the node holding `state` should record for a playout
    /// that scored `score`.
    fn update_score(&mut self, state: &S, score: f32) -> f32;
}
