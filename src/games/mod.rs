//! # Demo Game Implementations
//!
//! Host-side implementations of the engine's capability contracts for
//! concrete games. These live outside the engine core: the search only ever
//! sees them through the trait interfaces in the crate root.
//!
//! ## Adding a new game
//! 1. A state type with `Clone` (and `Display` if you want `.dot` dumps)
//! 2. An action type implementing `mcts::Action`
//! 3. An `ActionGenerator` and a `PlayoutGenerator` for lazy expansion and
//!    random rollouts
//! 4. `TerminationCheck`, `Scoring` and `Backpropagation` implementations
//!    encoding the win conditions and score perspective

pub mod tictactoe;
