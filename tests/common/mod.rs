//! Combination-lock game shared by the integration tests.
//!
//! A single-player process: each turn the player picks a number in
//! `0..=max_choice`, for `num_turns` turns. A hidden target sequence is fixed
//! up front and the terminal reward is the fraction of positions guessed
//! correctly. With `num_turns = 10` this gives a game tree of
//! `(max_choice + 1)^10` leaves whose reward surface the search can climb one
//! digit at a time.
//!
//! Playouts are seeded from the rollout state plus a per-thread draw counter,
//! so a search run is reproducible (reset the counter, fix the engine's
//! exploration floor to zero) while distinct rollouts through one state still
//! sample distinct continuations.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::cell::Cell;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use mcts::{
    Action, ActionGenerator, Backpropagation, Mcts, PlayoutGenerator, Scoring, TerminationCheck,
};

/// The engine specialized to the lock game.
pub type LockMcts = Mcts<LockState, LockAction, LockActionGenerator, LockPlayoutGenerator>;

/// The numbers chosen so far, plus the game's dimensions.
#[derive(Clone, Debug)]
pub struct LockState {
    num_turns: usize,
    max_choice: u32,
    choices: Vec<u32>,
}

impl LockState {
    pub fn new(num_turns: usize, max_choice: u32) -> Self {
        LockState {
            num_turns,
            max_choice,
            choices: Vec::with_capacity(num_turns),
        }
    }

    pub fn push_choice(&mut self, choice: u32) {
        self.choices.push(choice);
    }

    pub fn num_turns(&self) -> usize {
        self.num_turns
    }

    pub fn max_choice(&self) -> u32 {
        self.max_choice
    }

    pub fn choices(&self) -> &[u32] {
        &self.choices
    }
}

/// Appends one chosen number to the sequence.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct LockAction(pub u32);

impl Action<LockState> for LockAction {
    fn execute(&self, state: &mut LockState) {
        state.push_choice(self.0);
    }
}

/// Counts through the choices `0..=max_choice` in order.
pub struct LockActionGenerator {
    next_choice: u32,
    max_choice: u32,
}

impl ActionGenerator for LockActionGenerator {
    type State = LockState;
    type Action = LockAction;

    fn new(state: &LockState) -> Self {
        LockActionGenerator {
            next_choice: 0,
            max_choice: state.max_choice(),
        }
    }

    fn generate_next(&mut self) -> Option<LockAction> {
        if self.next_choice > self.max_choice {
            return None;
        }
        let action = LockAction(self.next_choice);
        self.next_choice += 1;
        Some(action)
    }

    fn can_generate_next(&self) -> bool {
        self.next_choice <= self.max_choice
    }
}

thread_local! {
    /// Per-thread playout draw counter, mixed into the playout seed so that
    /// successive rollouts through one state sample different continuations.
    static PLAYOUT_DRAWS: Cell<u64> = Cell::new(0);
}

/// Resets the per-thread playout seeding, making the next search reproducible
/// from a clean slate. Call at the start of a deterministic scenario.
pub fn reset_playout_entropy() {
    PLAYOUT_DRAWS.with(|draws| draws.set(0));
}

fn seed_for(state: &LockState, draw: u64) -> u64 {
    let mut seed = 0x9e37_79b9_7f4a_7c15u64 ^ (state.max_choice() as u64) ^ draw.rotate_left(32);
    for &choice in state.choices() {
        seed = (seed.rotate_left(7) ^ (choice as u64 + 0x100)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    }
    seed
}

/// Draws uniformly from `0..=max_choice`, deterministically given the state
/// and the per-thread draw counter.
pub struct LockPlayoutGenerator {
    rng: Xoshiro256PlusPlus,
    max_choice: u32,
}

impl PlayoutGenerator for LockPlayoutGenerator {
    type State = LockState;
    type Action = LockAction;

    fn new(state: &LockState) -> Self {
        let draw = PLAYOUT_DRAWS.with(|draws| {
            let next = draws.get().wrapping_add(1);
            draws.set(next);
            next
        });
        LockPlayoutGenerator {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed_for(state, draw)),
            max_choice: state.max_choice(),
        }
    }

    fn generate_random(&mut self) -> LockAction {
        LockAction(self.rng.random_range(0..=self.max_choice))
    }
}

/// Single-player game: scores pass through unchanged.
pub struct LockBackpropagation;

impl Backpropagation<LockState> for LockBackpropagation {
    fn update_score(&mut self, _state: &LockState, score: f32) -> f32 {
        score
    }
}

/// The episode ends once every turn's number has been chosen.
pub struct LockTerminationCheck;

impl TerminationCheck<LockState> for LockTerminationCheck {
    fn is_terminal(&self, state: &LockState) -> bool {
        state.choices().len() == state.num_turns()
    }
}

/// Rewards the fraction of positions matching the target sequence.
pub struct LockScoring {
    target: Vec<u32>,
}

impl LockScoring {
    pub fn new(target: Vec<u32>) -> Self {
        LockScoring { target }
    }
}

impl Scoring<LockState> for LockScoring {
    fn score(&self, state: &LockState) -> f32 {
        let choices = state.choices();
        let correct = choices
            .iter()
            .zip(&self.target)
            .filter(|(chosen, target)| chosen == target)
            .count();
        correct as f32 / choices.len() as f32
    }
}

/// Draws a target sequence from `seed`, then plays the whole game, running
/// one iteration-bounded search session per turn.
///
/// The time budget is zero so the iteration floor alone controls each
/// session, which makes the run independent of wall-clock jitter. Returns the
/// chosen sequence and its final score against the target.
pub fn play_game(
    num_turns: usize,
    max_choice: u32,
    seed: u64,
    iterations: usize,
    min_visits: i32,
) -> (Vec<u32>, f32) {
    reset_playout_entropy();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let target: Vec<u32> = (0..num_turns)
        .map(|_| rng.random_range(0..=max_choice))
        .collect();

    let mut state = LockState::new(num_turns, max_choice);
    for _ in 0..num_turns {
        let mut engine: LockMcts = Mcts::new(
            state.clone(),
            Box::new(LockBackpropagation),
            Box::new(LockTerminationCheck),
            Box::new(LockScoring::new(target.clone())),
        );
        engine.set_time(Duration::ZERO);
        engine.set_min_iterations(iterations);
        engine.set_min_visits(min_visits);

        let action = engine.calculate_action();
        action.execute(&mut state);
    }

    let score = LockScoring::new(target).score(&state);
    (state.choices().to_vec(), score)
}
