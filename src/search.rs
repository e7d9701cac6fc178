//! # Search Driver
//!
//! The anytime MCTS control loop: repeated
//! selection/expansion/simulation/backpropagation cycles under a wall-clock
//! budget with an optional minimum-iteration floor, ending in the choice of
//! the root child with the best average score.

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::tree::{Node, Tree, ROOT_ID};
use crate::{Action, ActionGenerator, Backpropagation, PlayoutGenerator, Scoring, TerminationCheck};

/// Default thinking time.
const DEFAULT_TIME: Duration = Duration::from_millis(500);

/// The search may go over time while it has fewer than this many iterations.
const DEFAULT_MIN_ITERATIONS: usize = 0;

/// Default C for the UCT formula.
const DEFAULT_C: f32 = 0.5;

/// Minimum number of visits until a node will be expanded.
const DEFAULT_MIN_T: i32 = 5;

/// Default number of visits until a node's children are selected using UCT
/// instead of randomly.
const DEFAULT_MIN_VISITS: i32 = 5;

/// The anytime Monte Carlo Tree Search engine.
///
/// The engine owns the search tree and the three evaluation contracts for the
/// session's duration; the expansion and playout generators are type
/// parameters because every tree node embeds a generator instance by value.
///
/// One [`calculate_action`](Self::calculate_action) call is one search
/// session: it runs the budget loop to completion on the calling thread and
/// returns the chosen action. There is no internal parallelism and no
/// cancellation; concurrent calls on one instance are not supported.
///
/// # Type parameters
/// * `S` - The state type searched over
/// * `A` - The action type searched over
/// * `E` - The [`ActionGenerator`] embedded in every node
/// * `P` - The [`PlayoutGenerator`] used for rollouts
pub struct Mcts<S, A, E, P> {
    backprop: Box<dyn Backpropagation<S>>,
    termination: Box<dyn TerminationCheck<S>>,
    scoring: Box<dyn Scoring<S>>,

    tree: Tree<S, A, E>,

    /// The wall-clock time the search is allowed to run.
    allowed_computation_time: Duration,
    /// The search may go over time while it has fewer than this many
    /// iterations.
    min_iterations: usize,
    /// Tunable bias parameter for UCT node selection.
    c: f32,
    /// Minimum number of visits until a node will be expanded.
    min_t: i32,
    /// Minimum number of visits until a node's children are selected with the
    /// UCT formula; below it a child is picked uniformly at random.
    min_visits: i32,

    /// The number of search iterations so far.
    iterations: usize,

    _playout: PhantomData<P>,
}

impl<S, A, E, P> Mcts<S, A, E, P>
where
    S: Clone,
    A: Action<S>,
    E: ActionGenerator<State = S, Action = A>,
    P: PlayoutGenerator<State = S, Action = A>,
{
    /// Creates an engine rooted at `root_state`.
    ///
    /// The engine takes ownership of the backpropagation, termination and
    /// scoring contracts for the session's duration.
    pub fn new(
        root_state: S,
        backprop: Box<dyn Backpropagation<S>>,
        termination: Box<dyn TerminationCheck<S>>,
        scoring: Box<dyn Scoring<S>>,
    ) -> Self {
        Mcts {
            backprop,
            termination,
            scoring,
            tree: Tree::new(root_state),
            allowed_computation_time: DEFAULT_TIME,
            min_iterations: DEFAULT_MIN_ITERATIONS,
            c: DEFAULT_C,
            min_t: DEFAULT_MIN_T,
            min_visits: DEFAULT_MIN_VISITS,
            iterations: 0,
            _playout: PhantomData,
        }
    }

    /// Runs the search and returns the best action found.
    ///
    /// The answer is the root child with the highest average score, ties
    /// resolved in favor of the first-generated child. If the budget was too
    /// small for even one expansion, a single random legal action is drawn
    /// from a fresh [`PlayoutGenerator`] on the root state instead of
    /// failing.
    pub fn calculate_action(&mut self) -> A {
        self.search();

        let mut best: Option<usize> = None;
        let mut best_score = f32::NEG_INFINITY;
        for &child_id in self.tree.root().children() {
            let score = self.tree.get(child_id).avg_score();
            if score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }

        match best {
            Some(id) => self.tree.get(id).action().clone(),
            // No expansion took place, simply execute a random action.
            None => {
                let state = self.tree.root().state().clone();
                P::new(&state).generate_random()
            }
        }
    }

    /// Sets the wall-clock computation budget.
    pub fn set_time(&mut self, time: Duration) {
        self.allowed_computation_time = time;
    }

    /// Sets the C parameter of the UCT formula.
    pub fn set_c(&mut self, c: f32) {
        self.c = c;
    }

    /// Sets the minimum number of visits until a node is expanded. Below the
    /// threshold the engine re-simulates from the node instead of growing the
    /// tree.
    pub fn set_min_t(&mut self, min_t: i32) {
        self.min_t = min_t;
    }

    /// Sets the minimum number of visits until UCT is used instead of random
    /// child selection during the selection stage.
    pub fn set_min_visits(&mut self, min_visits: i32) {
        self.min_visits = min_visits;
    }

    /// Sets the minimum number of iterations required before
    /// [`calculate_action`](Self::calculate_action) returns. The search goes
    /// over its time budget if this floor has not been reached.
    pub fn set_min_iterations(&mut self, min_iterations: usize) {
        self.min_iterations = min_iterations;
    }

    /// The root of the search tree. Useful for external tooling.
    /// See [`crate::graphviz::write_dot_file`].
    pub fn root(&self) -> &Node<S, A, E> {
        self.tree.root()
    }

    /// The whole search tree.
    pub fn tree(&self) -> &Tree<S, A, E> {
        &self.tree
    }

    /// The number of iterations run so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The time/iteration-budgeted search loop.
    fn search(&mut self) {
        let start = Instant::now();

        while start.elapsed() < self.allowed_computation_time || self.iterations < self.min_iterations
        {
            self.iterations += 1;

            // --- Selection ---
            // Descend until a frontier node is reached.
            let mut selected = ROOT_ID;
            while !self.tree.get(selected).should_expand() {
                selected = self.select(selected);
            }

            // A terminal frontier node is scored directly; there is nothing
            // to expand or simulate.
            if self.termination.is_terminal(self.tree.get(selected).state()) {
                let score = self.scoring.score(self.tree.get(selected).state());
                self.back_propagate(selected, score);
                continue;
            }

            // --- Expansion ---
            // Gated on visit count: an under-visited node is re-simulated
            // instead of grown, to build confidence before branching.
            let expanded = if self.tree.get(selected).num_visits() >= self.min_t {
                self.expand_next(selected)
            } else {
                selected
            };

            // --- Simulation ---
            self.simulate(expanded);
        }
    }

    /// Selects the child to descend into at the given node.
    ///
    /// Callers guarantee the node has children (its `should_expand()` is
    /// false). Every child has at least one visit by construction, so the
    /// UCT formula never divides by zero here.
    fn select(&self, id: usize) -> usize {
        let node = self.tree.get(id);
        let children = node.children();

        // Select randomly while the node has not been visited often enough.
        if node.num_visits() < self.min_visits {
            return children[rand::rng().random_range(0..children.len())];
        }

        // Use the UCT formula for selection; ties go to the first child.
        let parent_visits = node.num_visits() as f32;
        let mut best = children[0];
        let mut best_score = f32::NEG_INFINITY;
        for &child_id in children {
            let child = self.tree.get(child_id);
            let score =
                child.avg_score() + self.c * (parent_visits.ln() / child.num_visits() as f32).sqrt();
            if score > best_score {
                best_score = score;
                best = child_id;
            }
        }
        best
    }

    /// Drains the next action from the given node, executes it on a clone of
    /// the node's state and attaches the result as a new child.
    ///
    /// Returns the id of the new child, or the node's own id if its generator
    /// is exhausted (a childless node whose state the host failed to mark
    /// terminal); simulation then proceeds from the node itself.
    fn expand_next(&mut self, id: usize) -> usize {
        let action = match self.tree.get_mut(id).generate_next_action() {
            Some(action) => action,
            None => return id,
        };
        let mut state = self.tree.get(id).state().clone();
        action.execute(&mut state);
        self.tree.add_node(state, id, action)
    }

    /// Runs one random playout from the given node to a terminal state and
    /// backpropagates the resulting score.
    fn simulate(&mut self, id: usize) {
        let mut state = self.tree.get(id).state().clone();

        while !self.termination.is_terminal(&state) {
            let action = P::new(&state).generate_random();
            action.execute(&mut state);
        }

        let score = self.scoring.score(&state);
        self.back_propagate(id, score);
    }

    /// Updates every node from the given node up to and including the root:
    /// exactly depth + 1 updates. Each node records the playout score as
    /// adjusted for its own state by the backpropagation contract.
    fn back_propagate(&mut self, id: usize, score: f32) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let adjusted = self
                .backprop
                .update_score(self.tree.get(node_id).state(), score);
            self.tree.get_mut(node_id).update(adjusted);
            current = self.tree.get(node_id).parent();
        }
    }
}
