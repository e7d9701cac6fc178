//! # Search Tree Store
//!
//! Arena-backed storage for the MCTS lookahead tree. The [`Tree`] owns every
//! [`Node`] in a flat vector; a node's id doubles as its arena index, so ids
//! are monotonic and the root is always id 0. Children hold the ids of their
//! parent and vice versa, which keeps the tree strictly acyclic without any
//! shared-ownership pointers while still allowing O(depth) root-ward walks
//! for backpropagation.
//!
//! Nodes are never destroyed individually; the whole tree is dropped when the
//! search session ends.

use crate::ActionGenerator;

/// The id of the root node of every tree.
pub const ROOT_ID: usize = 0;

/// A node in the Monte Carlo search tree.
///
/// A node stores the state it represents, the action that produced that state
/// from its parent, its running score statistics, and an embedded
/// [`ActionGenerator`] bound to its own state. The generator is constructed
/// once when the node is created and incrementally drained during expansion.
pub struct Node<S, A, E> {
    id: usize,
    state: S,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Action taken to get from the parent to this node.
    action: A,
    expansion: E,
    num_visits: i32,
    score_sum: f32,
}

impl<S, A, E> Node<S, A, E>
where
    E: ActionGenerator<State = S, Action = A>,
{
    /// Creates a new node and instantiates its embedded action generator
    /// against the stored state. No other side effects.
    fn new(id: usize, state: S, parent: Option<usize>, action: A) -> Self {
        let expansion = E::new(&state);
        Node {
            id,
            state,
            parent,
            children: Vec::new(),
            action,
            expansion,
            num_visits: 0,
            score_sum: 0.0,
        }
    }

    /// The id of this node, unique within its tree.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The state associated with this node.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The id of this node's parent, or `None` for the root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// The ids of this node's children, in insertion order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// The action executed on the parent's state to reach this node's state.
    /// For the root this is a placeholder default action.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// Drains one action from the embedded generator, or `None` if the legal
    /// actions of this node's state are exhausted.
    pub fn generate_next_action(&mut self) -> Option<A> {
        self.expansion.generate_next()
    }

    /// Returns true iff this node is still a frontier node: it has no
    /// children, or its embedded generator can still produce an action.
    /// Selection descends while this is false.
    pub fn should_expand(&self) -> bool {
        self.children.is_empty() || self.expansion.can_generate_next()
    }

    /// Folds one backpropagated score into this node's statistics.
    /// Not idempotent: every call counts as one visit.
    pub fn update(&mut self, score: f32) {
        self.score_sum += score;
        self.num_visits += 1;
    }

    /// The total score divided by the number of visits.
    ///
    /// At zero visits this is NaN. That is an accepted boundary state, not an
    /// error: the only call sites that could hit it (selection, answer
    /// picking) already short-circuit zero-visit nodes.
    pub fn avg_score(&self) -> f32 {
        self.score_sum / self.num_visits as f32
    }

    /// The number of times [`update`](Self::update) has been called.
    pub fn num_visits(&self) -> i32 {
        self.num_visits
    }
}

/// The arena holding every node of one search session.
///
/// Discarded wholesale when the session ends; trees are never reused or
/// persisted across sessions.
pub struct Tree<S, A, E> {
    nodes: Vec<Node<S, A, E>>,
}

impl<S, A, E> Tree<S, A, E>
where
    A: Default,
    E: ActionGenerator<State = S, Action = A>,
{
    /// Creates a tree containing only a root node built from the given state.
    pub fn new(root_state: S) -> Self {
        Tree {
            nodes: vec![Node::new(ROOT_ID, root_state, None, A::default())],
        }
    }

    /// Allocates a new node for `state`, reached from `parent` via `action`,
    /// and appends it to the parent's children.
    ///
    /// Children are appended in generation order without reordering or
    /// deduplication; non-repetition of actions is the [`ActionGenerator`]'s
    /// responsibility. A generator that violates the no-repeats contract
    /// produces duplicate-action siblings here, a documented consequence of
    /// lazy generation rather than a tree defect.
    ///
    /// Returns the id of the new node.
    pub fn add_node(&mut self, state: S, parent: usize, action: A) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, state, Some(parent), action));
        self.nodes[parent].children.push(id);
        id
    }

    /// The root node.
    pub fn root(&self) -> &Node<S, A, E> {
        &self.nodes[ROOT_ID]
    }

    /// The node with the given id.
    ///
    /// # Panics
    /// Panics if no node with this id exists in the tree.
    pub fn get(&self, id: usize) -> &Node<S, A, E> {
        &self.nodes[id]
    }

    /// Mutable access to the node with the given id.
    ///
    /// # Panics
    /// Panics if no node with this id exists in the tree.
    pub fn get_mut(&mut self, id: usize) -> &mut Node<S, A, E> {
        &mut self.nodes[id]
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree is never empty; it always contains at least the root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    #[derive(Clone, Debug, PartialEq)]
    struct MockState;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct MockAction(u32);

    impl Action<MockState> for MockAction {
        fn execute(&self, _state: &mut MockState) {}
    }

    /// Yields the actions 0..3, then exhausts.
    struct MockGenerator {
        next: u32,
    }

    impl ActionGenerator for MockGenerator {
        type State = MockState;
        type Action = MockAction;

        fn new(_state: &MockState) -> Self {
            MockGenerator { next: 0 }
        }

        fn generate_next(&mut self) -> Option<MockAction> {
            if self.next < 3 {
                let action = MockAction(self.next);
                self.next += 1;
                Some(action)
            } else {
                None
            }
        }

        fn can_generate_next(&self) -> bool {
            self.next < 3
        }
    }

    type MockTree = Tree<MockState, MockAction, MockGenerator>;

    #[test]
    fn scores_accumulate_into_running_average() {
        let mut tree = MockTree::new(MockState);
        let root = tree.get_mut(ROOT_ID);

        assert_eq!(root.num_visits(), 0);

        root.update(0.5);
        assert_eq!(root.num_visits(), 1);
        assert_eq!(root.avg_score(), 0.5);

        root.update(1.0);
        assert_eq!(root.num_visits(), 2);
        assert!((root.avg_score() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_visit_average_is_nan_not_a_panic() {
        let tree = MockTree::new(MockState);
        assert!(tree.root().avg_score().is_nan());
    }

    #[test]
    fn root_has_id_zero_and_no_parent() {
        let tree = MockTree::new(MockState);
        assert_eq!(tree.root().id(), ROOT_ID);
        assert_eq!(tree.root().parent(), None);
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }

    #[test]
    fn children_keep_insertion_order_and_ids_are_monotonic() {
        let mut tree = MockTree::new(MockState);
        let a = tree.add_node(MockState, ROOT_ID, MockAction(0));
        let b = tree.add_node(MockState, ROOT_ID, MockAction(1));

        assert_eq!((a, b), (1, 2));
        assert_eq!(tree.root().children(), &[1, 2]);
        assert_eq!(tree.get(a).parent(), Some(ROOT_ID));
        assert_eq!(tree.get(b).action(), &MockAction(1));
    }

    #[test]
    fn should_expand_tracks_children_and_generator_exhaustion() {
        let mut tree = MockTree::new(MockState);

        // Childless: always a frontier node.
        assert!(tree.root().should_expand());

        // Drain the generator and attach a child per action.
        while let Some(action) = tree.get_mut(ROOT_ID).generate_next_action() {
            tree.add_node(MockState, ROOT_ID, action);
            // Still expandable until the generator runs dry.
        }

        assert_eq!(tree.root().children().len(), 3);
        assert!(!tree.root().should_expand());
    }

    #[test]
    fn generator_never_repeats_and_signals_exhaustion() {
        let mut tree = MockTree::new(MockState);
        let root = tree.get_mut(ROOT_ID);

        assert!(root.should_expand());
        assert_eq!(root.generate_next_action(), Some(MockAction(0)));
        assert_eq!(root.generate_next_action(), Some(MockAction(1)));
        assert_eq!(root.generate_next_action(), Some(MockAction(2)));
        assert_eq!(root.generate_next_action(), None);
    }
}
