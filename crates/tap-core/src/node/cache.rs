//! Frontier queues for one traverse session.
//!
//! Three best-first queues (active, next-active, terminals) plus a continue
//! snapshot that lets a later decode over a prefix-extended input resume
//! instead of restarting from the trie root.

use super::queue::NodeQueue;
use super::SearchNode;
use crate::results::MAX_RESULTS;

pub struct FrontierCache {
    active: NodeQueue,
    next_active: NodeQueue,
    terminals: NodeQueue,
    cached: NodeQueue,
    /// Steps consumed in the current decode run.
    input_index: i32,
    last_cached_input_index: i32,
    has_snapshot: bool,
}

impl Default for FrontierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontierCache {
    pub fn new() -> Self {
        Self {
            active: NodeQueue::new(0),
            next_active: NodeQueue::new(0),
            terminals: NodeQueue::new(0),
            cached: NodeQueue::new(0),
            input_index: 0,
            last_cached_input_index: 0,
            has_snapshot: false,
        }
    }

    /// Drop everything and re-seed capacities.
    pub fn reset(&mut self, max_cache_size: usize, max_results: usize) {
        self.active = NodeQueue::new(max_cache_size);
        self.next_active = NodeQueue::new(max_cache_size);
        self.terminals = NodeQueue::new(max_results.min(MAX_RESULTS));
        self.cached = NodeQueue::new(max_cache_size);
        self.input_index = 0;
        self.last_cached_input_index = 0;
        self.has_snapshot = false;
    }

    pub fn push_active(&mut self, node: SearchNode) {
        self.active.push(node);
    }

    pub fn push_next_active(&mut self, node: SearchNode) {
        self.next_active.push(node);
    }

    pub fn push_terminal(&mut self, node: SearchNode) {
        self.terminals.push(node);
    }

    pub fn push_continue(&mut self, node: SearchNode) {
        self.cached.push(node);
    }

    pub fn pop_active(&mut self) -> Option<SearchNode> {
        self.active.pop_best()
    }

    pub fn pop_worst_terminal(&mut self) -> Option<SearchNode> {
        self.terminals.pop_worst()
    }

    pub fn active_size(&self) -> usize {
        self.active.len()
    }

    pub fn next_active_size(&self) -> usize {
        self.next_active.len()
    }

    pub fn terminal_size(&self) -> usize {
        self.terminals.len()
    }

    /// Swap in the next step's frontier.
    pub fn advance_active_nodes(&mut self) {
        std::mem::swap(&mut self.active, &mut self.next_active);
        self.next_active.clear();
    }

    /// Record that one input step has been consumed.
    pub fn advance_input_index(&mut self, input_size: usize) {
        if self.input_index < input_size as i32 {
            self.input_index += 1;
        }
    }

    pub fn input_index(&self) -> i32 {
        self.input_index
    }

    /// True for nodes still sitting at the most recent input position; only
    /// those may attempt insertion/transposition lookahead.
    pub fn is_look_ahead_correction_input_index(&self, index: i16) -> bool {
        index as i32 == self.input_index - 1
    }

    /// Mark the current frontier as the restart point for continuous search.
    pub fn update_last_cached_input_index(&mut self) {
        self.cached.clear();
        self.last_cached_input_index = self.input_index;
        self.has_snapshot = true;
    }

    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    /// Restore the frontier from the continue snapshot.
    ///
    /// Only valid when the new input is a prefix extension of the snapshot's
    /// input; callers gate on `TraverseSession::is_continuous_suggestion_possible`.
    pub fn continue_search(&mut self) {
        self.active.clear();
        self.next_active.clear();
        self.terminals.clear();
        let nodes: Vec<SearchNode> = self.cached.iter().cloned().collect();
        for node in nodes {
            self.active.push(node);
        }
        self.input_index = self.last_cached_input_index;
    }

    /// Drop snapshot hypotheses that consumed fewer than `commit_point`
    /// points; the best survivor carries the committed prefix's word chain.
    pub fn set_commit_point(&mut self, commit_point: i32) -> Option<SearchNode> {
        self.cached
            .retain(|node| node.input_index(0) as i32 >= commit_point);
        self.cached.iter().next().cloned()
    }
}
