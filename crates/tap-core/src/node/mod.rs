//! Search hypotheses ("nodes") over the lexicon trie.
//!
//! A `SearchNode` pairs a trie cursor with the input points consumed so far,
//! the word buffer emitted so far, a chain of previously completed words for
//! multi-word hypotheses, and the scoring state. Nodes are plain values;
//! queues deep-copy them on push (the buffers are fixed-capacity arrays).

pub mod cache;
pub mod expand;
pub mod queue;
pub mod scoring;

use crate::lexicon::{Lexicon, NodePos, TrieNode, NO_ATTRIBUTES};
use crate::results::{MAX_PREV_WORDS, MAX_WORD_LENGTH};
use scoring::ScoringState;

/// Pointers tracked per hypothesis. Tap decoding is single-pointer.
pub const MAX_POINTER_COUNT: usize = 1;

const SPACE: u32 = ' ' as u32;
const APOSTROPHE: u32 = '\'' as u32;

#[derive(Debug, Clone)]
pub struct SearchNode {
    pos: Option<NodePos>,
    code_point: u32,
    probability: u8,
    is_terminal: bool,
    is_blacklisted: bool,
    is_not_a_word: bool,
    child_start: u32,
    child_count: u16,
    attributes_pos: u32,
    /// Letters consumed in the current word.
    depth: u16,
    /// Touch points consumed, per pointer.
    input_index: [i16; MAX_POINTER_COUNT],
    word: [u32; MAX_WORD_LENGTH],
    word_len: u8,
    current_word_start: u8,
    prev_words: [NodePos; MAX_PREV_WORDS],
    prev_word_count: u8,
    /// Input index where each later word started (for space positions).
    space_indices: [i16; MAX_PREV_WORDS],
    is_cached: bool,
    scoring: ScoringState,
}

impl SearchNode {
    /// Fresh hypothesis at the trie root.
    pub fn root(lexicon: &Lexicon) -> Self {
        let (child_start, child_count) = lexicon.root_child_range();
        Self {
            pos: None,
            code_point: 0,
            probability: 0,
            is_terminal: false,
            is_blacklisted: false,
            is_not_a_word: false,
            child_start,
            child_count,
            attributes_pos: NO_ATTRIBUTES,
            depth: 0,
            input_index: [0; MAX_POINTER_COUNT],
            word: [0; MAX_WORD_LENGTH],
            word_len: 0,
            current_word_start: 0,
            prev_words: [0; MAX_PREV_WORDS],
            prev_word_count: 0,
            space_indices: [-1; MAX_PREV_WORDS],
            is_cached: false,
            scoring: ScoringState::new(),
        }
    }

    /// Root hypothesis continuing after `parent`'s completed word.
    ///
    /// Carries the word buffer (with a space separator), extends the
    /// prev-word chain with `parent`'s terminal position, and keeps the input
    /// cursor.
    pub fn next_word_root(lexicon: &Lexicon, parent: &SearchNode) -> Self {
        let mut node = Self::root(lexicon);
        node.word = parent.word;
        node.word_len = parent.word_len;
        node.push_code_point(SPACE);
        node.current_word_start = node.word_len;
        node.input_index = parent.input_index;
        node.prev_words = parent.prev_words;
        node.prev_word_count = parent.prev_word_count;
        node.space_indices = parent.space_indices;
        if let Some(pos) = parent.pos {
            let slot = node.prev_word_count as usize;
            if slot < MAX_PREV_WORDS {
                node.prev_words[slot] = pos;
                node.space_indices[slot] = parent.input_index[0];
                node.prev_word_count += 1;
            }
        }
        node.scoring = parent.scoring.clone();
        node
    }

    /// Child hypothesis descending into `info`.
    pub fn child(info: &TrieNode, parent: &SearchNode) -> Self {
        let mut node = parent.clone();
        node.pos = Some(info.pos);
        node.code_point = info.code_point;
        node.probability = info.probability;
        node.is_terminal = info.is_terminal;
        node.is_blacklisted = info.is_blacklisted;
        node.is_not_a_word = info.is_not_a_word;
        node.child_start = info.child_start;
        node.child_count = info.child_count;
        node.attributes_pos = info.attributes_pos;
        node.depth = parent.depth + 1;
        node.is_cached = false;
        node.push_code_point(info.code_point);
        node
    }

    fn push_code_point(&mut self, code_point: u32) {
        if (self.word_len as usize) < MAX_WORD_LENGTH {
            self.word[self.word_len as usize] = code_point;
            self.word_len += 1;
        }
    }

    pub fn pos(&self) -> Option<NodePos> {
        self.pos
    }

    pub fn code_point(&self) -> u32 {
        self.code_point
    }

    pub fn probability(&self) -> u8 {
        self.probability
    }

    pub fn attributes_pos(&self) -> u32 {
        self.attributes_pos
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn input_index(&self, pointer: usize) -> i16 {
        self.input_index[pointer]
    }

    pub fn forward_input_index(&mut self, pointer: usize, count: i16) {
        self.input_index[pointer] += count;
    }

    /// Points consumed across all pointers.
    pub fn total_input_index(&self) -> i32 {
        self.input_index.iter().map(|&i| i as i32).sum()
    }

    pub fn is_total_input_size_exceeding_limit(&self) -> bool {
        self.total_input_index() as usize > MAX_WORD_LENGTH
    }

    /// Input exhausted while the trie descent continues.
    pub fn is_completion(&self, input_size: usize) -> bool {
        self.input_index[0] as usize >= input_size
    }

    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }

    pub(crate) fn child_range(&self) -> (u32, u16) {
        (self.child_start, self.child_count)
    }

    pub fn is_terminal_word_node(&self) -> bool {
        self.is_terminal
    }

    pub fn is_blacklisted_or_not_a_word(&self) -> bool {
        self.is_blacklisted || self.is_not_a_word
    }

    /// Apostrophes may be skipped for free.
    pub fn is_zero_cost_omission(&self) -> bool {
        self.code_point == APOSTROPHE
    }

    pub fn has_multiple_words(&self) -> bool {
        self.prev_word_count > 0
    }

    /// Terminal position of the most recently completed word in this chain.
    pub fn prev_word_node_pos(&self) -> Option<NodePos> {
        if self.prev_word_count == 0 {
            None
        } else {
            Some(self.prev_words[self.prev_word_count as usize - 1])
        }
    }

    /// All emitted code points, separators included.
    pub fn word(&self) -> &[u32] {
        &self.word[..self.word_len as usize]
    }

    /// Code points of the in-progress word only.
    pub fn current_word(&self) -> &[u32] {
        &self.word[self.current_word_start as usize..self.word_len as usize]
    }

    pub fn current_word_len(&self) -> usize {
        (self.word_len - self.current_word_start) as usize
    }

    /// Multi-word hypotheses whose trailing word is a single code point are
    /// noise; keep them out of the terminal pool.
    pub fn should_be_filtered_by_safety_net_for_bigram(&self) -> bool {
        self.has_multiple_words() && self.current_word_len() <= 1
    }

    pub fn is_cached(&self) -> bool {
        self.is_cached
    }

    pub fn set_cached(&mut self) {
        self.is_cached = true;
    }

    pub fn scoring(&self) -> &ScoringState {
        &self.scoring
    }

    pub fn scoring_mut(&mut self) -> &mut ScoringState {
        &mut self.scoring
    }

    /// Queue ordering key.
    pub fn queue_key(&self) -> f32 {
        self.scoring.normalized_compound_distance()
    }

    /// Input indices where later words of the chain started.
    pub fn output_space_positions(&self, out: &mut [i32]) {
        for (slot, value) in out.iter_mut().enumerate() {
            *value = if slot < self.prev_word_count as usize {
                self.space_indices[slot] as i32
            } else {
                -1
            };
        }
    }
}
