//! Persistent traverse session.
//!
//! Owns everything one decode call reads or mutates: the distilled input
//! context (proximity candidates per point, previous-word position), the
//! frontier cache, and a bigram lookup cache. Sessions are single-owner and
//! reusable across sequential calls, which is what makes continuous search
//! possible.

use std::collections::HashMap;
use std::sync::Arc;

use crate::keyboard::proximity::ProximityState;
use crate::keyboard::ProximityMap;
use crate::lexicon::{Lexicon, NodePos};
use crate::node::cache::FrontierCache;
use crate::results::TouchInput;

/// Immutable-per-step view of the decode input, shared by the expander and
/// the weighting table while the frontier is being mutated.
pub struct DecodeContext {
    lexicon: Arc<Lexicon>,
    proximity_states: Vec<ProximityState>,
    input_size: usize,
    prev_word_pos: Option<NodePos>,
    partially_committed: bool,
}

impl DecodeContext {
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn proximity_state(&self, pointer: usize) -> &ProximityState {
        &self.proximity_states[pointer]
    }

    pub fn prev_word_pos(&self) -> Option<NodePos> {
        self.prev_word_pos
    }

    pub fn is_partially_committed(&self) -> bool {
        self.partially_committed
    }
}

/// Memoized bigram probabilities for one session.
#[derive(Default)]
pub struct BigramCache {
    map: HashMap<(NodePos, NodePos), Option<u8>>,
}

impl BigramCache {
    pub fn probability(&mut self, lexicon: &Lexicon, prev: NodePos, target: NodePos) -> Option<u8> {
        *self
            .map
            .entry((prev, target))
            .or_insert_with(|| lexicon.bigram_probability(prev, target))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

pub struct TraverseSession {
    ctx: DecodeContext,
    cache: FrontierCache,
    bigrams: BigramCache,
    /// Primary code points of the previous decode call.
    prev_primaries: Vec<u32>,
    continuous_possible: bool,
}

impl TraverseSession {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            ctx: DecodeContext {
                lexicon,
                proximity_states: Vec::new(),
                input_size: 0,
                prev_word_pos: None,
                partially_committed: false,
            },
            cache: FrontierCache::new(),
            bigrams: BigramCache::default(),
            prev_primaries: Vec::new(),
            continuous_possible: false,
        }
    }

    /// Prepare proximity states and input buffers for one decode call.
    pub fn setup(
        &mut self,
        proximity: &ProximityMap,
        input: &TouchInput,
        max_spatial_distance: f32,
        max_pointer_count: usize,
    ) {
        debug_assert!(max_pointer_count >= 1);
        let state = ProximityState::new(proximity, input, max_spatial_distance);
        let primaries: Vec<u32> = (0..state.size()).map(|i| state.primary_code_point(i)).collect();

        self.continuous_possible = !self.prev_primaries.is_empty()
            && primaries.len() > self.prev_primaries.len()
            && primaries.starts_with(&self.prev_primaries)
            && self.cache.has_snapshot();

        self.prev_primaries = primaries;
        self.ctx.input_size = state.size();
        self.ctx.proximity_states = vec![state];
        self.ctx.partially_committed = false;
    }

    /// True iff the current input strictly extends the previous call's input
    /// and a continue snapshot exists.
    pub fn is_continuous_suggestion_possible(&self) -> bool {
        self.continuous_possible
    }

    pub fn reset_cache(&mut self, max_cache_size: usize, max_results: usize) {
        self.cache.reset(max_cache_size, max_results);
    }

    pub fn input_size(&self) -> usize {
        self.ctx.input_size
    }

    pub fn lexicon(&self) -> Arc<Lexicon> {
        Arc::clone(&self.ctx.lexicon)
    }

    pub fn ctx(&self) -> &DecodeContext {
        &self.ctx
    }

    pub fn cache(&self) -> &FrontierCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut FrontierCache {
        &mut self.cache
    }

    /// Disjoint borrows for the expander: read the input context while
    /// mutating the frontier and the bigram cache.
    pub fn split_mut(&mut self) -> (&DecodeContext, &mut FrontierCache, &mut BigramCache) {
        (&self.ctx, &mut self.cache, &mut self.bigrams)
    }

    pub fn prev_word_pos(&self) -> Option<NodePos> {
        self.ctx.prev_word_pos
    }

    pub fn set_prev_word_pos(&mut self, pos: Option<NodePos>) {
        self.ctx.prev_word_pos = pos;
    }

    pub fn is_partially_committed(&self) -> bool {
        self.ctx.partially_committed
    }

    pub fn set_partially_committed(&mut self) {
        self.ctx.partially_committed = true;
    }
}
