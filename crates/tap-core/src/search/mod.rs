//! The decode driver: frontier expansion and suggestion output.
//!
//! One decode call seeds (or resumes) the frontier, expands it step by step
//! until no hypotheses remain, then drains the terminal pool into ranked
//! suggestions. Policies (traversal gates, cost model, ranking) are injected
//! at construction so variants and tests swap them freely.

pub mod scoring;
pub mod traversal;
pub mod weighting;

#[cfg(test)]
mod testutil;

#[cfg(test)]
mod tests;

use tracing::{debug, debug_span};

use crate::keyboard::ProximityMap;
use crate::node::scoring::DISTANCE_CEILING;
use crate::node::{cache::FrontierCache, expand, SearchNode};
use crate::results::{SuggestResults, SuggestionKind, TouchInput, MAX_PREV_WORDS, MAX_RESULTS};
use crate::session::{BigramCache, DecodeContext, TraverseSession};

use scoring::Scoring;
use traversal::Traversal;
use weighting::{apply_cost_and_advance, CorrectionKind, CostModel};

/// Most lookahead anchors one expansion step may re-queue.
pub const LOOKAHEAD_NODE_CACHE_SIZE: usize = 25;
/// Multi-word suggestions at or past this input length force-commit.
pub const MIN_LEN_FOR_MULTI_WORD_AUTOCORRECT: usize = 16;
/// Inputs must be longer than this to take the continuous-search path.
pub const MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE: usize = 2;

pub struct Decoder {
    traversal: Box<dyn Traversal>,
    scoring: Box<dyn Scoring>,
    weighting: Box<dyn CostModel>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new_typing()
    }
}

impl Decoder {
    /// Decoder with the tap-typing policy set.
    pub fn new_typing() -> Self {
        Self {
            traversal: Box::new(traversal::TypingTraversal::default()),
            scoring: Box::new(scoring::TypingScoring::default()),
            weighting: Box::new(weighting::TypingCostModel),
        }
    }

    pub fn with_policies(
        traversal: Box<dyn Traversal>,
        scoring: Box<dyn Scoring>,
        weighting: Box<dyn CostModel>,
    ) -> Self {
        Self {
            traversal,
            scoring,
            weighting,
        }
    }

    /// Decode one input into ranked suggestions.
    ///
    /// Returns the number of output slots written. Degenerate inputs yield
    /// zero suggestions; no error surfaces to the caller.
    pub fn decode(
        &self,
        session: &mut TraverseSession,
        proximity: &ProximityMap,
        input: &TouchInput,
        commit_point: i32,
        results: &mut SuggestResults,
    ) -> usize {
        let _span = debug_span!("decode", input_size = input.len(), commit_point).entered();
        session.setup(
            proximity,
            input,
            self.traversal.max_spatial_distance(),
            self.traversal.max_pointer_count(),
        );
        if !session.ctx().proximity_state(0).is_used() {
            return 0;
        }
        results.clear();
        self.initialize_search(session, commit_point);

        let input_size = session.input_size();
        while session.cache().active_size() > 0 {
            self.expand_current_nodes(session);
            let cache = session.cache_mut();
            cache.advance_active_nodes();
            cache.advance_input_index(input_size);
        }

        let count = self.output_suggestions(session, results);
        debug!(suggestions = count);
        count
    }

    /// Seed the frontier: resume from the continue snapshot when the input
    /// extends the previous call's, otherwise restart at the trie root.
    fn initialize_search(&self, session: &mut TraverseSession, commit_point: i32) {
        let commit_point = if self.traversal.allow_partial_commit() {
            commit_point
        } else {
            0
        };
        if session.input_size() > MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE
            && session.is_continuous_suggestion_possible()
        {
            if commit_point == 0 {
                session.cache_mut().continue_search();
                return;
            }
            if let Some(top) = session.cache_mut().set_commit_point(commit_point) {
                session.set_prev_word_pos(top.prev_word_node_pos());
                session.cache_mut().continue_search();
                session.set_partially_committed();
                return;
            }
        }
        self.restart_search(session);
    }

    fn restart_search(&self, session: &mut TraverseSession) {
        session.reset_cache(self.traversal.max_cache_size(), MAX_RESULTS);
        let root = SearchNode::root(&session.lexicon());
        session.cache_mut().push_active(root);
    }

    /// Drain the active queue, expanding each hypothesis into next-active and
    /// terminal candidates.
    fn expand_current_nodes(&self, session: &mut TraverseSession) {
        let should_depth_cache = self.traversal.should_depth_level_cache(session);
        let input_size = session.input_size();
        let (ctx, cache, bigrams) = session.split_mut();
        if should_depth_cache {
            cache.update_last_cached_input_index();
        }

        let mut children = Vec::with_capacity(self.traversal.default_expand_node_size());
        let mut anchors_queued = 0usize;

        while let Some(mut node) = cache.pop_active() {
            if node.is_total_input_size_exceeding_limit() {
                return;
            }
            children.clear();

            let point0 = node.input_index(0);
            let can_look_ahead = self.traversal.can_do_look_ahead_correction(ctx, &node);
            let is_look_ahead =
                can_look_ahead && cache.is_look_ahead_correction_input_index(point0);
            let is_completion = node.is_completion(input_size);

            if should_depth_cache || self.traversal.should_node_level_cache(ctx, &node) {
                cache.push_continue(node.clone());
                node.set_cached();
            }

            if is_look_ahead {
                // Deferred nodes that have not consumed the latest point yet;
                // the only legal moves defer or swap that point.
                if self.traversal.correct_transposition() {
                    self.process_node_as_transposition(ctx, cache, bigrams, &node);
                }
                if self.traversal.correct_insertion() {
                    self.process_node_as_insertion(ctx, cache, bigrams, &node);
                }
                continue;
            }

            let allows_corrections = self.traversal.allows_error_corrections(&node);
            if allows_corrections && self.traversal.is_space_substitution_terminal(ctx, &node) {
                self.create_next_word_node(ctx, cache, bigrams, &node, true);
            }

            expand::collect_child_nodes(&node, ctx.lexicon(), &mut children);
            for child in children.drain(..) {
                if is_completion {
                    self.process_node_as_match(ctx, cache, bigrams, child);
                    continue;
                }
                if allows_corrections && self.traversal.is_omission(ctx, &node, &child) {
                    self.process_node_as_omission(ctx, cache, bigrams, child.clone());
                }
                use crate::keyboard::proximity::ProximityType::*;
                match self.traversal.proximity_type(ctx, &node, &child) {
                    MatchChar | ProximityChar => {
                        self.process_node_as_match(ctx, cache, bigrams, child);
                    }
                    AdditionalProximityChar => {
                        if allows_corrections {
                            self.process_node_as_additional_proximity(
                                ctx, cache, bigrams, &node, child,
                            );
                        }
                    }
                    SubstitutionChar => {
                        if allows_corrections {
                            self.process_node_as_substitution(ctx, cache, bigrams, &node, child);
                        }
                    }
                    UnrelatedChar => {}
                }
            }

            // Re-queue as a lookahead anchor: the node stays at its input
            // position to serve insertion/transposition next step.
            if allows_corrections && can_look_ahead && anchors_queued < LOOKAHEAD_NODE_CACHE_SIZE
            {
                cache.push_next_active(node);
                anchors_queued += 1;
            }
        }
    }

    /// Collect the hypothesis as a terminal candidate if it ends a word.
    fn process_terminal_node(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        node: &SearchNode,
    ) {
        if node.scoring().compound_distance() >= DISTANCE_CEILING {
            return;
        }
        if !node.is_terminal_word_node() {
            return;
        }
        if self.traversal.needs_to_traverse_all_user_input()
            && (node.input_index(0) as usize) < ctx.input_size()
        {
            return;
        }
        if node.should_be_filtered_by_safety_net_for_bigram() {
            return;
        }
        let mut terminal = node.clone();
        apply_cost_and_advance(
            &*self.weighting,
            CorrectionKind::Terminal,
            ctx,
            None,
            &mut terminal,
            Some(bigrams),
        );
        cache.push_terminal(terminal);
    }

    /// Route a weighted child: collect as terminal, spawn a space-omission
    /// next word, and re-queue while the trie continues.
    fn process_expanded_node(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        child: SearchNode,
    ) {
        self.process_terminal_node(ctx, cache, bigrams, &child);
        if child.scoring().compound_distance() < DISTANCE_CEILING {
            if self.traversal.is_space_omission_terminal(ctx, &child) {
                self.create_next_word_node(ctx, cache, bigrams, &child, false);
            }
            let allows_look_ahead =
                !(child.has_multiple_words() && child.is_completion(ctx.input_size()));
            if child.has_children() && allows_look_ahead {
                cache.push_next_active(child);
            }
        }
    }

    fn weight_child_node(&self, ctx: &DecodeContext, child: &mut SearchNode) {
        let kind = if child.is_completion(ctx.input_size()) {
            CorrectionKind::Completion
        } else {
            CorrectionKind::Match
        };
        apply_cost_and_advance(&*self.weighting, kind, ctx, None, child, None);
    }

    fn process_node_as_match(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        mut child: SearchNode,
    ) {
        self.weight_child_node(ctx, &mut child);
        self.process_expanded_node(ctx, cache, bigrams, child);
    }

    fn process_node_as_additional_proximity(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        parent: &SearchNode,
        mut child: SearchNode,
    ) {
        apply_cost_and_advance(
            &*self.weighting,
            CorrectionKind::AdditionalProximity,
            ctx,
            Some(parent),
            &mut child,
            None,
        );
        self.weight_child_node(ctx, &mut child);
        self.process_expanded_node(ctx, cache, bigrams, child);
    }

    fn process_node_as_substitution(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        parent: &SearchNode,
        mut child: SearchNode,
    ) {
        apply_cost_and_advance(
            &*self.weighting,
            CorrectionKind::Substitution,
            ctx,
            Some(parent),
            &mut child,
            None,
        );
        self.weight_child_node(ctx, &mut child);
        self.process_expanded_node(ctx, cache, bigrams, child);
    }

    /// Skip the node's letter without consuming input, then require the next
    /// letter to align with the current point.
    fn process_node_as_omission(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        omission_node: SearchNode,
    ) {
        let zero_cost = omission_node.is_zero_cost_omission();
        let mut grandchildren = Vec::new();
        expand::collect_child_nodes(&omission_node, ctx.lexicon(), &mut grandchildren);
        for mut grandchild in grandchildren {
            if !zero_cost {
                apply_cost_and_advance(
                    &*self.weighting,
                    CorrectionKind::Omission,
                    ctx,
                    Some(&omission_node),
                    &mut grandchild,
                    None,
                );
            }
            self.weight_child_node(ctx, &mut grandchild);
            if !self
                .traversal
                .is_possible_omission_child(ctx, &omission_node, &grandchild)
            {
                continue;
            }
            self.process_expanded_node(ctx, cache, bigrams, grandchild);
        }
    }

    /// Skip the spurious latest point and match the one after it.
    fn process_node_as_insertion(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        node: &SearchNode,
    ) {
        let point = node.input_index(0) as usize;
        let mut children = Vec::new();
        expand::collect_proximity_child_nodes(
            node,
            ctx.lexicon(),
            ctx.proximity_state(0),
            point + 1,
            true,
            &mut children,
        );
        for mut child in children {
            apply_cost_and_advance(
                &*self.weighting,
                CorrectionKind::Insertion,
                ctx,
                Some(node),
                &mut child,
                None,
            );
            self.process_expanded_node(ctx, cache, bigrams, child);
        }
    }

    /// Swap the next two points: descend into a letter near the later point,
    /// then its child near the earlier one.
    fn process_node_as_transposition(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        node: &SearchNode,
    ) {
        let point = node.input_index(0) as usize;
        let mut first_level = Vec::new();
        expand::collect_proximity_child_nodes(
            node,
            ctx.lexicon(),
            ctx.proximity_state(0),
            point + 1,
            false,
            &mut first_level,
        );
        for first in first_level {
            if !first.has_children() {
                continue;
            }
            let mut second_level = Vec::new();
            expand::collect_proximity_child_nodes(
                &first,
                ctx.lexicon(),
                ctx.proximity_state(0),
                point,
                false,
                &mut second_level,
            );
            for mut second in second_level {
                apply_cost_and_advance(
                    &*self.weighting,
                    CorrectionKind::Transposition,
                    ctx,
                    Some(&first),
                    &mut second,
                    None,
                );
                self.process_expanded_node(ctx, cache, bigrams, second);
            }
        }
    }

    /// Start a new word from the trie root, chaining the finished word.
    /// Charges the finished word's language cost; a space substitution also
    /// consumes the substituted point.
    fn create_next_word_node(
        &self,
        ctx: &DecodeContext,
        cache: &mut FrontierCache,
        bigrams: &mut BigramCache,
        node: &SearchNode,
        space_substitution: bool,
    ) {
        if !self.traversal.is_good_to_traverse_next_word(node) {
            return;
        }
        let mut new_node = SearchNode::next_word_root(ctx.lexicon(), node);
        apply_cost_and_advance(
            &*self.weighting,
            CorrectionKind::NewWord,
            ctx,
            Some(node),
            &mut new_node,
            Some(bigrams),
        );
        if space_substitution {
            apply_cost_and_advance(
                &*self.weighting,
                CorrectionKind::SpaceSubstitution,
                ctx,
                Some(node),
                &mut new_node,
                None,
            );
        }
        cache.push_next_active(new_node);
    }

    /// Drain the terminal pool into the output buffers, best first.
    fn output_suggestions(
        &self,
        session: &mut TraverseSession,
        results: &mut SuggestResults,
    ) -> usize {
        let _span = debug_span!("output_suggestions").entered();
        let input_size = session.input_size();
        let (ctx, cache, _) = session.split_mut();

        // Largest-key-first drain, reversed: index 0 is the best candidate.
        let mut terminals: Vec<SearchNode> = Vec::with_capacity(cache.terminal_size());
        while let Some(terminal) = cache.pop_worst_terminal() {
            terminals.push(terminal);
        }
        terminals.reverse();
        // One slot per word: keep the best-ranked hypothesis for each
        // distinct output string.
        let mut seen_words: std::collections::HashSet<Vec<u32>> = std::collections::HashSet::new();
        terminals.retain(|t| seen_words.insert(t.word().to_vec()));

        let language_weight = self.scoring.adjusted_language_weight(&terminals);

        let mut output_index = 0;
        let has_most_probable = self.scoring.emit_most_probable_string(
            ctx,
            &terminals,
            language_weight,
            results,
        );
        if has_most_probable {
            output_index += 1;
        }

        let (double_letter_index, double_letter_level) =
            self.scoring.search_word_with_double_letter(&terminals);

        // Demotion can reorder; rank by the adjusted distance so final
        // scores come out non-increasing.
        let mut ranked: Vec<(f32, SearchNode)> = terminals
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                let distance = t.scoring().compound_distance_with_weight(language_weight)
                    + self.scoring.double_letter_demotion_cost(
                        i,
                        double_letter_index,
                        double_letter_level,
                    );
                (distance, t)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut max_score = i32::MIN;
        for (compound_distance, terminal) in &ranked {
            if output_index >= MAX_RESULTS {
                break;
            }
            let is_valid_word = terminal.probability() > 0
                && !terminal.is_blacklisted_or_not_a_word();
            let force_commit = self.traversal.allow_partial_commit()
                && (ctx.is_partially_committed()
                    || (input_size >= MIN_LEN_FOR_MULTI_WORD_AUTOCORRECT
                        && terminal.has_multiple_words()));
            let final_score = self.scoring.calculate_final_score(
                *compound_distance,
                input_size,
                force_commit || (is_valid_word && self.scoring.does_auto_correct_valid_word()),
            );
            max_score = max_score.max(final_score);

            if self.traversal.allow_partial_commit() && is_valid_word && output_index == 0 {
                let mut spaces = [-1i32; MAX_PREV_WORDS];
                terminal.output_space_positions(&mut spaces);
                results.set_space_indices(&spaces);
            }

            if is_valid_word {
                results.set_entry(
                    output_index,
                    terminal.word(),
                    final_score,
                    SuggestionKind::Correction,
                );
                output_index += 1;
            }

            // Invalid entries may still carry shortcuts worth surfacing.
            if let Some(pos) = terminal.pos() {
                let same_as_typed = self.traversal.same_as_typed(ctx, terminal);
                for shortcut in ctx.lexicon().shortcuts(pos) {
                    if output_index >= MAX_RESULTS {
                        break;
                    }
                    let (kind, frequency) = if shortcut.is_whitelist() && same_as_typed {
                        (SuggestionKind::Whitelist, i32::MAX - 1)
                    } else {
                        (SuggestionKind::Shortcut, final_score.saturating_sub(1))
                    };
                    results.set_entry(output_index, &shortcut.code_points, frequency, kind);
                    output_index += 1;
                }
            }
        }

        if has_most_probable {
            self.scoring.safety_net_for_most_probable_string(max_score, results);
        }
        results.set_len(output_index);
        output_index
    }
}
