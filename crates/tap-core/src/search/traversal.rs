//! Traversal policy: which expansions are legal for a given hypothesis.
//!
//! The decoder asks the policy, never the settings, so tests can inject
//! variants (and a gesture-style policy could slot in without touching the
//! driver).

use crate::keyboard::base_lower;
use crate::keyboard::proximity::ProximityType;
use crate::node::{SearchNode, MAX_POINTER_COUNT};
use crate::session::{DecodeContext, TraverseSession};
use crate::settings::settings;

use super::MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE;

/// Widest plausible touch offset, in key widths.
pub const MAX_SPATIAL_DISTANCE: f32 = 4.0;

pub trait Traversal {
    fn max_cache_size(&self) -> usize;
    fn max_pointer_count(&self) -> usize;
    fn default_expand_node_size(&self) -> usize;
    fn max_spatial_distance(&self) -> f32;
    fn allow_partial_commit(&self) -> bool;

    /// Corrections stop once a hypothesis is already implausible.
    fn allows_error_corrections(&self, node: &SearchNode) -> bool;
    fn same_as_typed(&self, ctx: &DecodeContext, node: &SearchNode) -> bool;
    fn needs_to_traverse_all_user_input(&self) -> bool;

    fn should_depth_level_cache(&self, session: &TraverseSession) -> bool;
    fn should_node_level_cache(&self, ctx: &DecodeContext, node: &SearchNode) -> bool;
    fn can_do_look_ahead_correction(&self, ctx: &DecodeContext, node: &SearchNode) -> bool;

    fn is_space_substitution_terminal(&self, ctx: &DecodeContext, node: &SearchNode) -> bool;
    fn is_space_omission_terminal(&self, ctx: &DecodeContext, node: &SearchNode) -> bool;
    fn is_good_to_traverse_next_word(&self, node: &SearchNode) -> bool;

    fn is_omission(&self, ctx: &DecodeContext, parent: &SearchNode, child: &SearchNode) -> bool;
    fn is_possible_omission_child(
        &self,
        ctx: &DecodeContext,
        parent: &SearchNode,
        child: &SearchNode,
    ) -> bool;
    fn proximity_type(
        &self,
        ctx: &DecodeContext,
        parent: &SearchNode,
        child: &SearchNode,
    ) -> ProximityType;

    fn correct_omission(&self) -> bool {
        true
    }
    fn correct_insertion(&self) -> bool {
        true
    }
    fn correct_transposition(&self) -> bool {
        true
    }
    fn correct_space_substitution(&self) -> bool {
        true
    }
    fn correct_space_omission(&self) -> bool {
        true
    }
}

/// Policy for discrete tap typing.
pub struct TypingTraversal {
    pub allow_partial_commit: bool,
}

impl Default for TypingTraversal {
    fn default() -> Self {
        Self {
            allow_partial_commit: settings().search.allow_partial_commit,
        }
    }
}

impl Traversal for TypingTraversal {
    fn max_cache_size(&self) -> usize {
        settings().search.max_cache_size
    }

    fn max_pointer_count(&self) -> usize {
        MAX_POINTER_COUNT
    }

    fn default_expand_node_size(&self) -> usize {
        28
    }

    fn max_spatial_distance(&self) -> f32 {
        MAX_SPATIAL_DISTANCE
    }

    fn allow_partial_commit(&self) -> bool {
        self.allow_partial_commit
    }

    fn allows_error_corrections(&self, node: &SearchNode) -> bool {
        node.scoring().normalized_compound_distance()
            < settings().search.error_correction_threshold
    }

    fn same_as_typed(&self, ctx: &DecodeContext, node: &SearchNode) -> bool {
        let state = ctx.proximity_state(0);
        let word = node.word();
        word.len() == ctx.input_size()
            && word
                .iter()
                .enumerate()
                .all(|(i, &cp)| base_lower(cp) == state.primary_code_point(i))
    }

    fn needs_to_traverse_all_user_input(&self) -> bool {
        true
    }

    fn should_depth_level_cache(&self, session: &TraverseSession) -> bool {
        let input_size = session.input_size();
        input_size >= MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE
            && session.cache().input_index() == input_size as i32 - 1
    }

    fn should_node_level_cache(&self, _ctx: &DecodeContext, _node: &SearchNode) -> bool {
        false
    }

    fn can_do_look_ahead_correction(&self, ctx: &DecodeContext, node: &SearchNode) -> bool {
        !node.is_completion(ctx.input_size())
            && (node.input_index(0) as usize + 1) < ctx.input_size()
    }

    fn is_space_substitution_terminal(&self, ctx: &DecodeContext, node: &SearchNode) -> bool {
        if !self.correct_space_substitution() || !node.is_terminal_word_node() {
            return false;
        }
        let point = node.input_index(0) as usize;
        // Needs the substituted point plus at least one more for the next word.
        point + 2 <= ctx.input_size()
            && node.current_word_len() > 0
            && ctx.proximity_state(0).has_space_proximity(point)
    }

    fn is_space_omission_terminal(&self, ctx: &DecodeContext, node: &SearchNode) -> bool {
        self.correct_space_omission()
            && node.is_terminal_word_node()
            && !node.is_completion(ctx.input_size())
            && node.current_word_len() >= 2
    }

    fn is_good_to_traverse_next_word(&self, node: &SearchNode) -> bool {
        node.probability() >= settings().search.next_word_min_probability
            && !node.is_blacklisted_or_not_a_word()
    }

    fn is_omission(&self, ctx: &DecodeContext, parent: &SearchNode, child: &SearchNode) -> bool {
        if !self.correct_omission() || parent.is_completion(ctx.input_size()) {
            return false;
        }
        // Letters the match path already covers are not omission material.
        matches!(
            self.proximity_type(ctx, parent, child),
            ProximityType::SubstitutionChar | ProximityType::UnrelatedChar
        )
    }

    fn is_possible_omission_child(
        &self,
        ctx: &DecodeContext,
        parent: &SearchNode,
        child: &SearchNode,
    ) -> bool {
        // Keep the omission only when the following letter aligns with the
        // current point; unconditional skips flood the frontier.
        matches!(
            self.proximity_type(ctx, parent, child),
            ProximityType::MatchChar | ProximityType::ProximityChar
        )
    }

    fn proximity_type(
        &self,
        ctx: &DecodeContext,
        parent: &SearchNode,
        child: &SearchNode,
    ) -> ProximityType {
        let point = parent.input_index(0) as usize;
        if point >= ctx.input_size() {
            return ProximityType::UnrelatedChar;
        }
        let state = ctx.proximity_state(0);
        match state.classify(point, child.code_point()) {
            ProximityType::UnrelatedChar => {
                let child_is_letter = char::from_u32(child.code_point())
                    .is_some_and(|c| c.is_alphabetic());
                let typed_is_letter = char::from_u32(state.primary_code_point(point))
                    .is_some_and(|c| c.is_alphabetic());
                if child_is_letter && typed_is_letter {
                    ProximityType::SubstitutionChar
                } else {
                    ProximityType::UnrelatedChar
                }
            }
            other => other,
        }
    }
}
