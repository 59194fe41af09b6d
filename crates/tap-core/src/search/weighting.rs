//! Weighting table: per-event cost assignment and input-cursor advancement.
//!
//! Every expansion routes through [`apply_cost_and_advance`], the single
//! place where a correction kind turns into spatial/language cost deltas,
//! cursor movement, correction counters, and double-letter evidence.

use crate::keyboard::base_lower;
use crate::keyboard::proximity::ProximityType;
use crate::node::scoring::DoubleLetterLevel;
use crate::node::SearchNode;
use crate::session::{BigramCache, DecodeContext};
use crate::settings::settings;

/// Probability scale of the lexicon (u8).
const MAX_PROBABILITY: f32 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    Match,
    Completion,
    AdditionalProximity,
    Substitution,
    Omission,
    Insertion,
    Transposition,
    SpaceSubstitution,
    NewWord,
    Terminal,
}

impl CorrectionKind {
    /// Input points the kind consumes.
    ///
    /// Substitution and additional-proximity forward nothing themselves; the
    /// match event that follows them consumes the point. Insertion forwards
    /// two: the skipped spurious point plus the matched one.
    fn forward_input_count(self) -> i16 {
        match self {
            CorrectionKind::Match => 1,
            CorrectionKind::SpaceSubstitution => 1,
            CorrectionKind::Insertion | CorrectionKind::Transposition => 2,
            CorrectionKind::Completion
            | CorrectionKind::AdditionalProximity
            | CorrectionKind::Substitution
            | CorrectionKind::Omission
            | CorrectionKind::NewWord
            | CorrectionKind::Terminal => 0,
        }
    }

    fn is_edit_correction(self) -> bool {
        matches!(
            self,
            CorrectionKind::AdditionalProximity
                | CorrectionKind::Substitution
                | CorrectionKind::Omission
                | CorrectionKind::Insertion
                | CorrectionKind::Transposition
        )
    }
}

/// Cost hooks one decoding model provides.
pub trait CostModel {
    fn matched_cost(&self, ctx: &DecodeContext, node: &SearchNode) -> f32;
    fn completion_cost(&self) -> f32;
    fn additional_proximity_cost(&self) -> f32;
    fn substitution_cost(&self) -> f32;
    fn omission_cost(&self, parent: &SearchNode, child: &SearchNode) -> f32;
    fn insertion_cost(&self, ctx: &DecodeContext, child: &SearchNode) -> f32;
    fn transposition_cost(&self, ctx: &DecodeContext, first: &SearchNode, second: &SearchNode)
        -> f32;
    fn space_substitution_cost(&self) -> f32;
    fn new_word_cost(&self) -> f32;
    /// Unigram/bigram cost of the completed word ending at `word_node`.
    fn word_language_cost(
        &self,
        ctx: &DecodeContext,
        word_node: &SearchNode,
        bigrams: Option<&mut BigramCache>,
    ) -> f32;
    /// Double-letter evidence contributed by an insertion.
    fn insertion_double_letter_level(&self, ctx: &DecodeContext, child: &SearchNode)
        -> DoubleLetterLevel;
    fn needs_normalization(&self) -> bool;
    fn edit_correction_budget(&self, input_size: usize) -> u16;
}

/// Route one expansion event through the weighting table.
///
/// Advances the child's input cursor by the kind's delta, charges the
/// spatial/language costs, bumps correction counters, folds in double-letter
/// evidence, and prunes the child outright when it blows the edit budget.
pub fn apply_cost_and_advance(
    model: &dyn CostModel,
    kind: CorrectionKind,
    ctx: &DecodeContext,
    parent: Option<&SearchNode>,
    child: &mut SearchNode,
    bigrams: Option<&mut BigramCache>,
) {
    child.forward_input_index(0, kind.forward_input_count());

    let mut is_proximity_correction = false;
    let spatial = match kind {
        CorrectionKind::Match => {
            let point = child.input_index(0) as usize - 1;
            if ctx.proximity_state(0).classify(point, child.code_point())
                == ProximityType::ProximityChar
            {
                is_proximity_correction = true;
            }
            model.matched_cost(ctx, child)
        }
        CorrectionKind::Completion => model.completion_cost(),
        CorrectionKind::AdditionalProximity => {
            is_proximity_correction = true;
            model.additional_proximity_cost()
        }
        CorrectionKind::Substitution => model.substitution_cost(),
        CorrectionKind::Omission => {
            let parent = parent.expect("omission requires the skipped node");
            model.omission_cost(parent, child)
        }
        CorrectionKind::Insertion => model.insertion_cost(ctx, child),
        CorrectionKind::Transposition => {
            let first = parent.expect("transposition requires the first-level child");
            model.transposition_cost(ctx, first, child)
        }
        CorrectionKind::SpaceSubstitution => model.space_substitution_cost(),
        CorrectionKind::NewWord => model.new_word_cost(),
        CorrectionKind::Terminal => 0.0,
    };

    let language = match kind {
        CorrectionKind::Terminal => model.word_language_cost(ctx, child, bigrams),
        CorrectionKind::NewWord => {
            let finished = parent.expect("new word requires the finished terminal");
            model.word_language_cost(ctx, finished, bigrams)
        }
        _ => 0.0,
    };

    let is_edit = kind.is_edit_correction();
    let total_input_index = child.total_input_index();
    child.scoring_mut().add_cost(
        spatial,
        language,
        model.needs_normalization(),
        total_input_index,
        is_edit,
        is_proximity_correction,
    );
    child.scoring_mut().add_raw_length(spatial);

    if kind == CorrectionKind::Insertion {
        let level = model.insertion_double_letter_level(ctx, child);
        child.scoring_mut().set_double_letter_level(level);
    }

    if is_edit
        && child.scoring().edit_correction_count()
            > model.edit_correction_budget(ctx.input_size())
    {
        child.scoring_mut().mark_pruned();
    }
}

/// Cost model for discrete tap typing, driven by the settings table.
#[derive(Default)]
pub struct TypingCostModel;

impl TypingCostModel {
    fn probability_cost(&self, probability: u8) -> f32 {
        (MAX_PROBABILITY - probability as f32) / MAX_PROBABILITY * settings().costs.language_weight
    }
}

impl CostModel for TypingCostModel {
    fn matched_cost(&self, ctx: &DecodeContext, node: &SearchNode) -> f32 {
        let point = node.input_index(0) as usize - 1;
        ctx.proximity_state(0).point_to_key_cost(point, node.code_point())
    }

    fn completion_cost(&self) -> f32 {
        settings().costs.completion
    }

    fn additional_proximity_cost(&self) -> f32 {
        settings().costs.additional_proximity
    }

    fn substitution_cost(&self) -> f32 {
        settings().costs.substitution
    }

    fn omission_cost(&self, _parent: &SearchNode, _child: &SearchNode) -> f32 {
        settings().costs.omission
    }

    fn insertion_cost(&self, ctx: &DecodeContext, child: &SearchNode) -> f32 {
        let state = ctx.proximity_state(0);
        let skipped = child.input_index(0) as usize - 2;
        let same_char = state.primary_code_point(skipped) == base_lower(child.code_point());
        if same_char {
            settings().costs.insertion_same_char
        } else {
            settings().costs.insertion
        }
    }

    fn transposition_cost(
        &self,
        ctx: &DecodeContext,
        first: &SearchNode,
        second: &SearchNode,
    ) -> f32 {
        let state = ctx.proximity_state(0);
        let base = second.input_index(0) as usize - 2;
        settings().costs.transposition
            + state.point_to_key_cost(base + 1, first.code_point())
            + state.point_to_key_cost(base, second.code_point())
    }

    fn space_substitution_cost(&self) -> f32 {
        settings().costs.space_substitution
    }

    fn new_word_cost(&self) -> f32 {
        settings().costs.new_word
    }

    fn word_language_cost(
        &self,
        ctx: &DecodeContext,
        word_node: &SearchNode,
        bigrams: Option<&mut BigramCache>,
    ) -> f32 {
        let unigram = word_node.probability();
        let mut probability = unigram;
        if let (Some(bigrams), Some(pos)) = (bigrams, word_node.pos()) {
            let prev = word_node.prev_word_node_pos().or_else(|| ctx.prev_word_pos());
            if let Some(prev) = prev {
                if let Some(bigram) = bigrams.probability(ctx.lexicon(), prev, pos) {
                    probability = probability.max(bigram);
                }
            }
        }
        self.probability_cost(probability)
    }

    fn insertion_double_letter_level(
        &self,
        ctx: &DecodeContext,
        child: &SearchNode,
    ) -> DoubleLetterLevel {
        let state = ctx.proximity_state(0);
        let skipped = child.input_index(0) as usize - 2;
        if state.primary_code_point(skipped) != base_lower(child.code_point()) {
            return DoubleLetterLevel::None;
        }
        let dwell = state.time(skipped + 1).saturating_sub(state.time(skipped));
        if state.time(skipped) >= 0
            && dwell >= settings().keyboard.strong_double_letter_dwell_ms
        {
            DoubleLetterLevel::Strong
        } else {
            DoubleLetterLevel::Weak
        }
    }

    fn needs_normalization(&self) -> bool {
        true
    }

    fn edit_correction_budget(&self, input_size: usize) -> u16 {
        settings()
            .search
            .max_edit_corrections
            .min(1 + input_size as u16 / 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::ProximityMap;
    use crate::lexicon::{Lexicon, WordEntry};
    use crate::node::expand;
    use crate::results::TouchInput;
    use crate::session::TraverseSession;
    use std::sync::Arc;

    fn session_for(word: &str, times: Option<&[i32]>) -> TraverseSession {
        let lexicon = Arc::new(
            Lexicon::from_entries([
                WordEntry::new("this", 200),
                WordEntry::new("he", 150).with_bigram("is", 230),
                WordEntry::new("is", 220),
                WordEntry::new("pit", 120),
            ])
            .unwrap(),
        );
        let mut session = TraverseSession::new(lexicon);
        let map = ProximityMap::qwerty();
        let cps: Vec<i32> = word.chars().map(|c| c as i32).collect();
        let n = cps.len();
        let xs = vec![-1; n];
        let ys = vec![-1; n];
        let default_times: Vec<i32> = (0..n as i32).map(|i| i * 100).collect();
        let times: Vec<i32> = times.map(|t| t.to_vec()).unwrap_or(default_times);
        let ids = vec![0; n];
        session.setup(
            &map,
            &TouchInput {
                xs: &xs,
                ys: &ys,
                times: &times,
                pointer_ids: &ids,
                code_points: &cps,
            },
            4.0,
            1,
        );
        session
    }

    fn child_of(session: &TraverseSession, parent: &SearchNode, c: char) -> SearchNode {
        let mut out = Vec::new();
        expand::collect_child_nodes(parent, session.ctx().lexicon(), &mut out);
        out.into_iter()
            .find(|n| n.code_point() == c as u32)
            .unwrap_or_else(|| panic!("no child {c}"))
    }

    #[test]
    fn match_advances_one_point_for_free() {
        let session = session_for("this", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let mut t = child_of(&session, &root, 't');
        apply_cost_and_advance(&model, CorrectionKind::Match, session.ctx(), None, &mut t, None);
        assert_eq!(t.input_index(0), 1);
        assert_eq!(t.scoring().spatial_distance(), 0.0);
        assert_eq!(t.scoring().edit_correction_count(), 0);
        assert_eq!(t.scoring().proximity_correction_count(), 0);
    }

    #[test]
    fn proximity_match_costs_and_counts() {
        // Typed 'r' against the trie letter 't': first-ring proximity.
        let session = session_for("rhis", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let mut t = child_of(&session, &root, 't');
        apply_cost_and_advance(&model, CorrectionKind::Match, session.ctx(), None, &mut t, None);
        assert_eq!(t.input_index(0), 1);
        assert!((t.scoring().spatial_distance() - settings().costs.proximity).abs() < 1e-6);
        assert_eq!(t.scoring().proximity_correction_count(), 1);
        assert_eq!(t.scoring().edit_correction_count(), 0);
    }

    #[test]
    fn substitution_then_match_consumes_one_point() {
        // Typed 'x' against 't': unrelated key, charged as substitution.
        let session = session_for("xhis", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let mut t = child_of(&session, &root, 't');
        apply_cost_and_advance(
            &model,
            CorrectionKind::Substitution,
            session.ctx(),
            Some(&root),
            &mut t,
            None,
        );
        assert_eq!(t.input_index(0), 0);
        apply_cost_and_advance(&model, CorrectionKind::Match, session.ctx(), None, &mut t, None);
        assert_eq!(t.input_index(0), 1);
        assert_eq!(t.scoring().edit_correction_count(), 1);
        assert!((t.scoring().spatial_distance() - settings().costs.substitution).abs() < 1e-6);
    }

    #[test]
    fn omission_keeps_the_cursor() {
        let session = session_for("ths", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let t = child_of(&session, &root, 't');
        let mut h = child_of(&session, &t, 'h');
        apply_cost_and_advance(
            &model,
            CorrectionKind::Omission,
            session.ctx(),
            Some(&t),
            &mut h,
            None,
        );
        assert_eq!(h.input_index(0), 0);
        assert_eq!(h.scoring().edit_correction_count(), 1);
        assert!((h.scoring().spatial_distance() - settings().costs.omission).abs() < 1e-6);
    }

    #[test]
    fn insertion_advances_two_points() {
        let session = session_for("pitt", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let p = child_of(&session, &root, 'p');
        let i = child_of(&session, &p, 'i');
        let mut t = child_of(&session, &i, 't');
        // Anchor consumed two points; insertion skips point 2 and matches 3.
        t.forward_input_index(0, 2);
        apply_cost_and_advance(
            &model,
            CorrectionKind::Insertion,
            session.ctx(),
            Some(&i),
            &mut t,
            None,
        );
        assert_eq!(t.input_index(0), 4);
        assert_eq!(t.scoring().edit_correction_count(), 1);
    }

    #[test]
    fn same_char_insertion_is_cheaper_and_sets_double_letter() {
        // "pitt": skipped point 2 is 't', matched child is 't' as well.
        let session = session_for("pitt", None);
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let p = child_of(&session, &root, 'p');
        let i = child_of(&session, &p, 'i');
        let mut t = child_of(&session, &i, 't');
        t.forward_input_index(0, 2);
        apply_cost_and_advance(
            &model,
            CorrectionKind::Insertion,
            session.ctx(),
            Some(&i),
            &mut t,
            None,
        );
        assert!(
            (t.scoring().spatial_distance() - settings().costs.insertion_same_char).abs() < 1e-6
        );
        assert_eq!(t.scoring().double_letter_level(), DoubleLetterLevel::Weak);
    }

    #[test]
    fn slow_same_char_insertion_is_a_strong_double_letter() {
        let times = [0, 100, 200, 700];
        let session = session_for("pitt", Some(&times));
        let model = TypingCostModel;
        let root = SearchNode::root(session.ctx().lexicon());
        let p = child_of(&session, &root, 'p');
        let i = child_of(&session, &p, 'i');
        let mut t = child_of(&session, &i, 't');
        t.forward_input_index(0, 2);
        apply_cost_and_advance(
            &model,
            CorrectionKind::Insertion,
            session.ctx(),
            Some(&i),
            &mut t,
            None,
        );
        assert_eq!(t.scoring().double_letter_level(), DoubleLetterLevel::Strong);
    }

    #[test]
    fn terminal_charges_bigram_improved_language_cost() {
        let session = session_for("is", None);
        let model = TypingCostModel;
        let lexicon = session.lexicon();
        let he = lexicon.find_word("he").unwrap();

        let root = SearchNode::root(&lexicon);
        let i = child_of(&session, &root, 'i');
        let mut is = child_of(&session, &i, 's');
        is.forward_input_index(0, 2);

        // Unigram only.
        let mut bigrams = crate::session::BigramCache::default();
        let mut unigram_node = is.clone();
        apply_cost_and_advance(
            &model,
            CorrectionKind::Terminal,
            session.ctx(),
            None,
            &mut unigram_node,
            Some(&mut bigrams),
        );
        let unigram_cost = unigram_node.scoring().language_distance();

        // With "he" as the previous word the bigram (230 > 220) wins.
        let mut session = session;
        session.set_prev_word_pos(Some(he.pos));
        let mut bigram_node = is.clone();
        let (ctx, _, bigram_cache) = session.split_mut();
        apply_cost_and_advance(
            &model,
            CorrectionKind::Terminal,
            ctx,
            None,
            &mut bigram_node,
            Some(bigram_cache),
        );
        let bigram_cost = bigram_node.scoring().language_distance();
        assert!(bigram_cost < unigram_cost);
    }

    #[test]
    fn edit_budget_overflow_prunes() {
        let session = session_for("xxq", None);
        let model = TypingCostModel;
        // Budget for 3 points is min(3, 1 + 0) = 1.
        assert_eq!(model.edit_correction_budget(3), 1);
        let root = SearchNode::root(session.ctx().lexicon());
        let mut t = child_of(&session, &root, 't');
        apply_cost_and_advance(
            &model,
            CorrectionKind::Substitution,
            session.ctx(),
            Some(&root),
            &mut t,
            None,
        );
        assert!(t.scoring().compound_distance() < crate::node::scoring::DISTANCE_CEILING);
        apply_cost_and_advance(
            &model,
            CorrectionKind::Substitution,
            session.ctx(),
            Some(&root),
            &mut t,
            None,
        );
        assert!(t.scoring().compound_distance() >= crate::node::scoring::DISTANCE_CEILING);
    }
}
