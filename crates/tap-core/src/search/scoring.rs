//! Final ranking: language-weight adjustment, double-letter demotion,
//! autocorrect promotion, and the most-probable-string slot.

use crate::node::scoring::DoubleLetterLevel;
use crate::node::SearchNode;
use crate::results::{SuggestResults, SuggestionKind};
use crate::session::DecodeContext;
use crate::settings::settings;

/// Normalized compound distance below which a candidate may claim the
/// most-probable slot.
pub const AUTOCORRECT_CLASSIFICATION_THRESHOLD: f32 = 0.33;
/// Spatial share of the top terminal's distance above which language scores
/// are down-weighted.
pub const AUTOCORRECT_LANGUAGE_FEATURE_THRESHOLD: f32 = 0.60;
/// Final scores at or above this value trigger autocorrection in the host.
pub const AUTOCORRECT_SCORE_THRESHOLD: i32 = 1_000_000;

const SCORE_HALF_RANGE: f32 = 500_000.0;
const AUTOCORRECT_PROMOTION: i32 = 1_000_000;

pub trait Scoring {
    /// Multiplier applied to language distances during final ranking.
    fn adjusted_language_weight(&self, terminals: &[SearchNode]) -> f32;

    /// Emit a dominant candidate at slot 0 when one exists; returns whether
    /// the slot was taken.
    fn emit_most_probable_string(
        &self,
        ctx: &DecodeContext,
        terminals: &[SearchNode],
        language_weight: f32,
        results: &mut SuggestResults,
    ) -> bool;

    /// Locate the terminal carrying the strongest double-letter evidence.
    fn search_word_with_double_letter(
        &self,
        terminals: &[SearchNode],
    ) -> (Option<usize>, DoubleLetterLevel);

    fn double_letter_demotion_cost(
        &self,
        index: usize,
        double_letter_index: Option<usize>,
        level: DoubleLetterLevel,
    ) -> f32;

    fn calculate_final_score(
        &self,
        compound_distance: f32,
        input_size: usize,
        should_autocorrect: bool,
    ) -> i32;

    fn does_auto_correct_valid_word(&self) -> bool;

    /// Demote slot 0 when another suggestion out-scored the most-probable
    /// emission, so a stale slot 0 cannot force a bad autocorrect.
    fn safety_net_for_most_probable_string(&self, max_score: i32, results: &mut SuggestResults);
}

/// Ranking policy for tap typing.
pub struct TypingScoring {
    pub emit_most_probable: bool,
    pub most_probable_margin: f32,
    pub promote_valid_words: bool,
    pub min_language_weight: f32,
}

impl Default for TypingScoring {
    fn default() -> Self {
        let s = settings();
        Self {
            emit_most_probable: s.autocorrect.emit_most_probable,
            most_probable_margin: s.autocorrect.most_probable_margin,
            promote_valid_words: s.autocorrect.promote_valid_words,
            min_language_weight: s.autocorrect.min_language_weight,
        }
    }
}

fn normalized_with_weight(node: &SearchNode, language_weight: f32, input_size: usize) -> f32 {
    node.scoring().compound_distance_with_weight(language_weight) / input_size.max(1) as f32
}

impl Scoring for TypingScoring {
    fn adjusted_language_weight(&self, terminals: &[SearchNode]) -> f32 {
        let Some(best) = terminals.first() else {
            return 1.0;
        };
        let spatial = best.scoring().spatial_distance();
        let total = spatial + best.scoring().language_distance();
        if total > 0.0 && spatial / total >= AUTOCORRECT_LANGUAGE_FEATURE_THRESHOLD {
            self.min_language_weight
        } else {
            1.0
        }
    }

    fn emit_most_probable_string(
        &self,
        ctx: &DecodeContext,
        terminals: &[SearchNode],
        language_weight: f32,
        results: &mut SuggestResults,
    ) -> bool {
        if !self.emit_most_probable {
            return false;
        }
        let Some(best) = terminals.first() else {
            return false;
        };
        let input_size = ctx.input_size();
        let best_distance = normalized_with_weight(best, language_weight, input_size);
        if best_distance >= AUTOCORRECT_CLASSIFICATION_THRESHOLD {
            return false;
        }
        if let Some(second) = terminals.get(1) {
            let margin = normalized_with_weight(second, language_weight, input_size) - best_distance;
            if margin < self.most_probable_margin {
                return false;
            }
        }
        let score = self.calculate_final_score(
            best.scoring().compound_distance_with_weight(language_weight),
            input_size,
            true,
        );
        results.set_entry(0, best.word(), score, SuggestionKind::Correction);
        true
    }

    fn search_word_with_double_letter(
        &self,
        terminals: &[SearchNode],
    ) -> (Option<usize>, DoubleLetterLevel) {
        let mut found = None;
        let mut level = DoubleLetterLevel::None;
        for (i, terminal) in terminals.iter().enumerate() {
            let node_level = terminal.scoring().double_letter_level();
            if node_level > level {
                level = node_level;
                found = Some(i);
                if level == DoubleLetterLevel::Strong {
                    break;
                }
            }
        }
        (found, level)
    }

    fn double_letter_demotion_cost(
        &self,
        index: usize,
        double_letter_index: Option<usize>,
        level: DoubleLetterLevel,
    ) -> f32 {
        if double_letter_index != Some(index) {
            return 0.0;
        }
        match level {
            DoubleLetterLevel::None => 0.0,
            DoubleLetterLevel::Weak => settings().costs.double_letter_demotion * 0.5,
            DoubleLetterLevel::Strong => settings().costs.double_letter_demotion,
        }
    }

    fn calculate_final_score(
        &self,
        compound_distance: f32,
        input_size: usize,
        should_autocorrect: bool,
    ) -> i32 {
        let normalized = compound_distance / input_size.max(1) as f32;
        let base = ((2.0 - normalized.min(2.0)) * SCORE_HALF_RANGE) as i32;
        if should_autocorrect {
            base + AUTOCORRECT_PROMOTION
        } else {
            base
        }
    }

    fn does_auto_correct_valid_word(&self) -> bool {
        self.promote_valid_words
    }

    fn safety_net_for_most_probable_string(&self, max_score: i32, results: &mut SuggestResults) {
        if max_score > results.frequency_at(0) {
            let demoted = results
                .frequency_at(0)
                .min(AUTOCORRECT_SCORE_THRESHOLD - 1);
            results.set_frequency(0, demoted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoring() -> TypingScoring {
        TypingScoring {
            emit_most_probable: true,
            ..TypingScoring::default()
        }
    }

    #[test]
    fn final_score_decreases_with_distance() {
        let s = scoring();
        let close = s.calculate_final_score(0.1, 4, false);
        let far = s.calculate_final_score(1.2, 4, false);
        assert!(close > far);
        assert!(close < AUTOCORRECT_SCORE_THRESHOLD);
    }

    #[test]
    fn autocorrect_promotion_crosses_the_threshold() {
        let s = scoring();
        let promoted = s.calculate_final_score(0.1, 4, true);
        assert!(promoted >= AUTOCORRECT_SCORE_THRESHOLD);
    }

    #[test]
    fn distances_beyond_range_clamp_to_zero() {
        let s = scoring();
        assert_eq!(s.calculate_final_score(100.0, 4, false), 0);
    }

    #[test]
    fn safety_net_demotes_beaten_slot_zero() {
        let s = scoring();
        let mut results = SuggestResults::new();
        let word: Vec<u32> = "word".chars().map(|c| c as u32).collect();
        results.set_entry(0, &word, 1_900_000, SuggestionKind::Correction);
        s.safety_net_for_most_probable_string(1_950_000, &mut results);
        assert!(results.frequency_at(0) < AUTOCORRECT_SCORE_THRESHOLD);

        // An unbeaten slot 0 keeps its score.
        results.set_entry(0, &word, 1_900_000, SuggestionKind::Correction);
        s.safety_net_for_most_probable_string(1_800_000, &mut results);
        assert_eq!(results.frequency_at(0), 1_900_000);
    }
}
