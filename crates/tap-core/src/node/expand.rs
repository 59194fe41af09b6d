//! Child-node collection.
//!
//! Trie descent produces one child hypothesis per letter under the parent's
//! cursor; the proximity variant pre-filters children against a touch
//! point's candidate rings (used by insertion and transposition, which match
//! letters against points the parent has not consumed yet).

use super::SearchNode;
use crate::keyboard::proximity::{ProximityState, ProximityType};
use crate::lexicon::Lexicon;

/// All trie children of `parent`, input cursor untouched.
pub fn collect_child_nodes(parent: &SearchNode, lexicon: &Lexicon, out: &mut Vec<SearchNode>) {
    let (start, count) = parent.child_range();
    out.reserve(count as usize);
    for pos in start..start + count as u32 {
        let info = lexicon.node(pos);
        out.push(SearchNode::child(&info, parent));
    }
}

/// Trie children of `parent` whose letter lies near touch point
/// `point_index`. With `exact_only` the primary key alone qualifies;
/// otherwise the first proximity ring does too.
pub fn collect_proximity_child_nodes(
    parent: &SearchNode,
    lexicon: &Lexicon,
    state: &ProximityState,
    point_index: usize,
    exact_only: bool,
    out: &mut Vec<SearchNode>,
) {
    if point_index >= state.size() {
        return;
    }
    let (start, count) = parent.child_range();
    for pos in start..start + count as u32 {
        let info = lexicon.node(pos);
        let keep = match state.classify(point_index, info.code_point) {
            ProximityType::MatchChar => true,
            ProximityType::ProximityChar => !exact_only,
            _ => false,
        };
        if keep {
            out.push(SearchNode::child(&info, parent));
        }
    }
}
