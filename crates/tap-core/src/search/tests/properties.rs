//! Randomized decoder invariants.
//!
//! Feeds arbitrary typed inputs through the full pipeline and checks the
//! structural guarantees that must hold for every input, printable or not.

use proptest::prelude::*;

use crate::results::{SuggestionKind, MAX_RESULTS, MAX_WORD_LENGTH};
use crate::search::testutil::*;

fn arb_typed_word() -> impl Strategy<Value = String> {
    // Letters weighted toward the fixture words, plus noise keys.
    proptest::collection::vec(
        prop_oneof![
            4 => prop::sample::select(vec!['t', 'h', 'i', 's', 'e', 'o', 'l', 'w']),
            1 => prop::sample::select(vec!['q', 'z', 'x', 'v', 'b', 'r', 'd', 'n']),
        ],
        1..10,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decode_never_violates_output_invariants(word in arb_typed_word()) {
        let (decoder, mut session, map) = fresh_session(test_lexicon());
        let results = decode_typed(&decoder, &mut session, &map, &word);

        prop_assert!(results.len() <= MAX_RESULTS);
        let mut last_correction_score = i32::MAX;
        for i in 0..results.len() {
            let suggestion = results.word_at(i);
            prop_assert!(!suggestion.is_empty());
            prop_assert!(results.code_points_at(i).len() <= MAX_WORD_LENGTH);
            prop_assert!(results.frequency_at(i) >= 0);
            if results.kind_at(i) == SuggestionKind::Correction {
                prop_assert!(results.frequency_at(i) <= last_correction_score);
                last_correction_score = results.frequency_at(i);
            }
        }
    }

    #[test]
    fn decode_is_deterministic(word in arb_typed_word()) {
        let (decoder, mut session, map) = fresh_session(test_lexicon());
        let first = decode_typed(&decoder, &mut session, &map, &word);
        let second = decode_typed(&decoder, &mut session, &map, &word);
        prop_assert_eq!(first.len(), second.len());
        for i in 0..first.len() {
            prop_assert_eq!(first.word_at(i), second.word_at(i));
            prop_assert_eq!(first.frequency_at(i), second.frequency_at(i));
        }
    }

    #[test]
    fn growing_input_never_panics(word in arb_typed_word()) {
        // Exercise the continuous-search path across every prefix length.
        let (decoder, mut session, map) = fresh_session(test_lexicon());
        let chars: Vec<char> = word.chars().collect();
        for end in 1..=chars.len() {
            let prefix: String = chars[..end].iter().collect();
            let results = decode_typed(&decoder, &mut session, &map, &prefix);
            prop_assert!(results.len() <= MAX_RESULTS);
        }
    }
}
