use std::sync::Arc;

use crate::lexicon::{Lexicon, WordEntry};
use crate::results::SuggestionKind;
use crate::search::scoring::{TypingScoring, AUTOCORRECT_SCORE_THRESHOLD};
use crate::search::testutil::*;
use crate::search::traversal::TypingTraversal;
use crate::search::weighting::TypingCostModel;
use crate::search::Decoder;

#[test]
fn shortcut_rides_along_with_its_word() {
    let lexicon = Arc::new(
        Lexicon::from_entries([WordEntry::new("is", 220).with_shortcut("is not", 120)]).unwrap(),
    );
    let (decoder, mut session, map) = fresh_session(lexicon);
    let results = decode_typed(&decoder, &mut session, &map, "is");
    assert_eq!(results.word_at(0), "is");
    assert_eq!(results.kind_at(0), SuggestionKind::Correction);
    assert_eq!(results.word_at(1), "is not");
    assert_eq!(results.kind_at(1), SuggestionKind::Shortcut);
    assert!(results.frequency_at(1) < results.frequency_at(0));
}

#[test]
fn whitelist_shortcut_on_exactly_typed_word() {
    let lexicon = Arc::new(
        Lexicon::from_entries([WordEntry::new("ill", 180).with_shortcut("I'll", 255)]).unwrap(),
    );
    let (decoder, mut session, map) = fresh_session(lexicon);
    let results = decode_typed(&decoder, &mut session, &map, "ill");
    assert_eq!(results.word_at(0), "ill");
    assert_eq!(results.word_at(1), "I'll");
    assert_eq!(results.kind_at(1), SuggestionKind::Whitelist);
    assert_eq!(results.frequency_at(1), i32::MAX - 1);
}

#[test]
fn whitelist_downgrades_to_shortcut_when_not_typed_exactly() {
    let lexicon = Arc::new(
        Lexicon::from_entries([WordEntry::new("ill", 180).with_shortcut("I'll", 255)]).unwrap(),
    );
    let (decoder, mut session, map) = fresh_session(lexicon);
    // 'o' neighbors 'i'; the match is proximity, not exact.
    let results = decode_typed(&decoder, &mut session, &map, "oll");
    let words = words(&results);
    let shortcut_index = words.iter().position(|w| w == "I'll").unwrap();
    assert_eq!(results.kind_at(shortcut_index), SuggestionKind::Shortcut);
}

#[test]
fn blacklisted_word_is_suppressed_but_its_shortcut_survives() {
    let lexicon = Arc::new(
        Lexicon::from_entries([
            WordEntry::new("badword", 200)
                .blacklisted()
                .with_shortcut("replacement", 200),
        ])
        .unwrap(),
    );
    let (decoder, mut session, map) = fresh_session(lexicon);
    let results = decode_typed(&decoder, &mut session, &map, "badword");
    let words = words(&results);
    assert!(!words.contains(&"badword".to_string()), "words: {words:?}");
    assert!(words.contains(&"replacement".to_string()), "words: {words:?}");
}

#[test]
fn zero_probability_word_is_not_suggested() {
    let lexicon = Arc::new(
        Lexicon::from_entries([WordEntry::new("shadow", 0), WordEntry::new("shallow", 150)])
            .unwrap(),
    );
    let (decoder, mut session, map) = fresh_session(lexicon);
    let results = decode_typed(&decoder, &mut session, &map, "shadow");
    let words = words(&results);
    assert!(!words.contains(&"shadow".to_string()), "words: {words:?}");
}

fn most_probable_decoder() -> Decoder {
    Decoder::with_policies(
        Box::new(TypingTraversal::default()),
        Box::new(TypingScoring {
            emit_most_probable: true,
            ..TypingScoring::default()
        }),
        Box::new(TypingCostModel),
    )
}

#[test]
fn dominant_candidate_takes_the_top_slot() {
    let decoder = most_probable_decoder();
    let (_, mut session, map) = fresh_session(test_lexicon());
    let results = decode_typed(&decoder, &mut session, &map, "this");
    // Slot 0 is the synthetic most-probable emission; the ranked list
    // follows, starting with the same word.
    assert!(results.len() >= 2);
    assert_eq!(results.word_at(0), "this");
    assert_eq!(results.word_at(1), "this");
    assert!(results.frequency_at(0) >= AUTOCORRECT_SCORE_THRESHOLD);
}

#[test]
fn no_dominant_candidate_without_a_clear_margin() {
    // Two words at the same distance from the input: no dominant slot.
    let lexicon = Arc::new(
        Lexicon::from_entries([WordEntry::new("tap", 150), WordEntry::new("tab", 150)]).unwrap(),
    );
    let decoder = most_probable_decoder();
    let (_, mut session, map) = fresh_session(lexicon);
    // 'v' neighbors 'b' but not 'p'... use a clean tie instead: type "ta"
    // and let both words complete at equal cost.
    let results = decode_typed(&decoder, &mut session, &map, "ta");
    assert!(results.len() >= 2);
    assert_ne!(results.word_at(0), results.word_at(1));
}
