use std::sync::Arc;

use crate::keyboard::ProximityMap;
use crate::lexicon::{Lexicon, WordEntry};
use crate::results::{SuggestResults, TouchInput};
use crate::search::Decoder;
use crate::session::TraverseSession;

/// Shared fixture lexicon for decoder tests.
pub fn test_lexicon() -> Arc<Lexicon> {
    Arc::new(
        Lexicon::from_entries([
            WordEntry::new("this", 200),
            WordEntry::new("these", 180),
            WordEntry::new("is", 220),
            WordEntry::new("he", 150).with_bigram("is", 230),
            WordEntry::new("hello", 190).with_bigram("world", 220),
            WordEntry::new("world", 180),
        ])
        .unwrap(),
    )
}

/// Owned parallel buffers for a typed (non-positional) input.
pub struct TypedBuffers {
    xs: Vec<i32>,
    ys: Vec<i32>,
    times: Vec<i32>,
    pointer_ids: Vec<i32>,
    code_points: Vec<i32>,
}

impl TypedBuffers {
    pub fn new(word: &str) -> Self {
        let code_points: Vec<i32> = word.chars().map(|c| c as i32).collect();
        let n = code_points.len();
        Self {
            xs: vec![-1; n],
            ys: vec![-1; n],
            times: (0..n as i32).map(|i| i * 100).collect(),
            pointer_ids: vec![0; n],
            code_points,
        }
    }

    pub fn with_times(word: &str, times: &[i32]) -> Self {
        let mut buffers = Self::new(word);
        assert_eq!(times.len(), buffers.times.len());
        buffers.times = times.to_vec();
        buffers
    }

    pub fn input(&self) -> TouchInput<'_> {
        TouchInput {
            xs: &self.xs,
            ys: &self.ys,
            times: &self.times,
            pointer_ids: &self.pointer_ids,
            code_points: &self.code_points,
        }
    }
}

pub fn fresh_session(lexicon: Arc<Lexicon>) -> (Decoder, TraverseSession, ProximityMap) {
    (
        Decoder::new_typing(),
        TraverseSession::new(lexicon),
        ProximityMap::qwerty(),
    )
}

/// Decode a typed word with commit point 0.
pub fn decode_typed(
    decoder: &Decoder,
    session: &mut TraverseSession,
    map: &ProximityMap,
    word: &str,
) -> SuggestResults {
    decode_typed_with_commit(decoder, session, map, word, 0)
}

pub fn decode_typed_with_commit(
    decoder: &Decoder,
    session: &mut TraverseSession,
    map: &ProximityMap,
    word: &str,
    commit_point: i32,
) -> SuggestResults {
    let buffers = TypedBuffers::new(word);
    let mut results = SuggestResults::new();
    decoder.decode(session, map, &buffers.input(), commit_point, &mut results);
    results
}

/// All suggestion words, in output order.
pub fn words(results: &SuggestResults) -> Vec<String> {
    (0..results.len()).map(|i| results.word_at(i)).collect()
}
