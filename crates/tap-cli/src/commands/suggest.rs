//! Run the decoder from the command line.

use std::sync::Arc;

use tap_core::keyboard::ProximityMap;
use tap_core::{Decoder, SuggestResults, TouchInput, TraverseSession};

pub fn run(lexicon_path: &str, typed: &str, prev: Option<&str>, n: usize) -> Result<(), String> {
    let lexicon = Arc::new(super::load_lexicon(lexicon_path)?);

    let prev_pos = match prev {
        Some(word) => {
            let node = lexicon
                .find_word(word)
                .filter(|node| node.is_terminal)
                .ok_or_else(|| format!("previous word {word:?} is not in the lexicon"))?;
            Some(node.pos)
        }
        None => None,
    };

    let code_points: Vec<i32> = typed.chars().map(|c| c as i32).collect();
    if code_points.is_empty() {
        return Err("nothing to decode".to_string());
    }
    let len = code_points.len();
    let xs = vec![-1; len];
    let ys = vec![-1; len];
    let times: Vec<i32> = (0..len as i32).map(|i| i * 100).collect();
    let pointer_ids = vec![0; len];
    let input = TouchInput {
        xs: &xs,
        ys: &ys,
        times: &times,
        pointer_ids: &pointer_ids,
        code_points: &code_points,
    };

    let map = ProximityMap::qwerty();
    let decoder = Decoder::new_typing();
    let mut session = TraverseSession::new(lexicon);
    session.set_prev_word_pos(prev_pos);
    let mut results = SuggestResults::new();
    let count = decoder.decode(&mut session, &map, &input, 0, &mut results);

    if count == 0 {
        println!("no suggestions for {typed:?}");
        return Ok(());
    }
    println!("{:<4} {:<24} {:<12} {}", "#", "word", "kind", "score");
    for i in 0..count.min(n) {
        println!(
            "{:<4} {:<24} {:<12} {}",
            i,
            results.word_at(i),
            format!("{:?}", results.kind_at(i)),
            results.frequency_at(i),
        );
    }
    Ok(())
}
