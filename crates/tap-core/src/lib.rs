#[cfg(not(target_endian = "little"))]
compile_error!("tap-core requires a little-endian platform");

pub mod keyboard;
pub mod lexicon;
pub mod node;
pub mod results;
pub mod search;
pub mod session;
pub mod settings;

pub use results::{SuggestResults, SuggestionKind, TouchInput, MAX_RESULTS, MAX_WORD_LENGTH};
pub use search::Decoder;
pub use session::TraverseSession;
