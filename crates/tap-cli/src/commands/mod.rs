pub mod build;
pub mod suggest;

use std::path::Path;

use tap_core::lexicon::Lexicon;

/// Memory-map the lexicon, falling back to an owned load.
pub fn load_lexicon(path: &str) -> Result<Lexicon, String> {
    let path = Path::new(path);
    Lexicon::load_mmap(path)
        .or_else(|_| Lexicon::load(path))
        .map_err(|e| format!("failed to load {}: {e}", path.display()))
}
