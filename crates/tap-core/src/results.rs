//! Decode input/output marshaling types.
//!
//! `TouchInput` borrows the host's parallel input arrays; `SuggestResults`
//! owns the fixed-size output buffers (flat code-point block, frequencies,
//! kinds, space positions) that one decode call fills.

/// Maximum number of suggestions a decode call can return.
pub const MAX_RESULTS: usize = 18;
/// Maximum code points per suggestion, including multi-word separators.
pub const MAX_WORD_LENGTH: usize = 48;
/// Maximum completed words carried by one hypothesis chain.
pub const MAX_PREV_WORDS: usize = 3;

/// Sentinel for "no typed code point" in `TouchInput::code_points`.
pub const NOT_A_CODE_POINT: i32 = -1;
/// Sentinel for missing coordinates in `TouchInput::xs`/`ys`.
pub const NOT_A_COORDINATE: i32 = -1;

/// One decode call's touch points, as parallel slices.
///
/// A point is either typed (`code_points[i] >= 0`, coordinates optional) or
/// positional (`code_points[i] < 0` and real coordinates).
#[derive(Debug, Clone, Copy)]
pub struct TouchInput<'a> {
    pub xs: &'a [i32],
    pub ys: &'a [i32],
    pub times: &'a [i32],
    pub pointer_ids: &'a [i32],
    pub code_points: &'a [i32],
}

impl<'a> TouchInput<'a> {
    pub fn len(&self) -> usize {
        self.code_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty()
    }
}

/// Output classification per suggestion slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SuggestionKind {
    Typed = 0,
    Correction = 1,
    Completion = 2,
    Whitelist = 3,
    Blacklist = 4,
    Shortcut = 7,
}

/// Fixed-capacity output buffers for one decode call.
///
/// Suggestion `k` occupies code points
/// `[k * MAX_WORD_LENGTH, k * MAX_WORD_LENGTH + len)` of the flat block,
/// zero-terminated when shorter than `MAX_WORD_LENGTH`.
pub struct SuggestResults {
    words: Vec<u32>,
    frequencies: Vec<i32>,
    kinds: Vec<SuggestionKind>,
    space_indices: Vec<i32>,
    count: usize,
}

impl Default for SuggestResults {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestResults {
    pub fn new() -> Self {
        Self {
            words: vec![0; MAX_RESULTS * MAX_WORD_LENGTH],
            frequencies: vec![0; MAX_RESULTS],
            kinds: vec![SuggestionKind::Typed; MAX_RESULTS],
            space_indices: vec![-1; MAX_PREV_WORDS],
            count: 0,
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.frequencies.fill(0);
        self.kinds.fill(SuggestionKind::Typed);
        self.space_indices.fill(-1);
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw flat code-point block.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn frequency_at(&self, index: usize) -> i32 {
        self.frequencies[index]
    }

    pub fn kind_at(&self, index: usize) -> SuggestionKind {
        self.kinds[index]
    }

    pub fn space_indices(&self) -> &[i32] {
        &self.space_indices
    }

    /// Code points of suggestion `index`, up to the zero terminator.
    pub fn code_points_at(&self, index: usize) -> &[u32] {
        let slot = &self.words[index * MAX_WORD_LENGTH..(index + 1) * MAX_WORD_LENGTH];
        let len = slot.iter().position(|&c| c == 0).unwrap_or(MAX_WORD_LENGTH);
        &slot[..len]
    }

    pub fn word_at(&self, index: usize) -> String {
        self.code_points_at(index)
            .iter()
            .filter_map(|&c| char::from_u32(c))
            .collect()
    }

    pub(crate) fn set_entry(
        &mut self,
        index: usize,
        code_points: &[u32],
        frequency: i32,
        kind: SuggestionKind,
    ) {
        debug_assert!(index < MAX_RESULTS);
        let len = code_points.len().min(MAX_WORD_LENGTH);
        let slot = &mut self.words[index * MAX_WORD_LENGTH..(index + 1) * MAX_WORD_LENGTH];
        slot.fill(0);
        slot[..len].copy_from_slice(&code_points[..len]);
        self.frequencies[index] = frequency;
        self.kinds[index] = kind;
    }

    pub(crate) fn set_frequency(&mut self, index: usize, frequency: i32) {
        self.frequencies[index] = frequency;
    }

    pub(crate) fn set_space_indices(&mut self, indices: &[i32]) {
        let len = indices.len().min(self.space_indices.len());
        self.space_indices[..len].copy_from_slice(&indices[..len]);
    }

    pub(crate) fn set_len(&mut self, count: usize) {
        self.count = count;
    }
}
