//! Compact trie lexicon.
//!
//! Words live in a flat node array where a node's children occupy one
//! contiguous position range, so the whole structure is addressed by offsets
//! and can be read in place from a memory map. Terminals carry a unigram
//! probability and an attributes slot pointing at bigram and shortcut lists.

mod builder;
mod io;

#[cfg(test)]
mod tests;

pub use builder::{LexiconBuilder, WordEntry};
pub use io::LexiconError;

use io::LexiconStore;

/// Index of a node in the flat array.
pub type NodePos = u32;

/// Attributes slot marker for terminals with no bigrams or shortcuts.
pub const NO_ATTRIBUTES: u32 = u32::MAX;

/// Shortcut targets at this probability are whitelist entries.
pub const WHITELIST_PROBABILITY: u8 = u8::MAX;

pub(crate) const FLAG_TERMINAL: u8 = 1 << 0;
pub(crate) const FLAG_BLACKLISTED: u8 = 1 << 1;
pub(crate) const FLAG_NOT_A_WORD: u8 = 1 << 2;

/// One decoded trie node.
#[derive(Debug, Clone, Copy)]
pub struct TrieNode {
    pub pos: NodePos,
    pub code_point: u32,
    pub probability: u8,
    pub is_terminal: bool,
    pub is_blacklisted: bool,
    pub is_not_a_word: bool,
    pub child_start: u32,
    pub child_count: u16,
    pub attributes_pos: u32,
}

impl TrieNode {
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }

    pub fn is_blacklisted_or_not_a_word(&self) -> bool {
        self.is_blacklisted || self.is_not_a_word
    }
}

/// A shortcut target attached to a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEntry {
    pub code_points: Vec<u32>,
    pub probability: u8,
}

impl ShortcutEntry {
    pub fn is_whitelist(&self) -> bool {
        self.probability == WHITELIST_PROBABILITY
    }
}

#[derive(Debug)]
pub struct Lexicon {
    store: LexiconStore,
    root_child_count: u32,
    word_count: u32,
}

impl Lexicon {
    pub(crate) fn from_parts(store: LexiconStore, root_child_count: u32, word_count: u32) -> Self {
        Self {
            store,
            root_child_count,
            word_count,
        }
    }

    /// Position range of the root's children.
    pub fn root_child_range(&self) -> (u32, u16) {
        (0, self.root_child_count as u16)
    }

    pub fn node_count(&self) -> usize {
        self.store.nodes().len() / io::NODE_SIZE
    }

    pub fn word_count(&self) -> usize {
        self.word_count as usize
    }

    pub fn bigram_count(&self) -> usize {
        self.store.bigrams().len() / io::BIGRAM_SIZE
    }

    pub fn shortcut_count(&self) -> usize {
        self.store.shortcuts().len() / io::SHORTCUT_SIZE
    }

    /// Decode the node record at `pos`.
    pub fn node(&self, pos: NodePos) -> TrieNode {
        let data = self.store.nodes();
        let off = pos as usize * io::NODE_SIZE;
        debug_assert!(off + io::NODE_SIZE <= data.len(), "node pos out of range");
        let code_point = read_u32(data, off);
        let probability = data[off + 4];
        let flags = data[off + 5];
        let child_count = read_u16(data, off + 6);
        let child_start = read_u32(data, off + 8);
        let attributes_pos = read_u32(data, off + 12);
        TrieNode {
            pos,
            code_point,
            probability,
            is_terminal: flags & FLAG_TERMINAL != 0,
            is_blacklisted: flags & FLAG_BLACKLISTED != 0,
            is_not_a_word: flags & FLAG_NOT_A_WORD != 0,
            child_start,
            child_count,
            attributes_pos,
        }
    }

    /// Bigram probability for `target` following the word ending at `prev`.
    pub fn bigram_probability(&self, prev: NodePos, target: NodePos) -> Option<u8> {
        let attrs = self.attributes(prev)?;
        let data = self.store.bigrams();
        for i in 0..attrs.bigram_count as usize {
            let off = (attrs.bigram_start as usize + i) * io::BIGRAM_SIZE;
            if read_u32(data, off) == target {
                return Some(data[off + 4]);
            }
        }
        None
    }

    /// Shortcut targets for the terminal at `pos`.
    pub fn shortcuts(&self, pos: NodePos) -> Vec<ShortcutEntry> {
        let Some(attrs) = self.attributes(pos) else {
            return Vec::new();
        };
        let data = self.store.shortcuts();
        let pool = self.store.pool();
        let mut out = Vec::with_capacity(attrs.shortcut_count as usize);
        for i in 0..attrs.shortcut_count as usize {
            let off = (attrs.shortcut_start as usize + i) * io::SHORTCUT_SIZE;
            let pool_start = read_u32(data, off) as usize;
            let pool_len = read_u16(data, off + 4) as usize;
            let probability = data[off + 6];
            let code_points = (0..pool_len)
                .map(|j| read_u32(pool, (pool_start + j) * 4))
                .collect();
            out.push(ShortcutEntry {
                code_points,
                probability,
            });
        }
        out
    }

    fn attributes(&self, pos: NodePos) -> Option<io::AttrRecord> {
        let node = self.node(pos);
        if node.attributes_pos == NO_ATTRIBUTES {
            return None;
        }
        let data = self.store.attrs();
        let off = node.attributes_pos as usize * io::ATTR_SIZE;
        Some(io::AttrRecord {
            bigram_start: read_u32(data, off),
            bigram_count: read_u16(data, off + 4),
            shortcut_start: read_u32(data, off + 6),
            shortcut_count: read_u16(data, off + 10),
        })
    }

    /// Walk the trie along `word`, returning the final node if present.
    pub fn find_word(&self, word: &str) -> Option<TrieNode> {
        let (mut start, mut count) = self.root_child_range();
        let mut current = None;
        for c in word.chars() {
            let cp = c as u32;
            let mut found = None;
            for pos in start..start + count as u32 {
                let node = self.node(pos);
                if node.code_point == cp {
                    found = Some(node);
                    break;
                }
            }
            let node = found?;
            start = node.child_start;
            count = node.child_count;
            current = Some(node);
        }
        current
    }
}

pub(crate) fn read_u32(data: &[u8], off: usize) -> u32 {
    u32::from_ne_bytes(data[off..off + 4].try_into().unwrap())
}

pub(crate) fn read_u16(data: &[u8], off: usize) -> u16 {
    u16::from_ne_bytes(data[off..off + 2].try_into().unwrap())
}
