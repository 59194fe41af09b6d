//! In-memory lexicon construction.
//!
//! A nested builder trie is flattened breadth-first so every node's children
//! land in one contiguous block, then bigram and shortcut targets are
//! resolved to node positions in a second pass.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::io::{self, LexiconStore};
use super::{Lexicon, LexiconError, NO_ATTRIBUTES};

/// One word with its attributes, as fed to the builder.
#[derive(Debug, Clone)]
pub struct WordEntry {
    pub word: String,
    pub probability: u8,
    pub not_a_word: bool,
    pub blacklisted: bool,
    /// Following words with their bigram probabilities.
    pub bigrams: Vec<(String, u8)>,
    /// Expansion targets with their probabilities.
    pub shortcuts: Vec<(String, u8)>,
}

impl WordEntry {
    pub fn new(word: &str, probability: u8) -> Self {
        Self {
            word: word.to_string(),
            probability,
            not_a_word: false,
            blacklisted: false,
            bigrams: Vec::new(),
            shortcuts: Vec::new(),
        }
    }

    pub fn with_bigram(mut self, next: &str, probability: u8) -> Self {
        self.bigrams.push((next.to_string(), probability));
        self
    }

    pub fn with_shortcut(mut self, target: &str, probability: u8) -> Self {
        self.shortcuts.push((target.to_string(), probability));
        self
    }

    pub fn not_a_word(mut self) -> Self {
        self.not_a_word = true;
        self
    }

    pub fn blacklisted(mut self) -> Self {
        self.blacklisted = true;
        self
    }
}

#[derive(Default)]
struct BuilderNode {
    children: BTreeMap<u32, BuilderNode>,
    terminal: Option<TerminalMeta>,
}

#[derive(Clone)]
struct TerminalMeta {
    word: String,
    probability: u8,
    flags: u8,
    bigrams: Vec<(String, u8)>,
    shortcuts: Vec<(String, u8)>,
}

#[derive(Default)]
pub struct LexiconBuilder {
    root: BuilderNode,
    word_count: u32,
}

impl LexiconBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: WordEntry) -> &mut Self {
        if entry.word.is_empty() {
            return self;
        }
        let mut node = &mut self.root;
        for c in entry.word.chars() {
            node = node.children.entry(c as u32).or_default();
        }
        if node.terminal.is_none() {
            self.word_count += 1;
        }
        let mut flags = super::FLAG_TERMINAL;
        if entry.blacklisted {
            flags |= super::FLAG_BLACKLISTED;
        }
        if entry.not_a_word {
            flags |= super::FLAG_NOT_A_WORD;
        }
        node.terminal = Some(TerminalMeta {
            word: entry.word,
            probability: entry.probability,
            flags,
            bigrams: entry.bigrams,
            shortcuts: entry.shortcuts,
        });
        self
    }

    /// Flatten the trie and resolve attribute targets.
    pub fn build(self) -> Result<Lexicon, LexiconError> {
        struct Flat {
            code_point: u32,
            meta: Option<TerminalMeta>,
            child_start: u32,
            child_count: u16,
        }

        let mut flat: Vec<Flat> = Vec::new();
        let mut pending: VecDeque<(usize, BuilderNode)> = VecDeque::new();

        for (cp, child) in self.root.children {
            let idx = flat.len();
            flat.push(Flat {
                code_point: cp,
                meta: child.terminal.clone(),
                child_start: 0,
                child_count: 0,
            });
            pending.push_back((idx, child));
        }
        let root_child_count = flat.len() as u32;

        while let Some((idx, node)) = pending.pop_front() {
            flat[idx].child_start = flat.len() as u32;
            flat[idx].child_count = node.children.len() as u16;
            for (cp, child) in node.children {
                let child_idx = flat.len();
                flat.push(Flat {
                    code_point: cp,
                    meta: child.terminal.clone(),
                    child_start: 0,
                    child_count: 0,
                });
                pending.push_back((child_idx, child));
            }
        }

        let word_pos: HashMap<String, u32> = flat
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.meta.as_ref().map(|m| (m.word.clone(), i as u32)))
            .collect();

        let mut nodes = Vec::with_capacity(flat.len() * io::NODE_SIZE);
        let mut attrs = Vec::new();
        let mut bigrams = Vec::new();
        let mut shortcuts = Vec::new();
        let mut pool: Vec<u8> = Vec::new();

        for f in &flat {
            let (probability, flags) = match &f.meta {
                Some(m) => (m.probability, m.flags),
                None => (0, 0),
            };
            let attributes_pos = match &f.meta {
                Some(m) if !m.bigrams.is_empty() || !m.shortcuts.is_empty() => {
                    let bigram_start = (bigrams.len() / io::BIGRAM_SIZE) as u32;
                    for (target, prob) in &m.bigrams {
                        let target_pos =
                            *word_pos.get(target).ok_or_else(|| LexiconError::Parse(
                                format!("bigram target {target:?} is not in the lexicon"),
                            ))?;
                        bigrams.extend_from_slice(&target_pos.to_ne_bytes());
                        bigrams.push(*prob);
                    }
                    let shortcut_start = (shortcuts.len() / io::SHORTCUT_SIZE) as u32;
                    for (target, prob) in &m.shortcuts {
                        let pool_start = (pool.len() / 4) as u32;
                        let target_cps: Vec<u32> = target.chars().map(|c| c as u32).collect();
                        for cp in &target_cps {
                            pool.extend_from_slice(&cp.to_ne_bytes());
                        }
                        shortcuts.extend_from_slice(&pool_start.to_ne_bytes());
                        shortcuts.extend_from_slice(&(target_cps.len() as u16).to_ne_bytes());
                        shortcuts.push(*prob);
                    }
                    let attr_pos = (attrs.len() / io::ATTR_SIZE) as u32;
                    attrs.extend_from_slice(&bigram_start.to_ne_bytes());
                    attrs.extend_from_slice(&(m.bigrams.len() as u16).to_ne_bytes());
                    attrs.extend_from_slice(&shortcut_start.to_ne_bytes());
                    attrs.extend_from_slice(&(m.shortcuts.len() as u16).to_ne_bytes());
                    attr_pos
                }
                _ => NO_ATTRIBUTES,
            };

            nodes.extend_from_slice(&f.code_point.to_ne_bytes());
            nodes.push(probability);
            nodes.push(flags);
            nodes.extend_from_slice(&f.child_count.to_ne_bytes());
            nodes.extend_from_slice(&f.child_start.to_ne_bytes());
            nodes.extend_from_slice(&attributes_pos.to_ne_bytes());
        }

        let store = LexiconStore::Owned {
            nodes,
            attrs,
            bigrams,
            shortcuts,
            pool,
        };
        Ok(Lexicon::from_parts(store, root_child_count, self.word_count))
    }
}

impl Lexicon {
    /// Build a lexicon from word entries in one call.
    pub fn from_entries(entries: impl IntoIterator<Item = WordEntry>) -> Result<Self, LexiconError> {
        let mut builder = LexiconBuilder::new();
        for entry in entries {
            builder.add(entry);
        }
        builder.build()
    }
}
