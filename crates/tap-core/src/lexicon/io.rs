//! TPLX binary format.
//!
//! Layout: header, node records, attribute records, bigram records, shortcut
//! records, shortcut code-point pool. All integers native little-endian
//! (enforced by the crate-level endian guard).

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use super::Lexicon;

pub(super) const MAGIC: &[u8; 4] = b"TPLX";
pub(super) const VERSION: u8 = 1;
// magic(4) + version(1) + reserved(3) + root_child_count(4) + node_count(4)
// + attr_count(4) + bigram_count(4) + shortcut_count(4) + pool_len(4) + word_count(4)
pub(super) const HEADER_SIZE: usize = 36;

// code_point(4) + probability(1) + flags(1) + child_count(2) + child_start(4) + attributes_pos(4)
pub(super) const NODE_SIZE: usize = 16;
// bigram_start(4) + bigram_count(2) + shortcut_start(4) + shortcut_count(2)
pub(super) const ATTR_SIZE: usize = 12;
// target(4) + probability(1)
pub(super) const BIGRAM_SIZE: usize = 5;
// pool_start(4) + pool_len(2) + probability(1)
pub(super) const SHORTCUT_SIZE: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected TPLX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("truncated data")]
    TruncatedData,

    #[error("parse error: {0}")]
    Parse(String),
}

pub(super) struct AttrRecord {
    pub bigram_start: u32,
    pub bigram_count: u16,
    pub shortcut_start: u32,
    pub shortcut_count: u16,
}

/// Section storage: built in memory, or borrowed from a memory map.
#[derive(Debug)]
pub(super) enum LexiconStore {
    Owned {
        nodes: Vec<u8>,
        attrs: Vec<u8>,
        bigrams: Vec<u8>,
        shortcuts: Vec<u8>,
        pool: Vec<u8>,
    },
    MmapRef {
        nodes: &'static [u8],
        attrs: &'static [u8],
        bigrams: &'static [u8],
        shortcuts: &'static [u8],
        pool: &'static [u8],
        _mmap: Mmap,
    },
}

impl LexiconStore {
    pub(super) fn nodes(&self) -> &[u8] {
        match self {
            LexiconStore::Owned { nodes, .. } => nodes,
            LexiconStore::MmapRef { nodes, .. } => nodes,
        }
    }

    pub(super) fn attrs(&self) -> &[u8] {
        match self {
            LexiconStore::Owned { attrs, .. } => attrs,
            LexiconStore::MmapRef { attrs, .. } => attrs,
        }
    }

    pub(super) fn bigrams(&self) -> &[u8] {
        match self {
            LexiconStore::Owned { bigrams, .. } => bigrams,
            LexiconStore::MmapRef { bigrams, .. } => bigrams,
        }
    }

    pub(super) fn shortcuts(&self) -> &[u8] {
        match self {
            LexiconStore::Owned { shortcuts, .. } => shortcuts,
            LexiconStore::MmapRef { shortcuts, .. } => shortcuts,
        }
    }

    pub(super) fn pool(&self) -> &[u8] {
        match self {
            LexiconStore::Owned { pool, .. } => pool,
            LexiconStore::MmapRef { pool, .. } => pool,
        }
    }
}

struct Header {
    root_child_count: u32,
    node_len: usize,
    attr_len: usize,
    bigram_len: usize,
    shortcut_len: usize,
    pool_len: usize,
    word_count: u32,
}

fn parse_header(data: &[u8]) -> Result<Header, LexiconError> {
    if data.len() < HEADER_SIZE {
        return Err(LexiconError::InvalidHeader);
    }
    if &data[0..4] != MAGIC {
        return Err(LexiconError::InvalidMagic);
    }
    if data[4] != VERSION {
        return Err(LexiconError::UnsupportedVersion(data[4]));
    }
    let root_child_count = super::read_u32(data, 8);
    let node_len = super::read_u32(data, 12) as usize * NODE_SIZE;
    let attr_len = super::read_u32(data, 16) as usize * ATTR_SIZE;
    let bigram_len = super::read_u32(data, 20) as usize * BIGRAM_SIZE;
    let shortcut_len = super::read_u32(data, 24) as usize * SHORTCUT_SIZE;
    let pool_len = super::read_u32(data, 28) as usize;
    let word_count = super::read_u32(data, 32);
    let total = HEADER_SIZE + node_len + attr_len + bigram_len + shortcut_len + pool_len;
    if data.len() < total {
        return Err(LexiconError::TruncatedData);
    }
    Ok(Header {
        root_child_count,
        node_len,
        attr_len,
        bigram_len,
        shortcut_len,
        pool_len,
        word_count,
    })
}

impl Lexicon {
    pub fn save(&self, path: &Path) -> Result<(), LexiconError> {
        let mut file = File::create(path)?;
        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(MAGIC);
        header.push(VERSION);
        header.extend_from_slice(&[0u8; 3]);
        header.extend_from_slice(&self.root_child_count.to_ne_bytes());
        header.extend_from_slice(&((self.store.nodes().len() / NODE_SIZE) as u32).to_ne_bytes());
        header.extend_from_slice(&((self.store.attrs().len() / ATTR_SIZE) as u32).to_ne_bytes());
        header
            .extend_from_slice(&((self.store.bigrams().len() / BIGRAM_SIZE) as u32).to_ne_bytes());
        header.extend_from_slice(
            &((self.store.shortcuts().len() / SHORTCUT_SIZE) as u32).to_ne_bytes(),
        );
        header.extend_from_slice(&(self.store.pool().len() as u32).to_ne_bytes());
        header.extend_from_slice(&self.word_count.to_ne_bytes());
        file.write_all(&header)?;
        file.write_all(self.store.nodes())?;
        file.write_all(self.store.attrs())?;
        file.write_all(self.store.bigrams())?;
        file.write_all(self.store.shortcuts())?;
        file.write_all(self.store.pool())?;
        Ok(())
    }

    /// Load into owned buffers.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        let h = parse_header(&data)?;
        let mut off = HEADER_SIZE;
        let mut take = |len: usize| {
            let section = data[off..off + len].to_vec();
            off += len;
            section
        };
        let nodes = take(h.node_len);
        let attrs = take(h.attr_len);
        let bigrams = take(h.bigram_len);
        let shortcuts = take(h.shortcut_len);
        let pool = take(h.pool_len);
        Ok(Lexicon::from_parts(
            LexiconStore::Owned {
                nodes,
                attrs,
                bigrams,
                shortcuts,
                pool,
            },
            h.root_child_count,
            h.word_count,
        ))
    }

    /// Load zero-copy from a memory map.
    pub fn load_mmap(path: &Path) -> Result<Self, LexiconError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let h = parse_header(&mmap)?;
        // The slices borrow the map, which lives in the same struct; the
        // 'static lifetimes never escape the store.
        let base: &'static [u8] = unsafe { std::slice::from_raw_parts(mmap.as_ptr(), mmap.len()) };
        let mut off = HEADER_SIZE;
        let mut take = |len: usize| {
            let section = &base[off..off + len];
            off += len;
            section
        };
        let nodes = take(h.node_len);
        let attrs = take(h.attr_len);
        let bigrams = take(h.bigram_len);
        let shortcuts = take(h.shortcut_len);
        let pool = take(h.pool_len);
        Ok(Lexicon::from_parts(
            LexiconStore::MmapRef {
                nodes,
                attrs,
                bigrams,
                shortcuts,
                pool,
                _mmap: mmap,
            },
            h.root_child_count,
            h.word_count,
        ))
    }
}
