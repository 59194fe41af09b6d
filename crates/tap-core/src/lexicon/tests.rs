use super::*;

fn sample() -> Lexicon {
    Lexicon::from_entries([
        WordEntry::new("this", 200),
        WordEntry::new("these", 180),
        WordEntry::new("is", 220).with_shortcut("is not", 120),
        WordEntry::new("he", 150).with_bigram("is", 230),
        WordEntry::new("xx", 10).blacklisted(),
        WordEntry::new("'tis", 90),
    ])
    .unwrap()
}

#[test]
fn build_and_walk() {
    let lex = sample();
    assert_eq!(lex.word_count(), 6);
    let (start, count) = lex.root_child_range();
    assert_eq!(start, 0);
    // Root letters: ', h, i, t, x
    assert_eq!(count, 5);

    let this = lex.find_word("this").unwrap();
    assert!(this.is_terminal);
    assert_eq!(this.probability, 200);
    assert!(!this.has_children());

    // "th" is an interior node: not terminal, has children i and e.
    let th = lex.find_word("th").unwrap();
    assert!(!th.is_terminal);
    assert_eq!(th.child_count, 2);
}

#[test]
fn children_are_contiguous_and_sorted() {
    let lex = sample();
    let th = lex.find_word("th").unwrap();
    let children: Vec<TrieNode> = (th.child_start..th.child_start + th.child_count as u32)
        .map(|pos| lex.node(pos))
        .collect();
    let cps: Vec<u32> = children.iter().map(|n| n.code_point).collect();
    assert_eq!(cps, vec!['e' as u32, 'i' as u32]);
}

#[test]
fn bigram_lookup() {
    let lex = sample();
    let he = lex.find_word("he").unwrap();
    let is = lex.find_word("is").unwrap();
    let this = lex.find_word("this").unwrap();
    assert_eq!(lex.bigram_probability(he.pos, is.pos), Some(230));
    assert_eq!(lex.bigram_probability(he.pos, this.pos), None);
    assert_eq!(lex.bigram_probability(this.pos, is.pos), None);
}

#[test]
fn shortcut_lookup() {
    let lex = sample();
    let is = lex.find_word("is").unwrap();
    let shortcuts = lex.shortcuts(is.pos);
    assert_eq!(shortcuts.len(), 1);
    let target: String = shortcuts[0]
        .code_points
        .iter()
        .map(|&c| char::from_u32(c).unwrap())
        .collect();
    assert_eq!(target, "is not");
    assert_eq!(shortcuts[0].probability, 120);
    assert!(!shortcuts[0].is_whitelist());
}

#[test]
fn flags_round_trip() {
    let lex = sample();
    let xx = lex.find_word("xx").unwrap();
    assert!(xx.is_blacklisted);
    assert!(xx.is_blacklisted_or_not_a_word());
    let this = lex.find_word("this").unwrap();
    assert!(!this.is_blacklisted_or_not_a_word());
}

#[test]
fn missing_words_are_absent() {
    let lex = sample();
    assert!(lex.find_word("hex").is_none());
    // "t" exists as an interior node but is not a word.
    assert!(!lex.find_word("t").unwrap().is_terminal);
}

#[test]
fn unknown_bigram_target_is_an_error() {
    let err = Lexicon::from_entries([WordEntry::new("he", 100).with_bigram("missing", 10)])
        .unwrap_err();
    assert!(matches!(err, LexiconError::Parse(_)));
}

#[test]
fn save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.tplx");
    let lex = sample();
    lex.save(&path).unwrap();

    for loaded in [Lexicon::load(&path).unwrap(), Lexicon::load_mmap(&path).unwrap()] {
        assert_eq!(loaded.word_count(), lex.word_count());
        assert_eq!(loaded.node_count(), lex.node_count());
        let this = loaded.find_word("this").unwrap();
        assert_eq!(this.probability, 200);
        let he = loaded.find_word("he").unwrap();
        let is = loaded.find_word("is").unwrap();
        assert_eq!(loaded.bigram_probability(he.pos, is.pos), Some(230));
        assert_eq!(loaded.shortcuts(is.pos).len(), 1);
    }
}

#[test]
fn load_rejects_bad_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.tplx");
    std::fs::write(&path, b"NOPE\x01\x00\x00\x00 more bytes here to pass the length check....")
        .unwrap();
    assert!(matches!(
        Lexicon::load(&path),
        Err(LexiconError::InvalidMagic)
    ));
}

#[test]
fn load_rejects_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.tplx");
    std::fs::write(&path, b"TPLX").unwrap();
    assert!(matches!(
        Lexicon::load(&path),
        Err(LexiconError::InvalidHeader)
    ));
}
