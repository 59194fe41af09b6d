//! Wordlist compilation and lexicon inspection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tap_core::lexicon::{LexiconBuilder, WordEntry};

/// Parse one wordlist line: `word<TAB>probability[<TAB>attr...]`.
///
/// Attributes: `bigram:next=prob`, `shortcut:target=prob`,
/// `flag:not_a_word`, `flag:blacklisted`.
fn parse_line(line: &str, line_number: usize) -> Result<Option<WordEntry>, String> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut fields = line.split('\t');
    let word = fields
        .next()
        .filter(|w| !w.is_empty())
        .ok_or_else(|| format!("line {line_number}: missing word"))?;
    let probability: u8 = fields
        .next()
        .ok_or_else(|| format!("line {line_number}: missing probability"))?
        .parse()
        .map_err(|_| format!("line {line_number}: probability must be 0-255"))?;

    let mut entry = WordEntry::new(word, probability);
    for attr in fields {
        if let Some(rest) = attr.strip_prefix("bigram:") {
            let (next, prob) = parse_target(rest, line_number)?;
            entry = entry.with_bigram(&next, prob);
        } else if let Some(rest) = attr.strip_prefix("shortcut:") {
            let (target, prob) = parse_target(rest, line_number)?;
            entry = entry.with_shortcut(&target, prob);
        } else if attr == "flag:not_a_word" {
            entry = entry.not_a_word();
        } else if attr == "flag:blacklisted" {
            entry = entry.blacklisted();
        } else {
            return Err(format!("line {line_number}: unknown attribute {attr:?}"));
        }
    }
    Ok(Some(entry))
}

fn parse_target(rest: &str, line_number: usize) -> Result<(String, u8), String> {
    let (target, prob) = rest
        .rsplit_once('=')
        .ok_or_else(|| format!("line {line_number}: expected target=prob"))?;
    let prob = prob
        .parse()
        .map_err(|_| format!("line {line_number}: probability must be 0-255"))?;
    Ok((target.to_string(), prob))
}

pub fn run(wordlist: &str, output: &str) -> Result<(), String> {
    let file = File::open(wordlist).map_err(|e| format!("failed to open {wordlist}: {e}"))?;
    let mut builder = LexiconBuilder::new();
    let mut count = 0usize;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| format!("read error in {wordlist}: {e}"))?;
        if let Some(entry) = parse_line(&line, i + 1)? {
            builder.add(entry);
            count += 1;
        }
    }
    let lexicon = builder.build().map_err(|e| e.to_string())?;
    lexicon
        .save(Path::new(output))
        .map_err(|e| format!("failed to write {output}: {e}"))?;
    println!(
        "compiled {count} entries -> {output} ({} nodes, {} words, {} bigrams, {} shortcuts)",
        lexicon.node_count(),
        lexicon.word_count(),
        lexicon.bigram_count(),
        lexicon.shortcut_count(),
    );
    Ok(())
}

pub fn info(path: &str) -> Result<(), String> {
    let lexicon = super::load_lexicon(path)?;
    println!("nodes:     {}", lexicon.node_count());
    println!("words:     {}", lexicon.word_count());
    println!("bigrams:   {}", lexicon.bigram_count());
    println!("shortcuts: {}", lexicon.shortcut_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_entries() {
        let entry = parse_line("hello\t190", 1).unwrap().unwrap();
        assert_eq!(entry.word, "hello");
        assert_eq!(entry.probability, 190);
        assert!(entry.bigrams.is_empty());
    }

    #[test]
    fn parses_attributes() {
        let entry = parse_line("he\t150\tbigram:is=230\tshortcut:he is=90", 1)
            .unwrap()
            .unwrap();
        assert_eq!(entry.bigrams, vec![("is".to_string(), 230)]);
        assert_eq!(entry.shortcuts, vec![("he is".to_string(), 90)]);
    }

    #[test]
    fn skips_comments_and_blanks() {
        assert!(parse_line("# header", 1).unwrap().is_none());
        assert!(parse_line("", 2).unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("word", 1).is_err());
        assert!(parse_line("word\tmany", 1).is_err());
        assert!(parse_line("word\t10\tnope:x", 1).is_err());
    }
}
