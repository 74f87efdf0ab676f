//! Finding the hyphenation points of the words of a paragraph.
//!
//! On its second pass, the line breaker gives the word that follows each breakable glue to a
//! [`Hyphenator`], which inserts discretionaries where the word can be hyphenated.

use std::collections::HashMap;

use spandex_hyphenation::{Hyphenator as _, Language, Load, Standard};

use crate::config::TypesettingOptions;
use crate::layout::paragraphs::items::{CharNode, DiscretionaryNode, FontId, KernKind, Node};
use crate::Result;

/// Words longer than this are never hyphenated.
const MAX_WORD_LENGTH: usize = 63;

/// A word found in a list of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The font of the word.
    pub font: FontId,

    /// The letters of the word, in lowercase.
    pub letters: String,

    /// For each letter, the index of the node it comes from.
    pub nodes: Vec<usize>,
}

fn is_letter(code: u8) -> bool {
    code.is_ascii_alphabetic()
}

/// Finds the word starting after `start`, skipping what comes before its first letter.
///
/// Returns `None` when the material around the word prevents hyphenation, like a box, a rule,
/// a formula or an existing discretionary.
pub fn find_word(nodes: &[Node], start: usize) -> Option<Word> {
    let mut index = start;

    // Look for the first letter.
    let font = loop {
        match nodes.get(index)? {
            Node::Char(c) if is_letter(c.code) => break c.font,
            Node::Ligature(l) if l.original.first().copied().map_or(false, is_letter) => {
                break l.glyph.font
            }
            Node::Char(_) | Node::Ligature(_) | Node::Whatsit(_) => (),
            Node::Kern(k) if k.kind == KernKind::Font => (),
            _ => return None,
        }
        index += 1;
    };

    let mut word = Word {
        font,
        letters: String::new(),
        nodes: vec![],
    };

    // Gather the letters.
    while let Some(node) = nodes.get(index) {
        let codes: &[u8] = match node {
            Node::Char(c) if c.font == font => std::slice::from_ref(&c.code),
            Node::Ligature(l) if l.glyph.font == font => &l.original,
            Node::Kern(k) if k.kind == KernKind::Font => {
                index += 1;
                continue;
            }
            _ => break,
        };

        if !codes.iter().all(|&c| is_letter(c)) || word.nodes.len() + codes.len() > MAX_WORD_LENGTH
        {
            break;
        }

        for &code in codes {
            word.letters.push(code.to_ascii_lowercase() as char);
            word.nodes.push(index);
        }
        index += 1;
    }

    // Check what follows.
    while let Some(node) = nodes.get(index) {
        match node {
            Node::Char(_) | Node::Ligature(_) => (),
            Node::Kern(k) if k.kind == KernKind::Font => (),
            Node::Kern(_)
            | Node::Glue(_)
            | Node::Penalty(_)
            | Node::Insert(_)
            | Node::Adjust(_)
            | Node::Mark(_)
            | Node::Whatsit(_) => break,
            _ => return None,
        }
        index += 1;
    }

    Some(word)
}

/// Finds where words can be hyphenated.
pub trait Hyphenator {
    /// The positions where a word, in lowercase, may be hyphenated: a position `j` allows a
    /// hyphen between the letters `j - 1` and `j`.
    fn word_breaks(&mut self, word: &str) -> Result<Vec<usize>>;

    /// Hyphenates the word following the node at `start`, inserting a discretionary at each
    /// hyphenation point.
    ///
    /// Words too short for `left_hyphen_min` and `right_hyphen_min`, and words in a font
    /// without hyphen, are left alone. Breaks inside a ligature are ignored.
    fn hyphenate(
        &mut self,
        nodes: &mut Vec<Node>,
        start: usize,
        hyphen_chars: &HashMap<FontId, CharNode>,
        options: &TypesettingOptions,
    ) -> Result<()> {
        let word = match find_word(nodes.as_slice(), start) {
            Some(word) => word,
            None => return Ok(()),
        };

        let (left, right) = (options.left_hyphen_min.max(1), options.right_hyphen_min.max(1));
        let length = word.nodes.len();
        if length < left + right {
            return Ok(());
        }

        let hyphen = match hyphen_chars.get(&word.font) {
            Some(hyphen) => hyphen,
            None => return Ok(()),
        };

        let mut breaks = self.word_breaks(&word.letters)?;
        breaks.retain(|&j| j >= left && j <= length - right && word.nodes[j - 1] != word.nodes[j]);
        breaks.sort_unstable();
        breaks.dedup();

        for &j in breaks.iter().rev() {
            let position = word.nodes[j - 1] + 1;
            let replace_count = match nodes.get(position) {
                Some(Node::Kern(k)) if k.kind == KernKind::Font => 1,
                _ => 0,
            };
            let disc = DiscretionaryNode {
                replace_count,
                ..DiscretionaryNode::hyphen(hyphen.clone())
            };
            nodes.insert(position, Node::Discretionary(disc));
        }

        Ok(())
    }
}

/// A hyphenator using Liang's patterns.
#[derive(Debug)]
pub struct DictionaryHyphenator {
    dictionary: Standard,
}

impl DictionaryHyphenator {
    /// Creates a hyphenator from a dictionary.
    pub fn new(dictionary: Standard) -> DictionaryHyphenator {
        DictionaryHyphenator { dictionary }
    }

    /// Creates a hyphenator with the embedded US English patterns.
    pub fn english() -> Result<DictionaryHyphenator> {
        Ok(DictionaryHyphenator::new(Standard::from_embedded(
            Language::EnglishUS,
        )?))
    }
}

impl Hyphenator for DictionaryHyphenator {
    fn word_breaks(&mut self, word: &str) -> Result<Vec<usize>> {
        Ok(self.dictionary.hyphenate(word).breaks)
    }
}
