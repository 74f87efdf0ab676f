//! Breaking paragraphs into lines, the way TeX does.
//!
//! A [`Paragraph`] is a list of [`Node`]s: characters, glue, kerns, penalties, discretionaries
//! and friends. The [`LineBreaker`](engine::LineBreaker) finds the sequence of breakpoints with
//! the fewest total demerits and packs each line to its width.

pub mod active;
pub mod badness;
pub mod engine;
pub mod hyphenation;
pub mod items;
pub mod itemize;
pub mod packing;
pub mod shape;
pub mod trace;
pub mod widths;

use std::collections::HashMap;
use std::slice::Iter;

use crate::layout::paragraphs::items::{CharNode, FontId, Node};

/// Holds a list of nodes describing a paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Sequence of nodes representing the content of the paragraph.
    pub nodes: Vec<Node>,

    /// The hyphen of each font, used when hyphenating words.
    pub hyphen_chars: HashMap<FontId, CharNode>,

    /// Whether the paragraph is interrupted by a display, which changes the widow penalty.
    pub before_display: bool,
}

impl Paragraph {
    /// Instantiates a new paragraph.
    pub fn new() -> Paragraph {
        Paragraph::default()
    }

    /// Instantiates a paragraph from its nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Paragraph {
        Paragraph {
            nodes,
            ..Paragraph::default()
        }
    }

    /// Pushes a node at the end of the paragraph.
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node)
    }

    /// Sets the hyphen of a font.
    pub fn set_hyphen_char(&mut self, hyphen: CharNode) {
        self.hyphen_chars.insert(hyphen.font, hyphen);
    }

    /// Returns an iterator to the nodes of the paragraph.
    pub fn iter(&self) -> Iter<Node> {
        self.nodes.iter()
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the paragraph has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
