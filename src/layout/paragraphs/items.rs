//! The items a paragraph is made of, and the items the lines of a broken paragraph become.

use crate::fonts::Font;
use crate::layout::glue::Glue;
use crate::layout::paragraphs::packing::HBox;
use crate::units::Sp;

/// Identifies a font among the fonts used by a paragraph.
pub type FontId = usize;

/// A character typeset in a font.
#[derive(Debug, Clone, PartialEq)]
pub struct CharNode {
    /// The font of the character.
    pub font: FontId,

    /// The character code.
    pub code: u8,

    /// The width of the character in the font.
    pub width: Sp,

    /// The height of the character in the font.
    pub height: Sp,

    /// The depth of the character in the font.
    pub depth: Sp,
}

impl CharNode {
    /// Creates a character with the metrics of a font.
    pub fn new(font: &Font, id: FontId, code: u8) -> CharNode {
        let glyph = font.glyph(code);
        CharNode {
            font: id,
            code,
            width: glyph.width,
            height: glyph.height,
            depth: glyph.depth,
        }
    }
}

/// A ligature: one glyph standing for several characters.
#[derive(Debug, Clone, PartialEq)]
pub struct LigatureNode {
    /// The ligature glyph.
    pub glyph: CharNode,

    /// The characters the ligature was made of.
    pub original: Vec<u8>,
}

/// Where a kern comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KernKind {
    /// Inserted by the lig/kern program of a font. Never a breakpoint.
    Font,

    /// Asked for explicitly. A breakpoint when followed by glue.
    Explicit,
}

/// A fixed amount of space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KernNode {
    /// The width of the kern, possibly negative.
    pub width: Sp,

    /// The origin of the kern.
    pub kind: KernKind,
}

/// A place where a word can be broken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscretionaryNode {
    /// Material ending the line if the break is taken, usually a hyphen.
    pub pre_break: Vec<Node>,

    /// Material starting the next line if the break is taken.
    pub post_break: Vec<Node>,

    /// How many of the following items are dropped if the break is taken.
    pub replace_count: usize,
}

impl DiscretionaryNode {
    /// A discretionary that adds a hyphen when taken.
    pub fn hyphen(hyphen: CharNode) -> DiscretionaryNode {
        DiscretionaryNode {
            pre_break: vec![Node::Char(hyphen)],
            ..DiscretionaryNode::default()
        }
    }
}

/// Whether a math node opens or closes a formula.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathKind {
    /// Opens a formula.
    Before,

    /// Closes a formula.
    After,
}

/// The boundary of an inline formula.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MathNode {
    /// Opening or closing.
    pub kind: MathKind,

    /// The surrounding space.
    pub width: Sp,
}

/// A black rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RuleNode {
    /// The width.
    pub width: Sp,

    /// The height.
    pub height: Sp,

    /// The depth.
    pub depth: Sp,
}

/// Material inserted elsewhere on the page, like a footnote.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertNode {
    /// The box register the material goes to.
    pub number: u8,

    /// The natural height of the material.
    pub height: Sp,

    /// The material.
    pub content: Vec<Node>,
}

/// An item of a horizontal list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A character.
    Char(CharNode),

    /// A ligature.
    Ligature(LigatureNode),

    /// A packed horizontal box.
    HBox(HBox),

    /// A rule.
    Rule(RuleNode),

    /// Space that can stretch and shrink.
    Glue(Glue),

    /// Fixed space.
    Kern(KernNode),

    /// The cost of breaking here.
    Penalty(i32),

    /// A possible break inside a word.
    Discretionary(DiscretionaryNode),

    /// The boundary of a formula.
    Math(MathNode),

    /// A mark, moved out of the line after breaking.
    Mark(String),

    /// An insertion, moved out of the line after breaking.
    Insert(InsertNode),

    /// Vertical material placed after the line after breaking.
    Adjust(Vec<Node>),

    /// Anything the paragraph builder ignores.
    Whatsit(String),
}

impl Node {
    /// An explicit kern.
    pub fn kern(width: Sp) -> Node {
        Node::Kern(KernNode {
            width,
            kind: KernKind::Explicit,
        })
    }

    /// A kern coming from a font.
    pub fn font_kern(width: Sp) -> Node {
        Node::Kern(KernNode {
            width,
            kind: KernKind::Font,
        })
    }

    /// An empty box of the given width, like a paragraph indent.
    pub fn empty_box(width: Sp) -> Node {
        Node::HBox(HBox::empty(width))
    }

    /// The width the item takes in a line.
    pub fn width(&self) -> Sp {
        match self {
            Node::Char(c) => c.width,
            Node::Ligature(l) => l.glyph.width,
            Node::HBox(b) => b.width,
            Node::Rule(r) => r.width,
            Node::Glue(g) => g.width,
            Node::Kern(k) => k.width,
            Node::Math(m) => m.width,
            _ => Sp(0),
        }
    }

    /// The height the item adds above the baseline.
    pub fn height(&self) -> Sp {
        match self {
            Node::Char(c) => c.height,
            Node::Ligature(l) => l.glyph.height,
            Node::HBox(b) => b.height - b.shift,
            Node::Rule(r) => r.height,
            _ => Sp(0),
        }
    }

    /// The depth the item adds below the baseline.
    pub fn depth(&self) -> Sp {
        match self {
            Node::Char(c) => c.depth,
            Node::Ligature(l) => l.glyph.depth,
            Node::HBox(b) => b.depth + b.shift,
            Node::Rule(r) => r.depth,
            _ => Sp(0),
        }
    }

    /// Whether the item is a character.
    pub fn is_char(&self) -> bool {
        matches!(self, Node::Char(_))
    }

    /// Whether glue following the item is a legal breakpoint.
    pub fn precedes_break(&self) -> bool {
        matches!(
            self,
            Node::HBox(_)
                | Node::Rule(_)
                | Node::Insert(_)
                | Node::Mark(_)
                | Node::Adjust(_)
                | Node::Ligature(_)
                | Node::Discretionary(_)
                | Node::Whatsit(_)
        )
    }

    /// Whether the item disappears at the beginning of a line.
    pub fn is_discardable(&self) -> bool {
        match self {
            Node::Glue(_) | Node::Penalty(_) | Node::Math(_) => true,
            Node::Kern(k) => k.kind == KernKind::Explicit,
            _ => false,
        }
    }
}

/// An item of the vertical list a broken paragraph becomes.
#[derive(Debug, Clone, PartialEq)]
pub enum VerticalItem {
    /// A line of the paragraph.
    Line(HBox),

    /// The penalty for breaking a page between two lines.
    Penalty(i32),

    /// A mark, insertion or adjusted material moved out of the previous line.
    Migrated(Node),
}
