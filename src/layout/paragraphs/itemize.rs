//! Turning text into the nodes of a paragraph.
//!
//! Each word goes through the lig/kern program of its font, the way TeX's main loop builds
//! words: ligatures are formed, font kerns are inserted, and the boundary character of the
//! font is taken into account at both ends of the word.

use std::collections::VecDeque;

use crate::fonts::{Font, LigKernStep};
use crate::layout::paragraphs::items::{CharNode, DiscretionaryNode, FontId, LigatureNode, Node};
use crate::layout::paragraphs::Paragraph;
use crate::units::Sp;

/// A character or a ligature waiting to be appended. `None` stands for a word boundary.
#[derive(Debug, Clone)]
struct Piece {
    code: u8,
    original: Vec<u8>,
    ligature: bool,
}

impl Piece {
    fn char(code: u8) -> Piece {
        Piece {
            code,
            original: vec![code],
            ligature: false,
        }
    }
}

struct Builder<'f> {
    font: &'f Font,
    id: FontId,
    hyphen: Option<u8>,
    nodes: Vec<Node>,
}

impl<'f> Builder<'f> {
    fn code(&self, c: char) -> Option<u8> {
        if c.is_ascii() && self.font.exists(c as u8) {
            Some(c as u8)
        } else {
            warn!(
                "Missing character: There is no {} in font {}!",
                c,
                self.font.key().name
            );
            None
        }
    }

    fn append(&mut self, piece: Option<Piece>) {
        let piece = match piece {
            Some(piece) => piece,
            None => return,
        };

        let glyph = CharNode::new(self.font, self.id, piece.code);
        if piece.ligature && !piece.original.is_empty() {
            self.nodes.push(Node::Ligature(LigatureNode {
                glyph,
                original: piece.original,
            }));
        } else {
            self.nodes.push(Node::Char(glyph));
        }

        // An explicit hyphen allows a break after it.
        if Some(piece.code) == self.hyphen {
            self.nodes
                .push(Node::Discretionary(DiscretionaryNode::default()));
        }
    }

    fn word(&mut self, codes: &[u8]) {
        if codes.is_empty() {
            return;
        }

        let mut input: VecDeque<Option<Piece>> =
            codes.iter().map(|&code| Some(Piece::char(code))).collect();
        input.push_back(None);

        // Malformed fonts can loop forever.
        let max_steps = 8 * (codes.len() + 2);
        let mut steps = 0;
        let mut left: Option<Piece> = None;

        while let Some(right) = input.pop_front() {
            steps += 1;
            let step = if steps > max_steps {
                if steps == max_steps + 1 {
                    warn!("Ligature loop in font {}", self.font.key().name);
                }
                None
            } else {
                self.font.lookup(
                    left.as_ref().map(|p| p.code),
                    right.as_ref().map(|p| p.code),
                )
            };

            match step {
                None => {
                    self.append(left.take());
                    left = right;
                }
                Some(LigKernStep::Kern { amount, .. }) => {
                    self.append(left.take());
                    self.nodes.push(Node::font_kern(amount));
                    left = right;
                }
                Some(LigKernStep::Ligature { lig_char, op, .. }) => {
                    let mut original = vec![];
                    if let (false, Some(l)) = (op.keep_left, &left) {
                        original.extend_from_slice(&l.original);
                    }
                    if let (false, Some(r)) = (op.keep_right, &right) {
                        original.extend_from_slice(&r.original);
                    }

                    let mut pieces = VecDeque::with_capacity(3);
                    if op.keep_left {
                        pieces.push_back(left.take());
                    }
                    pieces.push_back(Some(Piece {
                        code: lig_char,
                        original,
                        ligature: true,
                    }));
                    if op.keep_right {
                        pieces.push_back(right);
                    }

                    for _ in 0..op.step_over {
                        if let Some(piece) = pieces.pop_front() {
                            self.append(piece);
                        }
                    }
                    left = pieces.pop_front().unwrap_or(None);
                    while let Some(piece) = pieces.pop_back() {
                        input.push_front(piece);
                    }
                }
            }
        }

        self.append(left);
    }
}

/// Turns some text into a paragraph typeset in a single font.
///
/// Words are separated by the interword glue of the font; characters the font lacks are
/// dropped with a warning. A non zero `indent` starts the paragraph with an empty box.
pub fn itemize(text: &str, font: &Font, id: FontId, indent: Sp) -> Paragraph {
    let mut builder = Builder {
        font,
        id,
        hyphen: font.hyphen_char(),
        nodes: vec![],
    };

    if !indent.is_zero() {
        builder.nodes.push(Node::empty_box(indent));
    }

    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            builder.nodes.push(Node::Glue(font.space()));
        }
        let codes: Vec<u8> = word.chars().filter_map(|c| builder.code(c)).collect();
        builder.word(&codes);
    }

    let mut paragraph = Paragraph::from_nodes(builder.nodes);
    if let Some(hyphen) = font.hyphen_char() {
        paragraph.set_hyphen_char(CharNode::new(font, id, hyphen));
    }
    paragraph
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fonts::glyphs::GlyphTable;
    use crate::fonts::reader::RawLigKern;
    use crate::fonts::tests::{text_font, text_metrics};
    use crate::fonts::FontKey;
    use crate::layout::glue::Glue;
    use test_case::test_case;

    fn glyphs(nodes: &[Node]) -> Vec<(u8, Option<Vec<u8>>)> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Char(c) => Some((c.code, None)),
                Node::Ligature(l) => Some((l.glyph.code, Some(l.original.clone()))),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn words_and_spaces() {
        let font = text_font();
        let paragraph = itemize("  ab   cd ", &font, 0, Sp(0));
        assert_eq!(paragraph.len(), 5);
        assert_eq!(
            paragraph.nodes[2],
            Node::Glue(Glue::new(Sp(218_453), Sp(109_226), Sp(72_817)))
        );
        assert_eq!(paragraph.nodes[0], Node::Char(CharNode::new(&font, 0, b'a')));
    }

    #[test]
    fn indentation() {
        let paragraph = itemize("a", &text_font(), 0, Sp::pt(15));
        assert_eq!(paragraph.nodes[0], Node::empty_box(Sp::pt(15)));
        assert_eq!(paragraph.len(), 2);
    }

    #[test]
    fn ligatures_and_kerns() {
        let font = text_font();
        let paragraph = itemize("fig ava", &font, 3, Sp(0));
        assert_eq!(
            glyphs(&paragraph.nodes),
            [
                (12, Some(b"fi".to_vec())),
                (b'g', None),
                (b'a', None),
                (b'v', None),
                (b'a', None)
            ]
        );
        assert_eq!(paragraph.nodes[4], Node::font_kern(Sp(-40_960)));
        match &paragraph.nodes[0] {
            Node::Ligature(l) => {
                assert_eq!(l.glyph.font, 3);
                assert_eq!(l.glyph.width, font.glyph(12).width);
            }
            other => panic!("expected a ligature, got {:?}", other),
        }
    }

    #[test]
    fn disabled_ligatures() {
        let table = Arc::new(GlyphTable::from_raw(text_metrics()).unwrap());
        let mut key = FontKey::new("test");
        key.ligatures = false;
        key.kerning = false;
        let font = Font::new(table, key);

        let paragraph = itemize("fiav", &font, 0, Sp(0));
        assert_eq!(paragraph.len(), 4);
        assert!(paragraph.iter().all(Node::is_char));
    }

    #[test_case(0, vec![(12, Some(b"fi".to_vec()))] ; "neither kept")]
    #[test_case(1, vec![(12, Some(b"f".to_vec())), (b'i', None)] ; "right kept")]
    #[test_case(2, vec![(b'f', None), (12, Some(b"i".to_vec()))] ; "left kept")]
    #[test_case(3, vec![(b'f', None), (12, None), (b'i', None)] ; "both kept")]
    #[test_case(7, vec![(b'f', None), (12, None), (b'i', None)] ; "both kept skipping one")]
    #[test_case(11, vec![(b'f', None), (12, None), (b'i', None)] ; "both kept skipping two")]
    fn ligature_ops(op: u8, expected: Vec<(u8, Option<Vec<u8>>)>) {
        let mut raw = text_metrics();
        raw.lig_kern[0] = RawLigKern::from_bytes([128, b'i', op, 12]);
        let font = Font::new(
            Arc::new(GlyphTable::from_raw(raw).unwrap()),
            FontKey::new("ops"),
        );

        let paragraph = itemize("fi", &font, 0, Sp(0));
        assert_eq!(glyphs(&paragraph.nodes), expected);
    }

    #[test]
    fn explicit_hyphens() {
        let font = text_font();
        let paragraph = itemize("x-ray", &font, 0, Sp(0));
        assert_eq!(
            paragraph.nodes[2],
            Node::Discretionary(DiscretionaryNode::default())
        );
        assert_eq!(paragraph.len(), 6);
        assert_eq!(paragraph.hyphen_chars[&0].code, b'-');
    }

    #[test]
    fn missing_characters_are_dropped() {
        let paragraph = itemize("aBé", &text_font(), 0, Sp(0));
        assert_eq!(glyphs(&paragraph.nodes), [(b'a', None)]);
    }
}
