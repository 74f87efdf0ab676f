//! The width and indentation of each line of a paragraph.

use crate::config::{ParShapeLine, TypesettingOptions};
use crate::units::Sp;

/// The geometry of the lines of a paragraph, from `hsize`, hanging indentation or an explicit
/// shape.
///
/// Lines after `last_special_line` all have the same geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphShape {
    last_special_line: usize,
    first: ParShapeLine,
    second: ParShapeLine,
    lines: Vec<ParShapeLine>,
}

impl ParagraphShape {
    /// Lines of `hsize` width, without indentation.
    pub fn fixed(hsize: Sp) -> ParagraphShape {
        let line = ParShapeLine {
            indent: Sp(0),
            width: hsize,
        };
        ParagraphShape {
            last_special_line: 0,
            first: line,
            second: line,
            lines: vec![],
        }
    }

    /// Hanging indentation: `|hang_after|` lines of full width, followed (if `hang_after` is
    /// non negative) or preceded (otherwise) by lines shortened by `|hang_indent|`, on the left
    /// if `hang_indent` is positive and on the right otherwise.
    pub fn hanging(hsize: Sp, hang_after: i32, hang_indent: Sp) -> ParagraphShape {
        let hanging = ParShapeLine {
            indent: if hang_indent >= Sp(0) {
                hang_indent
            } else {
                Sp(0)
            },
            width: hsize - hang_indent.abs(),
        };
        let full = ParShapeLine {
            indent: Sp(0),
            width: hsize,
        };
        let (first, second) = if hang_after < 0 {
            (hanging, full)
        } else {
            (full, hanging)
        };

        ParagraphShape {
            last_special_line: hang_after.unsigned_abs() as usize,
            first,
            second,
            lines: vec![],
        }
    }

    /// An explicit shape; the last line is repeated.
    ///
    /// An empty list gives a fixed shape of width `hsize`.
    pub fn explicit(lines: &[ParShapeLine], hsize: Sp) -> ParagraphShape {
        match lines.last() {
            Some(&last) => ParagraphShape {
                last_special_line: lines.len() - 1,
                first: last,
                second: last,
                lines: lines.to_vec(),
            },
            None => ParagraphShape::fixed(hsize),
        }
    }

    /// The shape described by some options.
    pub fn from_options(options: &TypesettingOptions) -> ParagraphShape {
        if !options.par_shape.is_empty() {
            ParagraphShape::explicit(&options.par_shape, options.hsize)
        } else if options.hang_indent.is_zero() {
            ParagraphShape::fixed(options.hsize)
        } else {
            ParagraphShape::hanging(options.hsize, options.hang_after, options.hang_indent)
        }
    }

    /// The last line whose geometry may differ from the following ones.
    pub fn last_special_line(&self) -> usize {
        self.last_special_line
    }

    /// The geometry of a line, numbered from one.
    pub fn line(&self, line: usize) -> ParShapeLine {
        if line > self.last_special_line {
            self.second
        } else if self.lines.is_empty() {
            self.first
        } else {
            self.lines[line.saturating_sub(1)]
        }
    }

    /// The width of a line, numbered from one.
    pub fn width(&self, line: usize) -> Sp {
        self.line(line).width
    }
}
