//! Construction of the lig/kern programs of a font.
//!
//! In the file, lig/kern instructions are packed in a single array where a few skip byte
//! values carry extra meaning: 255 in the first or last instruction describes the boundary
//! character, and values above 128 in the first instruction of a program redirect the program
//! somewhere else. This module resolves all of that and produces a compact array holding only
//! real instructions, with skips expressed in the compact array.

use std::collections::HashMap;
use std::fmt;

use crate::fonts::errors::FontError;
use crate::fonts::fixword::FixWord;
use crate::fonts::reader::{CharTag, RawLigKern, RawMetrics};

/// How an instruction of the raw array can be reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Activity {
    /// No program reaches the instruction, but it is still a real instruction.
    Unreachable,

    /// The instruction only carries information and is dropped.
    Passthrough,

    /// Some program runs the instruction.
    Accessible,
}

/// Who starts a program at a given instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Label {
    /// The program of a character, by index in the character infos.
    Char(usize),

    /// The program run before the first character of a word.
    LeftBoundary,
}

/// The operation of a ligature instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LigatureOp {
    /// Whether the left character stays in place.
    pub keep_left: bool,

    /// Whether the right character stays in place.
    pub keep_right: bool,

    /// How many characters to pass over before looking for the next ligature.
    pub step_over: u8,
}

impl LigatureOp {
    /// Decodes an op byte below 128.
    pub fn from_byte(op: u8) -> LigatureOp {
        LigatureOp {
            keep_left: op & 2 != 0,
            keep_right: op & 1 != 0,
            step_over: op >> 2,
        }
    }

    /// Encodes the operation.
    pub fn to_byte(self) -> u8 {
        (self.step_over << 2) | ((self.keep_left as u8) << 1) | self.keep_right as u8
    }

    /// The number of characters the operation leaves in place, including the ligature.
    pub fn kept(self) -> u8 {
        self.keep_left as u8 + self.keep_right as u8
    }
}

impl fmt::Display for LigatureOp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let left = if self.keep_left { "/" } else { "" };
        let right = if self.keep_right { "/" } else { "" };
        let steps = ">".repeat(self.step_over as usize);
        write!(fmt, "{}LIG{}{}", left, right, steps)
    }
}

/// An instruction of a compact lig/kern program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LigKernEntry {
    /// Inserts a kern between the current character and `next_char`.
    Kern {
        /// Number of instructions to skip to reach the next one, `None` for the last one.
        skip: Option<u8>,
        /// The character that triggers the instruction.
        next_char: u8,
        /// The kern, relative to the design size.
        kern: FixWord,
    },

    /// Replaces the current character and `next_char` by a ligature.
    Ligature {
        /// Number of instructions to skip to reach the next one, `None` for the last one.
        skip: Option<u8>,
        /// The character that triggers the instruction.
        next_char: u8,
        /// The ligature character.
        lig_char: u8,
        /// What happens to the surrounding characters.
        op: LigatureOp,
    },
}

impl LigKernEntry {
    /// The skip of the instruction.
    pub fn skip(&self) -> Option<u8> {
        match self {
            LigKernEntry::Kern { skip, .. } | LigKernEntry::Ligature { skip, .. } => *skip,
        }
    }

    /// The character that triggers the instruction.
    pub fn next_char(&self) -> u8 {
        match self {
            LigKernEntry::Kern { next_char, .. } | LigKernEntry::Ligature { next_char, .. } => {
                *next_char
            }
        }
    }

    /// The index of the instruction that follows the one at `index`, if any.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        self.skip().map(|skip| index + skip as usize + 1)
    }
}

/// The compact lig/kern instructions of a font, along with where each program starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LigKernProgram {
    /// The compact instructions.
    pub entries: Vec<LigKernEntry>,

    /// The start of the program of each character, by index in the character infos.
    pub starts: Vec<Option<usize>>,

    /// The boundary character, which need not exist in the font.
    pub boundary_char: Option<u8>,

    /// The start of the program run at the left boundary of a word.
    pub boundary_start: Option<usize>,
}

/// Working state of the construction.
struct Builder<'a> {
    raw: &'a RawMetrics,
    activity: Vec<Activity>,
    labels: HashMap<usize, Vec<Label>>,
    boundary_char: Option<u8>,
}

impl<'a> Builder<'a> {
    fn new(raw: &'a RawMetrics) -> Builder<'a> {
        Builder {
            raw,
            activity: vec![Activity::Unreachable; raw.lig_kern.len()],
            labels: HashMap::new(),
            boundary_char: None,
        }
    }

    fn len(&self) -> usize {
        self.raw.lig_kern.len()
    }

    fn label(&mut self, index: usize, label: Label) {
        self.labels.entry(index).or_insert_with(Vec::new).push(label);
        self.activity[index] = Activity::Accessible;
    }

    /// Reads the boundary information stored in the first and last instructions.
    fn setup_boundary(&mut self) -> Result<(), FontError> {
        let raw = &self.raw.lig_kern;
        let first = raw[0];
        if first.is_boundary() {
            self.boundary_char = Some(first.next_char);
            self.activity[0] = Activity::Passthrough;
        }

        let last_index = self.len() - 1;
        let last = raw[last_index];
        if last.is_boundary() {
            let start = last.restart_index();
            self.activity[last_index] = Activity::Passthrough;
            if start >= self.len() {
                return Err(FontError::BoundaryAddressTooLarge(start));
            }
            self.label(start, Label::LeftBoundary);
        }

        Ok(())
    }

    /// Follows at most one restart from the declared start of a program.
    fn resolve_start(&mut self, start: usize) -> usize {
        match self.raw.lig_kern.get(start) {
            Some(instruction) if instruction.is_restart() => {
                let target = instruction.restart_index();
                if target < self.len() && self.activity[start] == Activity::Unreachable {
                    self.activity[start] = Activity::Passthrough;
                }
                target
            }
            _ => start,
        }
    }

    /// Labels the first instruction of every character program.
    fn build_labels(&mut self) -> Result<(), FontError> {
        let raw = self.raw;
        for (index, info) in raw.char_infos.iter().enumerate() {
            if info.tag != CharTag::LigKern {
                continue;
            }

            let start = self.resolve_start(info.remainder as usize);
            if start >= self.len() {
                let code = (raw.bc as usize + index) as u8;
                return Err(FontError::StartIndexTooLarge(code));
            }
            self.label(start, Label::Char(index));
        }
        Ok(())
    }

    /// Marks every instruction reachable from a labelled one.
    fn promote_activity(&mut self) -> Result<(), FontError> {
        for index in 0..self.len() {
            let instruction = self.raw.lig_kern[index];
            if self.activity[index] == Activity::Accessible && !instruction.is_stop() {
                let next = instruction.next_index(index);
                if next >= self.len() {
                    return Err(FontError::SkipsTooFar(index));
                }
                self.activity[next] = Activity::Accessible;
            }
        }
        Ok(())
    }

    /// Whether the instruction makes it to the compact array.
    fn survives(&self, index: usize) -> bool {
        self.activity[index] != Activity::Passthrough && !self.raw.lig_kern[index].is_restart()
    }

    /// Computes the skip of an instruction in the compact array.
    ///
    /// A program whose next instruction is a restart stops there.
    fn compact_skip(&self, index: usize) -> Option<u8> {
        let instruction = self.raw.lig_kern[index];
        if instruction.is_stop() {
            return None;
        }

        let next = instruction.next_index(index);
        if !self.survives(next) {
            return None;
        }

        let skipped = (index + 1..next).filter(|&i| self.survives(i)).count();
        Some(skipped as u8)
    }

    fn check_char(&self, code: u8, usage: &'static str) -> Result<(), FontError> {
        if self.raw.char_exists(code) {
            Ok(())
        } else {
            Err(FontError::NonexistentCharacter { usage, code })
        }
    }

    fn make_entry(&self, index: usize, skip: Option<u8>) -> Result<LigKernEntry, FontError> {
        let instruction: RawLigKern = self.raw.lig_kern[index];

        if instruction.is_kern() {
            if Some(instruction.next_char) != self.boundary_char {
                self.check_char(instruction.next_char, "kern step for")?;
            }

            let kern = *self
                .raw
                .kerns
                .get(instruction.kern_index())
                .ok_or(FontError::KernIndexTooLarge(index))?;

            return Ok(LigKernEntry::Kern {
                skip,
                next_char: instruction.next_char,
                kern,
            });
        }

        if Some(instruction.next_char) != self.boundary_char {
            self.check_char(instruction.next_char, "ligature step for")?;
        }
        self.check_char(instruction.lig_char(), "ligature step produces the")?;

        let op = LigatureOp::from_byte(instruction.op);
        if op.step_over > op.kept() {
            return Err(FontError::BadLigatureOp(index));
        }

        Ok(LigKernEntry::Ligature {
            skip,
            next_char: instruction.next_char,
            lig_char: instruction.lig_char(),
            op,
        })
    }

    /// Emits the compact array and resolves the labels.
    fn compact(self) -> Result<LigKernProgram, FontError> {
        let mut program = LigKernProgram {
            entries: vec![],
            starts: vec![None; self.raw.char_infos.len()],
            boundary_char: self.boundary_char,
            boundary_start: None,
        };

        for index in 0..self.len() {
            let instruction = self.raw.lig_kern[index];
            let start = if self.survives(index) {
                Some(program.entries.len())
            } else {
                None
            };

            if let Some(labels) = self.labels.get(&index) {
                for label in labels {
                    match label {
                        Label::Char(c) => program.starts[*c] = start,
                        Label::LeftBoundary => program.boundary_start = start,
                    }
                }
            }

            if self.activity[index] == Activity::Passthrough {
                continue;
            }

            if instruction.is_restart() {
                if instruction.restart_index() >= self.len() {
                    return Err(FontError::RestartAddressTooLarge(index));
                }
                continue;
            }

            let skip = self.compact_skip(index);
            program.entries.push(self.make_entry(index, skip)?);
        }

        Ok(program)
    }
}

impl LigKernProgram {
    /// Builds the compact program from the raw instructions of a font.
    pub fn build(raw: &RawMetrics) -> Result<LigKernProgram, FontError> {
        let mut builder = Builder::new(raw);

        if !raw.lig_kern.is_empty() {
            builder.setup_boundary()?;
        }

        builder.build_labels()?;
        builder.promote_activity()?;

        let program = builder.compact()?;

        trace!(
            "compacted {} lig/kern instructions into {}",
            raw.lig_kern.len(),
            program.entries.len()
        );

        Ok(program)
    }

    /// Iterates over the instructions of the program starting at `start`.
    pub fn program(&self, start: Option<usize>) -> Steps {
        Steps {
            entries: &self.entries,
            next: start,
        }
    }
}

/// Iterator over the instructions of one program.
pub struct Steps<'a> {
    entries: &'a [LigKernEntry],
    next: Option<usize>,
}

impl<'a> Iterator for Steps<'a> {
    type Item = &'a LigKernEntry;

    fn next(&mut self) -> Option<&'a LigKernEntry> {
        let index = self.next?;
        let entry = self.entries.get(index)?;
        self.next = entry.next_index(index);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::reader::tests::small_font;
    use crate::fonts::reader::RawCharInfo;
    use test_case::test_case;

    const A: u8 = b'A';
    const B: u8 = b'B';
    const C: u8 = b'C';
    const D: u8 = b'D';
    const F: u8 = b'F';

    /// A font with the characters A to F and two kerns.
    fn font(program: &[[u8; 4]], starts: &[(u8, u8)]) -> RawMetrics {
        let mut font = small_font();
        font.ec = 70;
        font.char_infos = (A..=F)
            .map(|_| RawCharInfo {
                width_index: 1,
                ..RawCharInfo::MISSING
            })
            .collect();
        for &(code, start) in starts {
            let info = &mut font.char_infos[(code - A) as usize];
            info.tag = CharTag::LigKern;
            info.remainder = start;
        }
        font.lig_kern = program.iter().map(|b| RawLigKern::from_bytes(*b)).collect();
        font.kerns = vec![FixWord(-1 << 16), FixWord(1 << 15)];
        font
    }

    #[test]
    fn simple_program() {
        let raw = font(
            &[[0, B, 128, 0], [0, C, 0, F], [128, D, 128, 1]],
            &[(A, 0)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        assert_eq!(
            program.entries,
            vec![
                LigKernEntry::Kern {
                    skip: Some(0),
                    next_char: B,
                    kern: FixWord(-1 << 16)
                },
                LigKernEntry::Ligature {
                    skip: Some(0),
                    next_char: C,
                    lig_char: F,
                    op: LigatureOp::from_byte(0)
                },
                LigKernEntry::Kern {
                    skip: None,
                    next_char: D,
                    kern: FixWord(1 << 15)
                },
            ]
        );
        assert_eq!(program.starts[0], Some(0));
        assert_eq!(program.starts[1], None);
        assert_eq!(program.program(program.starts[0]).count(), 3);
    }

    #[test]
    fn boundaries_and_restarts() {
        let raw = font(
            &[
                [255, b'Z', 0, 0],
                [0, B, 128, 0],
                [128, C, 128, 1],
                [129, 0, 0, 1],
                [255, 0, 0, 1],
            ],
            &[(A, 1), (B, 3)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        assert_eq!(program.entries.len(), 2);
        assert_eq!(program.boundary_char, Some(b'Z'));
        assert_eq!(program.boundary_start, Some(0));
        assert_eq!(program.starts[0], Some(0));
        assert_eq!(program.starts[1], Some(0));
        assert_eq!(program.entries[0].skip(), Some(0));
        assert_eq!(program.entries[1].skip(), None);
    }

    #[test]
    fn passthrough_instructions_are_not_counted_in_skips() {
        let raw = font(
            &[[1, B, 128, 0], [129, 0, 0, 0], [128, C, 128, 1]],
            &[(A, 0), (B, 1)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        assert_eq!(program.entries.len(), 2);
        assert_eq!(program.entries[0].skip(), Some(0));
        assert_eq!(program.entries[0].next_index(0), Some(1));
        assert_eq!(program.starts[1], Some(0));
    }

    #[test]
    fn restart_reached_normally_stops() {
        let raw = font(
            &[[1, B, 128, 0], [0, C, 128, 0], [130, 0, 0, 0]],
            &[(A, 0)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        assert_eq!(program.entries.len(), 2);
        assert_eq!(program.entries[0].skip(), None);
        assert_eq!(program.entries[1].skip(), None);
    }

    #[test]
    fn kerns_with_the_boundary_character() {
        let raw = font(
            &[[255, b'Z', 0, 0], [128, b'Z', 128, 0]],
            &[(A, 1)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        assert_eq!(program.entries[0].next_char(), b'Z');
    }

    #[test_case(&[[0, B, 128, 0]], &[(A, 5)], FontError::StartIndexTooLarge(A) ; "start")]
    #[test_case(&[[5, B, 128, 0]], &[(A, 0)], FontError::SkipsTooFar(0) ; "skip")]
    #[test_case(&[[128, B, 129, 0]], &[(A, 0)], FontError::KernIndexTooLarge(0) ; "kern index")]
    #[test_case(&[[128, b'Y', 128, 0]], &[(A, 0)],
        FontError::NonexistentCharacter { usage: "kern step for", code: b'Y' } ; "next char")]
    #[test_case(&[[128, B, 0, b'Y']], &[(A, 0)],
        FontError::NonexistentCharacter { usage: "ligature step produces the", code: b'Y' } ; "lig char")]
    #[test_case(&[[128, B, 13, F]], &[(A, 0)], FontError::BadLigatureOp(0) ; "lig op")]
    #[test_case(&[[128, B, 128, 0], [255, 0, 0, 9]], &[(A, 0)],
        FontError::BoundaryAddressTooLarge(9) ; "boundary")]
    #[test_case(&[[0, B, 128, 0], [200, 0, 0, 9]], &[(A, 0)],
        FontError::RestartAddressTooLarge(1) ; "restart")]
    fn rejects(program: &[[u8; 4]], starts: &[(u8, u8)], expected: FontError) {
        let raw = font(program, starts);
        assert_eq!(LigKernProgram::build(&raw), Err(expected));
    }

    #[test]
    fn every_program_terminates() {
        let raw = font(
            &[
                [0, B, 128, 0],
                [2, C, 0, F],
                [0, D, 128, 1],
                [128, F, 128, 0],
                [128, B, 1, F],
            ],
            &[(A, 0), (B, 2), (C, 4), (D, 1)],
        );
        let program = LigKernProgram::build(&raw).unwrap();
        for start in program.starts.iter().filter(|s| s.is_some()) {
            let mut index = start.unwrap();
            let mut steps = 0;
            while let Some(next) = program.entries[index].next_index(index) {
                index = next;
                steps += 1;
                assert!(steps <= program.entries.len());
            }
        }
    }

    #[test]
    fn ligature_op_names() {
        assert_eq!(LigatureOp::from_byte(0).to_string(), "LIG");
        assert_eq!(LigatureOp::from_byte(3).to_string(), "/LIG/");
        assert_eq!(LigatureOp::from_byte(11).to_string(), "/LIG/>>");
        assert_eq!(LigatureOp::from_byte(7).to_byte(), 7);
    }
}
