//! The per character records of a font.

use std::fs::File;
use std::path::Path;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::fonts::errors::{FontError, Table};
use crate::fonts::fixword::FixWord;
use crate::fonts::ligkern::{LigKernEntry, LigKernProgram, Steps};
use crate::fonts::reader::{CharTag, FontKind, HeaderInfo, RawCharInfo, RawMetrics};
use crate::Result;

/// The pieces used to build a character of variable size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExtensibleRecipe {
    /// The top piece.
    pub top: Option<u8>,

    /// The middle piece.
    pub mid: Option<u8>,

    /// The bottom piece.
    pub bot: Option<u8>,

    /// The piece repeated as many times as needed.
    pub rep: u8,
}

/// Everything known about a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRecord {
    /// The width.
    pub width: FixWord,

    /// The height.
    pub height: FixWord,

    /// The depth.
    pub depth: FixWord,

    /// The italic correction.
    pub italic: FixWord,

    /// What the remainder of the character meant.
    pub tag: CharTag,

    /// The start of the lig/kern program of the character.
    pub lig_kern_start: Option<usize>,

    /// The next character in a list of growing characters.
    pub next_larger: Option<u8>,

    /// How to build a character of variable size.
    pub extensible: Option<ExtensibleRecipe>,
}

/// A decoded font metric file, with one record per existing character.
#[derive(Debug, Clone)]
pub struct GlyphTable {
    raw: RawMetrics,
    glyphs: Vec<Option<GlyphRecord>>,
    program: LigKernProgram,
}

fn take_dimension(
    table: &[FixWord],
    index: u8,
    code: u8,
    which: Table,
) -> std::result::Result<FixWord, FontError> {
    table
        .get(index as usize)
        .copied()
        .ok_or(FontError::CharIndexOutOfRange {
            code,
            table: which,
            index: index as usize,
        })
}

impl GlyphTable {
    /// Links the decoded tables of a font.
    pub fn from_raw(raw: RawMetrics) -> std::result::Result<GlyphTable, FontError> {
        let program = LigKernProgram::build(&raw)?;

        for recipe in &raw.extensibles {
            for &piece in &[recipe.top, recipe.mid, recipe.bot] {
                if piece != 0 && !raw.char_exists(piece) {
                    return Err(FontError::NonexistentCharacter {
                        usage: "extensible recipe involves the",
                        code: piece,
                    });
                }
            }
            if !raw.char_exists(recipe.rep) {
                return Err(FontError::NonexistentCharacter {
                    usage: "extensible recipe involves the",
                    code: recipe.rep,
                });
            }
        }

        let mut lists = DiGraphMap::<u8, ()>::new();
        let mut glyphs = Vec::with_capacity(raw.char_infos.len());

        for (index, info) in raw.char_infos.iter().enumerate() {
            if !info.exists() {
                glyphs.push(None);
                continue;
            }

            let code = (raw.bc as usize + index) as u8;
            let record = GlyphTable::record(&raw, &program, info, index, code)?;

            if let Some(next) = record.next_larger {
                lists.add_edge(code, next, ());
            }

            glyphs.push(Some(record));
        }

        if let Err(cycle) = toposort(&lists, None) {
            return Err(FontError::CyclicCharList(cycle.node_id()));
        }

        Ok(GlyphTable {
            raw,
            glyphs,
            program,
        })
    }

    fn record(
        raw: &RawMetrics,
        program: &LigKernProgram,
        info: &RawCharInfo,
        index: usize,
        code: u8,
    ) -> std::result::Result<GlyphRecord, FontError> {
        let mut record = GlyphRecord {
            width: take_dimension(&raw.widths, info.width_index, code, Table::Width)?,
            height: take_dimension(&raw.heights, info.height_index, code, Table::Height)?,
            depth: take_dimension(&raw.depths, info.depth_index, code, Table::Depth)?,
            italic: take_dimension(&raw.italics, info.italic_index, code, Table::Italic)?,
            tag: info.tag,
            lig_kern_start: None,
            next_larger: None,
            extensible: None,
        };

        match info.tag {
            CharTag::None => (),
            CharTag::LigKern => record.lig_kern_start = program.starts[index],
            CharTag::List => {
                if !raw.char_exists(info.remainder) {
                    return Err(FontError::NonexistentCharacter {
                        usage: "character list link to",
                        code: info.remainder,
                    });
                }
                record.next_larger = Some(info.remainder);
            }
            CharTag::Extensible => {
                let recipe = raw
                    .extensibles
                    .get(info.remainder as usize)
                    .ok_or(FontError::ExtensibleIndexTooLarge(code))?;
                let piece = |c: u8| if c == 0 { None } else { Some(c) };
                record.extensible = Some(ExtensibleRecipe {
                    top: piece(recipe.top),
                    mid: piece(recipe.mid),
                    bot: piece(recipe.bot),
                    rep: recipe.rep,
                });
            }
        }

        Ok(record)
    }

    /// Decodes a font metric file held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<GlyphTable> {
        let raw = RawMetrics::parse(bytes)?;
        Ok(GlyphTable::from_raw(raw)?)
    }

    /// Decodes a font metric file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GlyphTable> {
        let raw = RawMetrics::from_reader(File::open(path)?)?;
        Ok(GlyphTable::from_raw(raw)?)
    }

    /// Returns the record of a character, or `None` if the font does not have it.
    pub fn get(&self, code: u8) -> Option<&GlyphRecord> {
        let bc = self.raw.bc as usize;
        let code = code as usize;
        if code < bc {
            return None;
        }
        self.glyphs.get(code - bc).and_then(Option::as_ref)
    }

    /// Whether the font has a character.
    pub fn exists(&self, code: u8) -> bool {
        self.get(code).is_some()
    }

    /// Iterates over the existing characters and their records.
    pub fn glyphs(&self) -> impl Iterator<Item = (u8, &GlyphRecord)> {
        let bc = self.raw.bc as usize;
        self.glyphs
            .iter()
            .enumerate()
            .filter_map(move |(i, g)| g.as_ref().map(|g| ((bc + i) as u8, g)))
    }

    /// The decoded tables, as read.
    pub fn raw(&self) -> &RawMetrics {
        &self.raw
    }

    /// The header of the file.
    pub fn header(&self) -> &HeaderInfo {
        &self.raw.header
    }

    /// The checksum of the font.
    pub fn checksum(&self) -> u32 {
        self.raw.header.checksum
    }

    /// The design size, in points.
    pub fn design_size(&self) -> FixWord {
        self.raw.header.design_size
    }

    /// The kind of the font.
    pub fn kind(&self) -> FontKind {
        self.raw.kind
    }

    /// Returns a parameter by number, starting at one.
    pub fn param(&self, number: usize) -> Option<FixWord> {
        if number == 0 {
            return None;
        }
        self.raw.params.get(number - 1).copied()
    }

    /// All the parameters.
    pub fn params(&self) -> &[FixWord] {
        &self.raw.params
    }

    /// The compact lig/kern instructions.
    pub fn lig_kern_entries(&self) -> &[LigKernEntry] {
        &self.program.entries
    }

    /// The boundary character.
    pub fn boundary_char(&self) -> Option<u8> {
        self.program.boundary_char
    }

    /// The instructions run for a character.
    pub fn lig_kern_program(&self, code: u8) -> Steps {
        let start = self.get(code).and_then(|g| g.lig_kern_start);
        self.program.program(start)
    }

    /// The instructions run at the left boundary of a word.
    pub fn left_boundary_program(&self) -> Steps {
        self.program.program(self.program.boundary_start)
    }

    /// Finds the instruction applying to a pair of characters.
    pub fn lookup(&self, left: u8, right: u8) -> Option<&LigKernEntry> {
        self.lig_kern_program(left)
            .find(|entry| entry.next_char() == right)
    }
}
