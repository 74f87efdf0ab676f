//! Decoding of TeX font metric files.
//!
//! A font metric file is a sequence of big endian 32 bit words. The first six words hold the
//! lengths of every table, then come the header, the character infos, the four dimension
//! tables, the lig/kern instructions, the kerns, the extensible recipes and the parameters.
//! This module reads everything into a [`RawMetrics`] and checks every invariant of the format
//! that does not need the lig/kern program to be built.

use std::io::Read;

use nom::combinator::map;
use nom::multi::count;
use nom::number::complete::{be_i32, be_u16, be_u32, be_u8};
use nom::sequence::tuple;
use nom::IResult;

use crate::fonts::errors::{FontError, Table};
use crate::fonts::fixword::FixWord;
use crate::Result;

/// Number of words of the coding scheme string.
pub const CODING_SCHEME_WORDS: usize = 10;

/// Number of words of the family string.
pub const FAMILY_WORDS: usize = 5;

/// Names of the subfile sizes, in file order.
const LENGTH_NAMES: [&str; 12] = [
    "lf", "lh", "bc", "ec", "nw", "nh", "nd", "ni", "nl", "nk", "ne", "np",
];

/// The twelve subfile sizes found at the start of a font metric file.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Lengths {
    /// Length of the whole file, in words.
    pub lf: u16,
    /// Length of the header, in words.
    pub lh: u16,
    /// Smallest character code.
    pub bc: u16,
    /// Largest character code.
    pub ec: u16,
    /// Number of widths.
    pub nw: u16,
    /// Number of heights.
    pub nh: u16,
    /// Number of depths.
    pub nd: u16,
    /// Number of italic corrections.
    pub ni: u16,
    /// Number of lig/kern instructions.
    pub nl: u16,
    /// Number of kerns.
    pub nk: u16,
    /// Number of extensible recipes.
    pub ne: u16,
    /// Number of parameters.
    pub np: u16,
}

impl Lengths {
    /// Number of characters described by the file.
    pub fn char_count(&self) -> usize {
        (self.ec as usize + 1).saturating_sub(self.bc as usize)
    }

    /// The file length implied by the other eleven sizes.
    pub fn computed_length(&self) -> u32 {
        6 + self.lh as u32
            + self.char_count() as u32
            + self.nw as u32
            + self.nh as u32
            + self.nd as u32
            + self.ni as u32
            + self.nl as u32
            + self.nk as u32
            + self.ne as u32
            + self.np as u32
    }

    /// Returns the sizes in file order.
    pub fn to_array(&self) -> [u16; 12] {
        [
            self.lf, self.lh, self.bc, self.ec, self.nw, self.nh, self.nd, self.ni, self.nl,
            self.nk, self.ne, self.np,
        ]
    }

    /// Checks the consistency of the sizes.
    fn validate(&self) -> std::result::Result<(), FontError> {
        if self.lf < 6 {
            return Err(FontError::FileTooShort(self.lf));
        }

        if self.lh < 2 {
            return Err(FontError::HeaderTooShort(self.lh));
        }

        if self.bc > self.ec + 1 || self.ec > 255 {
            return Err(FontError::BadCharacterRange {
                bc: self.bc,
                ec: self.ec,
            });
        }

        for (size, table) in [
            (self.nw, Table::Width),
            (self.nh, Table::Height),
            (self.nd, Table::Depth),
            (self.ni, Table::Italic),
        ]
        .iter()
        {
            if *size == 0 {
                return Err(FontError::IncompleteSubfiles(*table));
            }
        }

        if self.ne > 256 {
            return Err(FontError::TooManyRecipes(self.ne));
        }

        let computed = self.computed_length();
        if self.lf as u32 != computed {
            return Err(FontError::LengthMismatch {
                declared: self.lf,
                computed,
            });
        }

        Ok(())
    }
}

/// The kind of a font, deduced from its coding scheme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontKind {
    /// A text font.
    Vanilla,

    /// A math symbols font, with 22 parameters.
    MathSymbols,

    /// A math extension font, with 13 parameters.
    MathExtension,
}

impl FontKind {
    /// Deduces the kind of a font from its coding scheme.
    pub fn from_coding_scheme(scheme: Option<&str>) -> FontKind {
        match scheme {
            Some(s) if s.starts_with("TEX MATH SY") => FontKind::MathSymbols,
            Some(s) if s.starts_with("TEX MATH EX") => FontKind::MathExtension,
            _ => FontKind::Vanilla,
        }
    }

    /// The number of parameters fonts of this kind must have, if any.
    pub fn required_params(self) -> Option<usize> {
        match self {
            FontKind::Vanilla => None,
            FontKind::MathSymbols => Some(22),
            FontKind::MathExtension => Some(13),
        }
    }
}

/// The decoded header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// The checksum, copied to DVI files.
    pub checksum: u32,

    /// The design size of the font, in points.
    pub design_size: FixWord,

    /// The character coding scheme, uppercased.
    pub coding_scheme: Option<String>,

    /// The font family, uppercased.
    pub family: Option<String>,

    /// Whether all characters are below 128.
    pub seven_bit_safe: bool,

    /// The Xerox face code.
    pub face: Option<u8>,

    /// The words following the face, uninterpreted.
    pub rest: Vec<u32>,
}

impl HeaderInfo {
    /// Creates a minimal header.
    pub fn new(checksum: u32, design_size: FixWord) -> HeaderInfo {
        HeaderInfo {
            checksum,
            design_size,
            coding_scheme: None,
            family: None,
            seven_bit_safe: false,
            face: None,
            rest: vec![],
        }
    }

    /// Encodes the header as words, the way they appear in a file.
    ///
    /// Optional fields force the presence of the fields before them, so a header with a family
    /// but no coding scheme gets an empty coding scheme.
    pub fn to_words(&self) -> Vec<u32> {
        let mut words = vec![self.checksum, self.design_size.to_raw() as u32];

        let has_flags = self.face.is_some() || self.seven_bit_safe || !self.rest.is_empty();
        let has_family = self.family.is_some() || has_flags;
        let has_scheme = self.coding_scheme.is_some() || has_family;

        if has_scheme {
            let scheme = self.coding_scheme.as_deref().unwrap_or("");
            words.extend(bcpl_words(scheme, CODING_SCHEME_WORDS));
        }

        if has_family {
            let family = self.family.as_deref().unwrap_or("");
            words.extend(bcpl_words(family, FAMILY_WORDS));
        }

        if has_flags {
            let safe = if self.seven_bit_safe { 0x80 } else { 0 };
            words.push((safe << 24) | self.face.unwrap_or(0) as u32);
            words.extend(self.rest.iter().copied());
        }

        words
    }
}

/// Packs a string into `size` words, length first, padded with zeros.
fn bcpl_words(s: &str, size: usize) -> Vec<u32> {
    let mut bytes = vec![0u8; size * 4];
    let len = s.len().min(size * 4 - 1);
    bytes[0] = len as u8;
    bytes[1..=len].copy_from_slice(&s.as_bytes()[..len]);
    bytes
        .chunks(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// The meaning of the remainder byte of a character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharTag {
    /// The remainder is unused.
    None,

    /// The remainder is the start of the lig/kern program of the character.
    LigKern,

    /// The remainder is the next larger character.
    List,

    /// The remainder is the index of an extensible recipe.
    Extensible,
}

impl CharTag {
    /// Decodes the two tag bits.
    pub fn from_bits(bits: u8) -> CharTag {
        match bits & 3 {
            0 => CharTag::None,
            1 => CharTag::LigKern,
            2 => CharTag::List,
            _ => CharTag::Extensible,
        }
    }

    /// Encodes the tag in two bits.
    pub fn to_bits(self) -> u8 {
        match self {
            CharTag::None => 0,
            CharTag::LigKern => 1,
            CharTag::List => 2,
            CharTag::Extensible => 3,
        }
    }
}

/// A character info word, as found in the file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawCharInfo {
    /// Index in the width table; zero means the character does not exist.
    pub width_index: u8,

    /// Index in the height table.
    pub height_index: u8,

    /// Index in the depth table.
    pub depth_index: u8,

    /// Index in the italic correction table.
    pub italic_index: u8,

    /// Meaning of the remainder.
    pub tag: CharTag,

    /// Lig/kern start, next larger character or extensible recipe.
    pub remainder: u8,
}

impl RawCharInfo {
    /// An info word for a character that does not exist.
    pub const MISSING: RawCharInfo = RawCharInfo {
        width_index: 0,
        height_index: 0,
        depth_index: 0,
        italic_index: 0,
        tag: CharTag::None,
        remainder: 0,
    };

    /// Unpacks the four bytes of a character info word.
    pub fn from_bytes(b: [u8; 4]) -> RawCharInfo {
        RawCharInfo {
            width_index: b[0],
            height_index: b[1] >> 4,
            depth_index: b[1] & 0xF,
            italic_index: b[2] >> 2,
            tag: CharTag::from_bits(b[2]),
            remainder: b[3],
        }
    }

    /// Packs the info word.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            self.width_index,
            (self.height_index << 4) | (self.depth_index & 0xF),
            (self.italic_index << 2) | self.tag.to_bits(),
            self.remainder,
        ]
    }

    /// Whether the character exists.
    pub fn exists(&self) -> bool {
        self.width_index != 0
    }
}

/// A lig/kern instruction, as found in the file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawLigKern {
    /// Distance to the next instruction, or a stop/restart/boundary marker.
    pub skip: u8,

    /// The character that triggers the instruction.
    pub next_char: u8,

    /// The operation.
    pub op: u8,

    /// The ligature character, or the low byte of a kern index.
    pub remainder: u8,
}

impl RawLigKern {
    /// The skip byte that marks boundary information.
    pub const BOUNDARY: u8 = 255;

    /// Unpacks the four bytes of an instruction.
    pub fn from_bytes(b: [u8; 4]) -> RawLigKern {
        RawLigKern {
            skip: b[0],
            next_char: b[1],
            op: b[2],
            remainder: b[3],
        }
    }

    /// Packs the instruction.
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.skip, self.next_char, self.op, self.remainder]
    }

    /// Whether the instruction holds boundary information.
    pub fn is_boundary(&self) -> bool {
        self.skip == Self::BOUNDARY
    }

    /// Whether the instruction redirects to another part of the table.
    pub fn is_restart(&self) -> bool {
        self.skip > 128
    }

    /// Whether the instruction is the last of its program.
    pub fn is_stop(&self) -> bool {
        self.skip >= 128
    }

    /// The position of the next instruction of the program.
    pub fn next_index(&self, position: usize) -> usize {
        position + self.skip as usize + 1
    }

    /// The target of a restart instruction.
    pub fn restart_index(&self) -> usize {
        256 * self.op as usize + self.remainder as usize
    }

    /// Whether the instruction is a kern.
    pub fn is_kern(&self) -> bool {
        self.op >= 128
    }

    /// The index in the kern table of a kern instruction.
    pub fn kern_index(&self) -> usize {
        256 * (self.op as usize - 128) + self.remainder as usize
    }

    /// Whether a ligature keeps the left character.
    pub fn leave_left(&self) -> bool {
        self.op & 2 != 0
    }

    /// Whether a ligature keeps the right character.
    pub fn leave_right(&self) -> bool {
        self.op & 1 != 0
    }

    /// How many characters the cursor moves over after a ligature.
    pub fn step_over(&self) -> u8 {
        self.op >> 2
    }

    /// The character inserted by a ligature.
    pub fn lig_char(&self) -> u8 {
        self.remainder
    }
}

/// An extensible recipe. Zero means absent for every piece but the repeater.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RawExtensible {
    /// Top piece.
    pub top: u8,
    /// Middle piece.
    pub mid: u8,
    /// Bottom piece.
    pub bot: u8,
    /// Repeated piece.
    pub rep: u8,
}

/// Everything a font metric file contains, checked but not yet linked.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetrics {
    /// The header words as found in the file.
    pub header_words: Vec<u32>,

    /// The decoded header.
    pub header: HeaderInfo,

    /// The kind of the font.
    pub kind: FontKind,

    /// The smallest character code.
    pub bc: u16,

    /// The largest character code.
    pub ec: u16,

    /// One info word per character in `bc..=ec`.
    pub char_infos: Vec<RawCharInfo>,

    /// The width table.
    pub widths: Vec<FixWord>,

    /// The height table.
    pub heights: Vec<FixWord>,

    /// The depth table.
    pub depths: Vec<FixWord>,

    /// The italic correction table.
    pub italics: Vec<FixWord>,

    /// The raw lig/kern instructions.
    pub lig_kern: Vec<RawLigKern>,

    /// The kern table.
    pub kerns: Vec<FixWord>,

    /// The extensible recipes.
    pub extensibles: Vec<RawExtensible>,

    /// The parameters; `params[0]` is parameter number one, the slant.
    pub params: Vec<FixWord>,
}

type Parsed<'a, O> = std::result::Result<(&'a [u8], O), FontError>;

/// Runs a nom parser, turning any failure into a truncation of the given section.
fn section<'a, O, P>(input: &'a [u8], name: &'static str, mut parser: P) -> Parsed<'a, O>
where
    P: FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
{
    parser(input).map_err(|_| FontError::Truncated(name))
}

fn fix_word(input: &[u8]) -> IResult<&[u8], FixWord> {
    map(be_i32, FixWord::from_raw)(input)
}

fn word_bytes(input: &[u8]) -> IResult<&[u8], [u8; 4]> {
    map(tuple((be_u8, be_u8, be_u8, be_u8)), |(a, b, c, d)| {
        [a, b, c, d]
    })(input)
}

fn extensible(input: &[u8]) -> IResult<&[u8], RawExtensible> {
    map(word_bytes, |[top, mid, bot, rep]| RawExtensible {
        top,
        mid,
        bot,
        rep,
    })(input)
}

/// Reads the twelve subfile sizes.
fn parse_lengths(input: &[u8]) -> Parsed<Lengths> {
    let (_, first) = section(input, "file length", be_u8)?;
    if first > 127 {
        return Err(FontError::FirstByteTooLarge(first));
    }

    let (input, raw) = section(input, "subfile sizes", count(be_u16, 12))?;
    for (value, name) in raw.iter().zip(LENGTH_NAMES.iter()).skip(1) {
        if *value > 0x7FFF {
            return Err(FontError::NegativeSubfileSize(name));
        }
    }

    let lengths = Lengths {
        lf: raw[0],
        lh: raw[1],
        bc: raw[2],
        ec: raw[3],
        nw: raw[4],
        nh: raw[5],
        nd: raw[6],
        ni: raw[7],
        nl: raw[8],
        nk: raw[9],
        ne: raw[10],
        np: raw[11],
    };
    lengths.validate()?;

    Ok((input, lengths))
}

/// Reads a BCPL string occupying `size` bytes.
fn bcpl(bytes: &[u8], field: &'static str) -> std::result::Result<String, FontError> {
    let length = bytes[0];
    if length as usize >= bytes.len() {
        return Err(FontError::StringTooLong { field, length });
    }

    let mut string = String::with_capacity(length as usize);
    for &byte in &bytes[1..=length as usize] {
        if byte == b'(' || byte == b')' {
            return Err(FontError::ParenthesisInString(field));
        }
        if !(b' '..=b'~').contains(&byte) {
            return Err(FontError::NonStandardCharacter { field, byte });
        }
        string.push(byte.to_ascii_uppercase() as char);
    }

    Ok(string)
}

/// Decodes the header words.
fn decode_header(words: &[u32]) -> std::result::Result<HeaderInfo, FontError> {
    let design_size = FixWord::from_raw(words[1] as i32);
    let mut header = HeaderInfo::new(words[0], design_size);

    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect();
    let mut offset = 2;

    if words.len() - offset >= CODING_SCHEME_WORDS {
        let end = offset + CODING_SCHEME_WORDS;
        header.coding_scheme = Some(bcpl(&bytes[offset * 4..end * 4], "coding scheme")?);
        offset = end;

        if words.len() - offset >= FAMILY_WORDS {
            let end = offset + FAMILY_WORDS;
            header.family = Some(bcpl(&bytes[offset * 4..end * 4], "family")?);
            offset = end;

            if words.len() > offset {
                let flags = words[offset].to_be_bytes();
                header.seven_bit_safe = flags[0] > 127;
                header.face = Some(flags[3]);
                header.rest = words[offset + 1..].to_vec();
            }
        }
    }

    if design_size < FixWord::ZERO {
        return Err(FontError::DesignSizeNegative);
    }

    if design_size < FixWord::UNITY {
        return Err(FontError::DesignSizeTooSmall);
    }

    Ok(header)
}

/// Forces the first entry of a dimension table to zero.
fn zero_first_entry(table: &mut [FixWord], which: Table) {
    if table[0] != FixWord::ZERO {
        warn!("the first {} is {} instead of zero, ignoring it", which, table[0]);
        table[0] = FixWord::ZERO;
    }
}

/// Checks that every dimension of a table starting at `from` is below sixteen design sizes.
fn check_dimensions(
    table: &[FixWord],
    from: usize,
    which: Table,
) -> std::result::Result<(), FontError> {
    match table
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, value)| !value.is_within(16))
    {
        Some((index, _)) => Err(FontError::DimensionTooBig {
            table: which,
            index,
        }),
        None => Ok(()),
    }
}

impl RawMetrics {
    /// Decodes and checks a font metric file.
    pub fn parse(input: &[u8]) -> std::result::Result<RawMetrics, FontError> {
        let (input, lengths) = parse_lengths(input)?;

        let (input, header_words) = section(input, "header", count(be_u32, lengths.lh as usize))?;
        let (input, char_infos) = section(
            input,
            "character infos",
            count(map(word_bytes, RawCharInfo::from_bytes), lengths.char_count()),
        )?;
        let (input, mut widths) = section(input, "widths", count(fix_word, lengths.nw as usize))?;
        let (input, mut heights) =
            section(input, "heights", count(fix_word, lengths.nh as usize))?;
        let (input, mut depths) = section(input, "depths", count(fix_word, lengths.nd as usize))?;
        let (input, mut italics) = section(
            input,
            "italic corrections",
            count(fix_word, lengths.ni as usize),
        )?;
        let (input, lig_kern) = section(
            input,
            "lig/kern instructions",
            count(map(word_bytes, RawLigKern::from_bytes), lengths.nl as usize),
        )?;
        let (input, kerns) = section(input, "kerns", count(fix_word, lengths.nk as usize))?;
        let (input, extensibles) = section(
            input,
            "extensible recipes",
            count(extensible, lengths.ne as usize),
        )?;
        let (input, params) = section(input, "parameters", count(fix_word, lengths.np as usize))?;

        if !input.is_empty() {
            return Err(FontError::ExtraJunk(input.len()));
        }

        let header = decode_header(&header_words)?;
        let kind = FontKind::from_coding_scheme(header.coding_scheme.as_deref());

        check_dimensions(&params, 1, Table::Param)?;
        if let Some(expected) = kind.required_params() {
            if params.len() != expected {
                return Err(FontError::UnusualParameterCount {
                    scheme: header.coding_scheme.clone().unwrap_or_default(),
                    expected,
                    found: params.len(),
                });
            }
        }

        zero_first_entry(&mut widths, Table::Width);
        zero_first_entry(&mut heights, Table::Height);
        zero_first_entry(&mut depths, Table::Depth);
        zero_first_entry(&mut italics, Table::Italic);

        check_dimensions(&widths, 0, Table::Width)?;
        check_dimensions(&heights, 0, Table::Height)?;
        check_dimensions(&depths, 0, Table::Depth)?;
        check_dimensions(&italics, 0, Table::Italic)?;
        check_dimensions(&kerns, 0, Table::Kern)?;

        debug!(
            "decoded font metrics: {} characters, {} lig/kern instructions, {} parameters",
            char_infos.len(),
            lig_kern.len(),
            params.len()
        );

        Ok(RawMetrics {
            header_words,
            header,
            kind,
            bc: lengths.bc,
            ec: lengths.ec,
            char_infos,
            widths,
            heights,
            depths,
            italics,
            lig_kern,
            kerns,
            extensibles,
            params,
        })
    }

    /// Reads a whole stream and decodes it.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<RawMetrics> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        Ok(RawMetrics::parse(&bytes)?)
    }

    /// Returns the info word of a character, if its code is in range.
    pub fn char_info(&self, code: u8) -> Option<&RawCharInfo> {
        let code = code as usize;
        let bc = self.bc as usize;
        if code < bc {
            return None;
        }
        self.char_infos.get(code - bc)
    }

    /// Whether a character exists in the font.
    pub fn char_exists(&self, code: u8) -> bool {
        self.char_info(code).map(RawCharInfo::exists).unwrap_or(false)
    }

    /// Computes the subfile sizes matching the content.
    pub fn lengths(&self) -> Lengths {
        let mut lengths = Lengths {
            lf: 0,
            lh: self.header_words.len() as u16,
            bc: self.bc,
            ec: self.ec,
            nw: self.widths.len() as u16,
            nh: self.heights.len() as u16,
            nd: self.depths.len() as u16,
            ni: self.italics.len() as u16,
            nl: self.lig_kern.len() as u16,
            nk: self.kerns.len() as u16,
            ne: self.extensibles.len() as u16,
            np: self.params.len() as u16,
        };
        lengths.lf = lengths.computed_length() as u16;
        lengths
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    /// A small valid font: design size 10pt, characters 'A' (65) and 'B' (66).
    pub fn small_font() -> RawMetrics {
        let mut header = HeaderInfo::new(0xCAFE_BABE, FixWord::from_int(10));
        header.coding_scheme = Some("TEX TEXT".into());
        header.family = Some("TEST".into());
        header.face = Some(0);

        RawMetrics {
            header_words: header.to_words(),
            header,
            kind: FontKind::Vanilla,
            bc: 65,
            ec: 66,
            char_infos: vec![
                RawCharInfo {
                    width_index: 1,
                    height_index: 1,
                    depth_index: 0,
                    italic_index: 0,
                    tag: CharTag::None,
                    remainder: 0,
                },
                RawCharInfo {
                    width_index: 2,
                    height_index: 1,
                    depth_index: 1,
                    italic_index: 1,
                    tag: CharTag::None,
                    remainder: 0,
                },
            ],
            widths: vec![FixWord::ZERO, FixWord(1 << 19), FixWord(3 << 18)],
            heights: vec![FixWord::ZERO, FixWord(700_000)],
            depths: vec![FixWord::ZERO, FixWord(200_000)],
            italics: vec![FixWord::ZERO, FixWord(20_000)],
            lig_kern: vec![],
            kerns: vec![],
            extensibles: vec![],
            params: vec![
                FixWord::ZERO,
                FixWord(1 << 18),
                FixWord(1 << 17),
                FixWord(1 << 16),
                FixWord(450_000),
                FixWord(1 << 20),
                FixWord(1 << 16),
            ],
        }
    }

    #[test]
    fn decodes_an_encoded_font() {
        let font = small_font();
        let bytes = font.to_bytes();
        let decoded = RawMetrics::parse(&bytes).unwrap();
        assert_eq!(decoded, font);
        assert_eq!(decoded.header.coding_scheme.as_deref(), Some("TEX TEXT"));
        assert_eq!(decoded.header.family.as_deref(), Some("TEST"));
        assert_eq!(decoded.header.design_size, FixWord::from_int(10));
    }

    #[test]
    fn strings_are_uppercased() {
        let mut font = small_font();
        font.header.family = Some("cmr".into());
        font.header_words = font.header.to_words();
        let decoded = RawMetrics::parse(&font.to_bytes()).unwrap();
        assert_eq!(decoded.header.family.as_deref(), Some("CMR"));
    }

    #[test]
    fn minimal_header() {
        let mut font = small_font();
        font.header = HeaderInfo::new(7, FixWord::from_int(12));
        font.header_words = font.header.to_words();
        let decoded = RawMetrics::parse(&font.to_bytes()).unwrap();
        assert_eq!(decoded.header_words.len(), 2);
        assert_eq!(decoded.header.coding_scheme, None);
        assert_eq!(decoded.kind, FontKind::Vanilla);
    }

    #[test]
    fn first_dimension_is_forced_to_zero() {
        let mut font = small_font();
        font.heights[0] = FixWord(5);
        let decoded = RawMetrics::parse(&font.to_bytes()).unwrap();
        assert_eq!(decoded.heights[0], FixWord::ZERO);
    }

    #[test]
    fn empty_character_range() {
        let mut font = small_font();
        font.bc = 1;
        font.ec = 0;
        font.char_infos.clear();
        let decoded = RawMetrics::parse(&font.to_bytes()).unwrap();
        assert!(decoded.char_infos.is_empty());
        assert!(!decoded.char_exists(0));
    }

    fn corrupt(offset: usize, value: u8) -> Vec<u8> {
        let mut bytes = small_font().to_bytes();
        bytes[offset] = value;
        bytes
    }

    #[test_case(corrupt(0, 0x80), FontError::FirstByteTooLarge(0x80) ; "first byte")]
    #[test_case(corrupt(2, 0x80), FontError::NegativeSubfileSize("lh") ; "negative header")]
    #[test_case(corrupt(0, 1), FontError::LengthMismatch { declared: 256 + 42, computed: 42 } ; "length")]
    fn rejects_bad_lengths(bytes: Vec<u8>, expected: FontError) {
        assert_eq!(RawMetrics::parse(&bytes), Err(expected));
    }

    #[test]
    fn rejects_truncated_files() {
        let bytes = small_font().to_bytes();
        let error = RawMetrics::parse(&bytes[..bytes.len() - 4]).unwrap_err();
        assert_eq!(error, FontError::Truncated("parameters"));
        assert_eq!(
            RawMetrics::parse(&bytes[..1]).unwrap_err(),
            FontError::Truncated("subfile sizes")
        );
    }

    #[test]
    fn rejects_extra_junk() {
        let mut bytes = small_font().to_bytes();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(RawMetrics::parse(&bytes), Err(FontError::ExtraJunk(4)));
    }

    #[test]
    fn rejects_bad_character_range() {
        let mut font = small_font();
        font.bc = 68;
        font.ec = 66;
        font.char_infos.clear();
        let bytes = font.to_bytes();
        assert_eq!(
            RawMetrics::parse(&bytes),
            Err(FontError::BadCharacterRange { bc: 68, ec: 66 })
        );
    }

    #[test]
    fn rejects_small_design_size() {
        let mut font = small_font();
        font.header.design_size = FixWord(1 << 19);
        font.header_words = font.header.to_words();
        assert_eq!(
            RawMetrics::parse(&font.to_bytes()),
            Err(FontError::DesignSizeTooSmall)
        );

        font.header.design_size = FixWord(-(1 << 20));
        font.header_words = font.header.to_words();
        assert_eq!(
            RawMetrics::parse(&font.to_bytes()),
            Err(FontError::DesignSizeNegative)
        );
    }

    #[test_case(Table::Width ; "width")]
    #[test_case(Table::Kern ; "kern")]
    #[test_case(Table::Param ; "param")]
    fn rejects_big_dimensions(table: Table) {
        let mut font = small_font();
        let big = FixWord::from_int(16);
        match table {
            Table::Width => font.widths[1] = big,
            Table::Kern => font.kerns.push(big),
            _ => font.params[2] = big,
        }
        let index = match table {
            Table::Kern => 0,
            Table::Param => 2,
            _ => 1,
        };
        assert_eq!(
            RawMetrics::parse(&font.to_bytes()),
            Err(FontError::DimensionTooBig { table, index })
        );
    }

    #[test]
    fn slant_may_be_big() {
        let mut font = small_font();
        font.params[0] = FixWord::from_int(100);
        assert!(RawMetrics::parse(&font.to_bytes()).is_ok());
    }

    #[test]
    fn math_symbols_need_22_params() {
        let mut font = small_font();
        font.header.coding_scheme = Some("TEX MATH SYMBOLS".into());
        font.header_words = font.header.to_words();
        assert_eq!(
            RawMetrics::parse(&font.to_bytes()),
            Err(FontError::UnusualParameterCount {
                scheme: "TEX MATH SYMBOLS".into(),
                expected: 22,
                found: 7,
            })
        );

        font.params.resize(22, FixWord::ZERO);
        let decoded = RawMetrics::parse(&font.to_bytes()).unwrap();
        assert_eq!(decoded.kind, FontKind::MathSymbols);
    }

    #[test]
    fn rejects_parentheses_in_strings() {
        let mut font = small_font();
        font.header.family = Some("A(B".into());
        font.header_words = font.header.to_words();
        assert_eq!(
            RawMetrics::parse(&font.to_bytes()),
            Err(FontError::ParenthesisInString("family"))
        );
    }

    #[test]
    fn rejects_overlong_strings() {
        let mut bytes = small_font().to_bytes();
        // The family string starts at word 6 + 2 + 10.
        bytes[18 * 4] = 20;
        assert_eq!(
            RawMetrics::parse(&bytes),
            Err(FontError::StringTooLong {
                field: "family",
                length: 20
            })
        );
    }
}
