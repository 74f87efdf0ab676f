//! The errors that can occur while decoding a font metric file.

use std::{error, fmt};

/// The tables of a font metric file that hold dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Table {
    /// The width table.
    Width,

    /// The height table.
    Height,

    /// The depth table.
    Depth,

    /// The italic correction table.
    Italic,

    /// The kern table.
    Kern,

    /// The parameter table.
    Param,
}

impl fmt::Display for Table {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Table::Width => "width",
            Table::Height => "height",
            Table::Depth => "depth",
            Table::Italic => "italic correction",
            Table::Kern => "kern",
            Table::Param => "parameter",
        };
        write!(fmt, "{}", name)
    }
}

/// Formats a character code the way font tools do, in octal.
struct Octal(u8);

impl fmt::Display for Octal {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "'{:o}", self.0)
    }
}

/// Every reason for which a font metric file can be rejected.
///
/// A font that fails any check is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// The stream ended while reading the given section.
    Truncated(&'static str),

    /// The first byte of the file must be at most 127.
    FirstByteTooLarge(u8),

    /// One of the subfile sizes has its sign bit set.
    NegativeSubfileSize(&'static str),

    /// The file declares fewer than six words.
    FileTooShort(u16),

    /// The header block must hold at least the checksum and the design size.
    HeaderTooShort(u16),

    /// The character range is inconsistent.
    BadCharacterRange {
        /// The smallest character code.
        bc: u16,
        /// The largest character code.
        ec: u16,
    },

    /// One of the width, height, depth and italic tables is empty.
    IncompleteSubfiles(Table),

    /// There are more than 256 extensible recipes.
    TooManyRecipes(u16),

    /// The declared file length does not match the sum of the subfile sizes.
    LengthMismatch {
        /// The length declared in the first word.
        declared: u16,
        /// The length computed from the other words.
        computed: u32,
    },

    /// Some bytes remain after the last table.
    ExtraJunk(usize),

    /// A string in the header is longer than its field.
    StringTooLong {
        /// The header field.
        field: &'static str,
        /// The declared length.
        length: u8,
    },

    /// A string in the header contains a parenthesis.
    ParenthesisInString(&'static str),

    /// A string in the header contains a non printable character.
    NonStandardCharacter {
        /// The header field.
        field: &'static str,
        /// The offending byte.
        byte: u8,
    },

    /// The design size is negative.
    DesignSizeNegative,

    /// The design size is smaller than one point.
    DesignSizeTooSmall,

    /// A dimension is sixteen design sizes or more.
    DimensionTooBig {
        /// The table holding the dimension.
        table: Table,
        /// The index in the table.
        index: usize,
    },

    /// A math font does not have the number of parameters it needs.
    UnusualParameterCount {
        /// The coding scheme of the font.
        scheme: String,
        /// The number of parameters needed.
        expected: usize,
        /// The number of parameters found.
        found: usize,
    },

    /// A character refers to a dimension that does not exist.
    CharIndexOutOfRange {
        /// The character code.
        code: u8,
        /// The table.
        table: Table,
        /// The index found in the character info.
        index: usize,
    },

    /// The lig/kern program of a character starts after the end of the table.
    StartIndexTooLarge(u8),

    /// The left boundary program starts after the end of the table.
    BoundaryAddressTooLarge(usize),

    /// A lig/kern instruction skips past the end of the table.
    SkipsTooFar(usize),

    /// A restart instruction points past the end of the table.
    RestartAddressTooLarge(usize),

    /// A character is used but not present in the font.
    NonexistentCharacter {
        /// What the character is used for.
        usage: &'static str,
        /// The character code.
        code: u8,
    },

    /// A ligature instruction steps over more characters than it keeps.
    BadLigatureOp(usize),

    /// A kern instruction refers to a kern that does not exist.
    KernIndexTooLarge(usize),

    /// A character refers to an extensible recipe that does not exist.
    ExtensibleIndexTooLarge(u8),

    /// A chain of larger characters loops.
    CyclicCharList(u8),
}

impl fmt::Display for FontError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FontError::Truncated(section) => write!(fmt, "the file ends in the {}", section),
            FontError::FirstByteTooLarge(b) => {
                write!(fmt, "the first byte must not exceed 127, found {}", b)
            }
            FontError::NegativeSubfileSize(name) => {
                write!(fmt, "the size of subfile {} is negative", name)
            }
            FontError::FileTooShort(lf) => write!(fmt, "the file is only {} words long", lf),
            FontError::HeaderTooShort(lh) => write!(fmt, "the header length is only {}", lh),
            FontError::BadCharacterRange { bc, ec } => {
                write!(fmt, "the character code range {}..{} is illegal", bc, ec)
            }
            FontError::IncompleteSubfiles(table) => {
                write!(fmt, "the {} table is empty", table)
            }
            FontError::TooManyRecipes(ne) => {
                write!(fmt, "there are {} extensible recipes, at most 256 allowed", ne)
            }
            FontError::LengthMismatch { declared, computed } => write!(
                fmt,
                "the file claims to be {} words long but its subfiles sum to {}",
                declared, computed
            ),
            FontError::ExtraJunk(n) => write!(fmt, "{} bytes of junk after the last table", n),
            FontError::StringTooLong { field, length } => {
                write!(fmt, "the {} string is {} bytes long, too long", field, length)
            }
            FontError::ParenthesisInString(field) => {
                write!(fmt, "the {} string contains a parenthesis", field)
            }
            FontError::NonStandardCharacter { field, byte } => write!(
                fmt,
                "the {} string contains the non standard character {}",
                field, byte
            ),
            FontError::DesignSizeNegative => write!(fmt, "the design size is negative"),
            FontError::DesignSizeTooSmall => write!(fmt, "the design size is too small"),
            FontError::DimensionTooBig { table, index } => {
                write!(fmt, "{} #{} is too big", table, index)
            }
            FontError::UnusualParameterCount {
                scheme,
                expected,
                found,
            } => write!(
                fmt,
                "unusual number of parameters for {}: expected {}, found {}",
                scheme, expected, found
            ),
            FontError::CharIndexOutOfRange { code, table, index } => write!(
                fmt,
                "{} index {} of character {} is out of range",
                table,
                index,
                Octal(*code)
            ),
            FontError::StartIndexTooLarge(code) => write!(
                fmt,
                "the lig/kern program of character {} starts too far",
                Octal(*code)
            ),
            FontError::BoundaryAddressTooLarge(i) => {
                write!(fmt, "the boundary program address {} is too large", i)
            }
            FontError::SkipsTooFar(i) => write!(fmt, "lig/kern step {} skips too far", i),
            FontError::RestartAddressTooLarge(i) => {
                write!(fmt, "lig/kern step {} restarts too far", i)
            }
            FontError::NonexistentCharacter { usage, code } => write!(
                fmt,
                "{} character {} does not exist",
                usage,
                Octal(*code)
            ),
            FontError::BadLigatureOp(i) => write!(fmt, "lig/kern step {} has a bad op", i),
            FontError::KernIndexTooLarge(i) => {
                write!(fmt, "lig/kern step {} uses a kern that does not exist", i)
            }
            FontError::ExtensibleIndexTooLarge(code) => write!(
                fmt,
                "the extensible recipe of character {} does not exist",
                Octal(*code)
            ),
            FontError::CyclicCharList(code) => write!(
                fmt,
                "the list of larger characters of {} is cyclic",
                Octal(*code)
            ),
        }
    }
}

impl error::Error for FontError {}
