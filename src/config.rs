//! The parameters of the paragraph builder.
//!
//! Options are read from TOML files. Keys can be given with their Rust names or with the names
//! of the corresponding TeX parameters, dimensions either as numbers of points or as strings
//! with a unit, and glue as strings like `"0pt plus 1fil"`.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fmt, result};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::layout::glue::{Glue, GlueOrder};
use crate::units::{Pt, Sp};
use crate::Result;

/// Serializes a dimension as a string with a unit.
pub fn serialize_sp<S: Serializer>(sp: &Sp, serializer: S) -> result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&sp.to_string())
}

macro_rules! visit {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Sp::from(Pt(value as f64)))
        }
    };
}

/// Reads a dimension from a number of points or from a string with a unit.
pub struct SpVisitor;

impl<'a> Visitor<'a> for SpVisitor {
    type Value = Sp;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number of points or a dimension like \"6.5in\"")
    }

    visit!(visit_u8, u8);
    visit!(visit_u16, u16);
    visit!(visit_u32, u32);
    visit!(visit_u64, u64);
    visit!(visit_i8, i8);
    visit!(visit_i16, i16);
    visit!(visit_i32, i32);
    visit!(visit_i64, i64);
    visit!(visit_f32, f32);
    visit!(visit_f64, f64);

    fn visit_str<E: de::Error>(self, value: &str) -> result::Result<Sp, E> {
        value.parse().map_err(E::custom)
    }
}

/// Deserializes a dimension.
pub fn deserialize_sp<'a, D: Deserializer<'a>>(deserializer: D) -> result::Result<Sp, D::Error> {
    deserializer.deserialize_any(SpVisitor)
}

/// The indentation and width of one line of a paragraph shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParShapeLine {
    /// How far the line is moved right.
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub indent: Sp,

    /// The width of the line.
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub width: Sp,
}

/// Everything the paragraph builder needs to know, with the values of plain TeX by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesettingOptions {
    /// Badness tolerance of the first pass, negative to skip it.
    pub pretolerance: i32,

    /// Badness tolerance of the second and emergency passes.
    pub tolerance: i32,

    /// Added to the badness of every line.
    #[serde(alias = "linepenalty")]
    pub line_penalty: i32,

    /// Penalty of breaking at a discretionary with a pre-break text.
    #[serde(alias = "hyphenpenalty")]
    pub hyphen_penalty: i32,

    /// Penalty of breaking at an empty discretionary.
    #[serde(alias = "exhyphenpenalty")]
    pub ex_hyphen_penalty: i32,

    /// Demerits of consecutive lines of non adjacent fitness classes.
    #[serde(alias = "adjdemerits")]
    pub adj_demerits: i32,

    /// Demerits of consecutive lines ending with hyphens.
    #[serde(alias = "doublehyphendemerits")]
    pub double_hyphen_demerits: i32,

    /// Demerits of a second last line ending with a hyphen.
    #[serde(alias = "finalhyphendemerits")]
    pub final_hyphen_demerits: i32,

    /// Penalty of breaking a page after the first line.
    #[serde(alias = "clubpenalty")]
    pub club_penalty: i32,

    /// Penalty of breaking a page before the last line.
    #[serde(alias = "widowpenalty")]
    pub widow_penalty: i32,

    /// Penalty of breaking a page before the last line preceding a display.
    #[serde(alias = "displaywidowpenalty")]
    pub display_widow_penalty: i32,

    /// Penalty of breaking a page after a line ending with a hyphen.
    #[serde(alias = "brokenpenalty")]
    pub broken_penalty: i32,

    /// Penalty of breaking a page between any two lines.
    #[serde(alias = "interlinepenalty")]
    pub inter_line_penalty: i32,

    /// How many more lines than optimal the paragraph should have.
    pub looseness: i32,

    /// Stretch added to every line on the emergency pass.
    #[serde(alias = "emergencystretch")]
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub emergency_stretch: Sp,

    /// Glue ending the last line.
    #[serde(alias = "parfillskip")]
    pub par_fill_skip: Glue,

    /// Glue starting every line.
    #[serde(alias = "leftskip")]
    pub left_skip: Glue,

    /// Glue ending every line.
    #[serde(alias = "rightskip")]
    pub right_skip: Glue,

    /// The width of lines.
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub hsize: Sp,

    /// Where hanging indentation starts or stops.
    #[serde(alias = "hangafter")]
    pub hang_after: i32,

    /// The hanging indentation, on the right when negative.
    #[serde(alias = "hangindent")]
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub hang_indent: Sp,

    /// Minimum number of letters before a hyphen.
    #[serde(alias = "lefthyphenmin")]
    pub left_hyphen_min: usize,

    /// Minimum number of letters after a hyphen.
    #[serde(alias = "righthyphenmin")]
    pub right_hyphen_min: usize,

    /// Badness above which underfull and tight lines are reported.
    pub hbadness: i32,

    /// How much a line can be overfull without being reported.
    #[serde(serialize_with = "serialize_sp")]
    #[serde(deserialize_with = "deserialize_sp")]
    pub hfuzz: Sp,

    /// The number of lines already typeset in the current paragraph; updated after breaking.
    #[serde(alias = "prevgraf")]
    pub prev_graf: usize,

    /// Whether the decisions of the paragraph builder are traced.
    #[serde(alias = "tracingparagraphs")]
    pub tracing_paragraphs: i32,

    /// Explicit shape of the lines, overriding the hanging indentation when not empty.
    #[serde(alias = "parshape")]
    pub par_shape: Vec<ParShapeLine>,
}

impl Default for TypesettingOptions {
    fn default() -> TypesettingOptions {
        TypesettingOptions {
            pretolerance: 100,
            tolerance: 200,
            line_penalty: 10,
            hyphen_penalty: 50,
            ex_hyphen_penalty: 50,
            adj_demerits: 10_000,
            double_hyphen_demerits: 10_000,
            final_hyphen_demerits: 5_000,
            club_penalty: 150,
            widow_penalty: 150,
            display_widow_penalty: 50,
            broken_penalty: 100,
            inter_line_penalty: 0,
            looseness: 0,
            emergency_stretch: Sp(0),
            par_fill_skip: Glue::fil(Sp(0), Sp::pt(1), GlueOrder::Fil),
            left_skip: Glue::ZERO,
            right_skip: Glue::ZERO,
            // 6.5in
            hsize: Sp(30_785_863),
            hang_after: 1,
            hang_indent: Sp(0),
            left_hyphen_min: 2,
            right_hyphen_min: 3,
            hbadness: 1000,
            // 0.1pt
            hfuzz: Sp(6554),
            prev_graf: 0,
            tracing_paragraphs: 0,
            par_shape: vec![],
        }
    }
}

impl TypesettingOptions {
    /// Parses options from TOML; missing keys keep their default value.
    pub fn from_toml(content: &str) -> Result<TypesettingOptions> {
        Ok(toml::from_str(content)?)
    }

    /// Reads options from a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<TypesettingOptions> {
        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;
        TypesettingOptions::from_toml(&content)
    }
}
