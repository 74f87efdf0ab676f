//! This module contains everything that helps us dealing with fonts.
//!
//! Fonts are described by TeX font metric files: [`reader`] decodes them, [`ligkern`] builds
//! their lig/kern programs and [`glyphs`] links everything into a [`GlyphTable`]. A glyph table
//! only knows dimensions relative to the design size; a [`Font`] is a glyph table loaded at a
//! given size, which is what paragraphs are made of.

pub mod errors;
pub mod fixword;
pub mod glyphs;
pub mod ligkern;
pub mod manager;
pub mod reader;
pub mod writer;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::fonts::fixword::FixWord;
use crate::fonts::glyphs::{GlyphRecord, GlyphTable};
use crate::fonts::ligkern::{LigKernEntry, LigatureOp};
use crate::layout::glue::Glue;
use crate::units::Sp;
use crate::Error;

pub use crate::fonts::glyphs::ExtensibleRecipe;

/// The named parameters of a font.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontParam {
    /// Slant per point, unscaled.
    Slant,
    /// Interword space.
    Space,
    /// Interword stretch.
    Stretch,
    /// Interword shrink.
    Shrink,
    /// Height of an x, the `ex` unit.
    XHeight,
    /// The `em` unit.
    Quad,
    /// Additional space after a period.
    ExtraSpace,
    /// Numerator shift of display fractions.
    Num1,
    /// Numerator shift of text fractions.
    Num2,
    /// Numerator shift of text fractions without a bar.
    Num3,
    /// Denominator shift of display fractions.
    Denom1,
    /// Denominator shift of text fractions.
    Denom2,
    /// Superscript shift in display style.
    Sup1,
    /// Superscript shift in text style.
    Sup2,
    /// Superscript shift in cramped styles.
    Sup3,
    /// Subscript shift without superscript.
    Sub1,
    /// Subscript shift with a superscript.
    Sub2,
    /// Superscript baseline below the top of a box.
    SupDrop,
    /// Subscript baseline below the bottom of a box.
    SubDrop,
    /// Size of delimiters in display style.
    Delim1,
    /// Size of delimiters in text style.
    Delim2,
    /// Height of the math axis.
    AxisHeight,
    /// Thickness of fraction bars and radicals.
    DefaultRuleThickness,
    /// Minimum space above a large operator limit.
    BigOpSpacing1,
    /// Minimum space below a large operator limit.
    BigOpSpacing2,
    /// Minimum baseline distance above.
    BigOpSpacing3,
    /// Minimum baseline distance below.
    BigOpSpacing4,
    /// Padding above and below limits.
    BigOpSpacing5,
}

impl FontParam {
    /// The parameter number, as used by `\fontdimen`.
    pub fn number(self) -> usize {
        use FontParam::*;
        match self {
            Slant => 1,
            Space => 2,
            Stretch => 3,
            Shrink => 4,
            XHeight => 5,
            Quad => 6,
            ExtraSpace => 7,
            Num1 | DefaultRuleThickness => 8,
            Num2 | BigOpSpacing1 => 9,
            Num3 | BigOpSpacing2 => 10,
            Denom1 | BigOpSpacing3 => 11,
            Denom2 | BigOpSpacing4 => 12,
            Sup1 | BigOpSpacing5 => 13,
            Sup2 => 14,
            Sup3 => 15,
            Sub1 => 16,
            Sub2 => 17,
            SupDrop => 18,
            SubDrop => 19,
            Delim1 => 20,
            Delim2 => 21,
            AxisHeight => 22,
        }
    }
}

impl FromStr for FontParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<FontParam, Error> {
        use FontParam::*;
        let param = match s.to_ascii_uppercase().as_str() {
            "SLANT" => Slant,
            "SPACE" => Space,
            "STRETCH" => Stretch,
            "SHRINK" => Shrink,
            "XHEIGHT" => XHeight,
            "QUAD" => Quad,
            "EXTRASPACE" => ExtraSpace,
            "NUM1" => Num1,
            "NUM2" => Num2,
            "NUM3" => Num3,
            "DENOM1" => Denom1,
            "DENOM2" => Denom2,
            "SUP1" => Sup1,
            "SUP2" => Sup2,
            "SUP3" => Sup3,
            "SUB1" => Sub1,
            "SUB2" => Sub2,
            "SUPDROP" => SupDrop,
            "SUBDROP" => SubDrop,
            "DELIM1" => Delim1,
            "DELIM2" => Delim2,
            "AXISHEIGHT" => AxisHeight,
            "DEFAULTRULETHICKNESS" => DefaultRuleThickness,
            "BIGOPSPACING1" => BigOpSpacing1,
            "BIGOPSPACING2" => BigOpSpacing2,
            "BIGOPSPACING3" => BigOpSpacing3,
            "BIGOPSPACING4" => BigOpSpacing4,
            "BIGOPSPACING5" => BigOpSpacing5,
            _ => return Err(Error::UnknownFontParam(s.to_owned())),
        };
        Ok(param)
    }
}

/// Maps character codes to glyph names.
pub trait EncodingTable: Send + Sync + fmt::Debug {
    /// The name of the glyph of a character.
    fn glyph_name(&self, code: u8) -> Option<&str>;
}

/// An encoding given as a list of names, one per code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingVector(pub Vec<String>);

impl EncodingTable for EncodingVector {
    fn glyph_name(&self, code: u8) -> Option<&str> {
        self.0
            .get(code as usize)
            .map(String::as_str)
            .filter(|name| *name != ".notdef")
    }
}

/// What a font map says about a font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontMapEntry {
    /// The name of the metric file.
    pub metric_name: String,

    /// The PostScript name of the font.
    pub ps_name: Option<String>,

    /// The file holding the glyph outlines.
    pub glyph_file: Option<PathBuf>,

    /// The file holding the encoding.
    pub encoding_file: Option<PathBuf>,
}

/// How a font is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// The name of the metric file, without extension.
    pub name: String,

    /// The magnification, in thousandths; `None` and zero mean no magnification.
    pub scale: Option<i32>,

    /// The requested size; `None` means the design size.
    pub size: Option<Sp>,

    /// Whether ligatures are formed.
    pub ligatures: bool,

    /// Whether kerns are inserted.
    pub kerning: bool,
}

impl FontKey {
    /// A key loading a font at its design size.
    pub fn new(name: &str) -> FontKey {
        FontKey {
            name: name.to_owned(),
            scale: None,
            size: None,
            ligatures: true,
            kerning: true,
        }
    }

    /// Requests a size.
    pub fn at(mut self, size: Sp) -> FontKey {
        self.size = Some(size);
        self
    }

    /// Requests a magnification.
    pub fn scaled(mut self, scale: i32) -> FontKey {
        self.scale = Some(scale);
        self
    }
}

/// The dimensions of a character at the size of a font.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScaledGlyph {
    /// The character code.
    pub code: u8,

    /// Whether the font has the character. Missing characters have zero dimensions.
    pub exists: bool,

    /// The width.
    pub width: Sp,

    /// The height.
    pub height: Sp,

    /// The depth.
    pub depth: Sp,

    /// The italic correction.
    pub italic: Sp,
}

/// An instruction of a lig/kern program, at the size of a font.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LigKernStep {
    /// A kern before `next_char`.
    Kern {
        /// The character that triggers the kern.
        next_char: u8,
        /// The kern.
        amount: Sp,
    },

    /// A ligature with `next_char`.
    Ligature {
        /// The character that triggers the ligature.
        next_char: u8,
        /// The ligature character.
        lig_char: u8,
        /// What happens to the surrounding characters.
        op: LigatureOp,
    },
}

impl LigKernStep {
    /// The character that triggers the step.
    pub fn next_char(&self) -> u8 {
        match *self {
            LigKernStep::Kern { next_char, .. } | LigKernStep::Ligature { next_char, .. } => {
                next_char
            }
        }
    }
}

/// A glyph table loaded at a given size.
#[derive(Debug, Clone)]
pub struct Font {
    table: Arc<GlyphTable>,
    key: FontKey,
    actual_size: Sp,
    encoding: Option<Arc<dyn EncodingTable>>,
    map_entry: Option<FontMapEntry>,
}

impl Font {
    /// Loads a glyph table at the size requested by a key.
    pub fn new(table: Arc<GlyphTable>, key: FontKey) -> Font {
        let scale = match key.scale {
            None | Some(0) => 1000,
            Some(s) => s as i64,
        };
        let base = key.size.unwrap_or_else(|| table.design_size().to_sp());

        Font {
            actual_size: Sp(base.0 * scale / 1000),
            table,
            key,
            encoding: None,
            map_entry: None,
        }
    }

    /// Attaches an encoding.
    pub fn with_encoding(mut self, encoding: Arc<dyn EncodingTable>) -> Font {
        self.encoding = Some(encoding);
        self
    }

    /// Attaches a font map entry.
    pub fn with_map_entry(mut self, entry: FontMapEntry) -> Font {
        self.map_entry = Some(entry);
        self
    }

    /// The key the font was loaded with.
    pub fn key(&self) -> &FontKey {
        &self.key
    }

    /// The underlying glyph table.
    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    /// The checksum of the metric file.
    pub fn checksum(&self) -> u32 {
        self.table.checksum()
    }

    /// The design size.
    pub fn design_size(&self) -> Sp {
        self.table.design_size().to_sp()
    }

    /// The size the font is used at.
    pub fn actual_size(&self) -> Sp {
        self.actual_size
    }

    /// Converts a dimension relative to the design size.
    pub fn scale(&self, value: FixWord) -> Sp {
        value.scale(self.actual_size)
    }

    /// Returns a parameter by number; missing parameters are zero.
    ///
    /// The slant is a pure number and is returned with sixteen fractional bits, unscaled.
    pub fn param_number(&self, number: usize) -> Sp {
        match self.table.param(number) {
            Some(value) if number == 1 => Sp(value.0 >> 4),
            Some(value) => self.scale(value),
            None => Sp(0),
        }
    }

    /// Returns a named parameter; missing parameters are zero.
    pub fn param(&self, param: FontParam) -> Sp {
        self.param_number(param.number())
    }

    /// The interword glue.
    ///
    /// Fonts without a space parameter get rigid glue as wide as the font size.
    pub fn space(&self) -> Glue {
        if self.table.param(FontParam::Space.number()).is_some() {
            Glue::new(
                self.param(FontParam::Space),
                self.param(FontParam::Stretch),
                self.param(FontParam::Shrink),
            )
        } else {
            Glue::natural(self.actual_size)
        }
    }

    /// The `ex` unit.
    pub fn ex(&self) -> Sp {
        self.param(FontParam::XHeight)
    }

    /// The `em` unit.
    pub fn em(&self) -> Sp {
        self.param(FontParam::Quad)
    }

    /// Whether the font has a character.
    pub fn exists(&self, code: u8) -> bool {
        self.table.exists(code)
    }

    /// The dimensions of a character; characters the font lacks have zero dimensions.
    pub fn glyph(&self, code: u8) -> ScaledGlyph {
        match self.table.get(code) {
            Some(record) => self.scaled(code, record),
            None => ScaledGlyph {
                code,
                exists: false,
                width: Sp(0),
                height: Sp(0),
                depth: Sp(0),
                italic: Sp(0),
            },
        }
    }

    fn scaled(&self, code: u8, record: &GlyphRecord) -> ScaledGlyph {
        ScaledGlyph {
            code,
            exists: true,
            width: self.scale(record.width),
            height: self.scale(record.height),
            depth: self.scale(record.depth),
            italic: self.scale(record.italic),
        }
    }

    /// The next larger character, for delimiters.
    pub fn next_larger(&self, code: u8) -> Option<u8> {
        self.table.get(code).and_then(|g| g.next_larger)
    }

    /// The recipe of an extensible character.
    pub fn extensible(&self, code: u8) -> Option<ExtensibleRecipe> {
        self.table.get(code).and_then(|g| g.extensible)
    }

    fn step(&self, entry: &LigKernEntry) -> Option<LigKernStep> {
        match *entry {
            LigKernEntry::Kern {
                next_char, kern, ..
            } if self.key.kerning => Some(LigKernStep::Kern {
                next_char,
                amount: self.scale(kern),
            }),
            LigKernEntry::Ligature {
                next_char,
                lig_char,
                op,
                ..
            } if self.key.ligatures => Some(LigKernStep::Ligature {
                next_char,
                lig_char,
                op,
            }),
            _ => None,
        }
    }

    /// The lig/kern program of a character, scaled, without the disabled kinds of steps.
    pub fn lig_kern(&self, code: u8) -> Vec<LigKernStep> {
        self.table
            .lig_kern_program(code)
            .filter_map(|entry| self.step(entry))
            .collect()
    }

    /// Finds what happens between two characters.
    ///
    /// `None` stands for a word boundary: on the left it selects the boundary program, on the
    /// right it stands for the boundary character.
    pub fn lookup(&self, left: Option<u8>, right: Option<u8>) -> Option<LigKernStep> {
        let right = right.or_else(|| self.table.boundary_char())?;
        let program = match left {
            Some(code) => self.table.lig_kern_program(code),
            None => self.table.left_boundary_program(),
        };
        program
            .filter_map(|entry| self.step(entry))
            .find(|step| step.next_char() == right)
    }

    /// The boundary character of the font.
    pub fn boundary_char(&self) -> Option<u8> {
        self.table.boundary_char()
    }

    /// The character used for automatic hyphens, if the font has one.
    pub fn hyphen_char(&self) -> Option<u8> {
        Some(b'-').filter(|&c| self.exists(c))
    }

    /// The name of the glyph of a character, if an encoding is attached.
    pub fn glyph_name(&self, code: u8) -> Option<&str> {
        self.encoding.as_ref().and_then(|e| e.glyph_name(code))
    }

    /// The file holding the glyph outlines, if a font map entry is attached.
    pub fn glyph_file(&self) -> Option<&PathBuf> {
        self.map_entry.as_ref().and_then(|e| e.glyph_file.as_ref())
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fonts::reader::tests::small_font;
    use crate::fonts::reader::{CharTag, RawCharInfo, RawLigKern, RawMetrics};
    use test_case::test_case;

    /// A text font with the lowercase letters, a hyphen, a space of 1/3 em, and the ligature
    /// "fi" (code 12) and the kern "av".
    pub fn text_metrics() -> RawMetrics {
        let mut raw = small_font();
        raw.bc = 0;
        raw.ec = 127;
        raw.char_infos = vec![RawCharInfo::MISSING; 128];
        // Widths: 0, 0.5, 0.25, 0.3333, 0.55
        raw.widths = vec![
            FixWord::ZERO,
            FixWord(1 << 19),
            FixWord(1 << 18),
            FixWord(349_525),
            FixWord(576_716),
        ];
        for code in b'a'..=b'z' {
            raw.char_infos[code as usize] = RawCharInfo {
                width_index: 1,
                height_index: 1,
                ..RawCharInfo::MISSING
            };
        }
        raw.char_infos[b'i' as usize].width_index = 2;
        raw.char_infos[b'-' as usize] = RawCharInfo {
            width_index: 3,
            ..RawCharInfo::MISSING
        };
        raw.char_infos[12] = RawCharInfo {
            width_index: 4,
            height_index: 1,
            ..RawCharInfo::MISSING
        };

        raw.char_infos[b'f' as usize].tag = CharTag::LigKern;
        raw.char_infos[b'f' as usize].remainder = 0;
        raw.char_infos[b'a' as usize].tag = CharTag::LigKern;
        raw.char_infos[b'a' as usize].remainder = 1;
        raw.lig_kern = vec![
            RawLigKern::from_bytes([128, b'i', 0, 12]),
            RawLigKern::from_bytes([128, b'v', 128, 0]),
        ];
        raw.kerns = vec![FixWord(-(1 << 16))];

        // Slant, space, stretch, shrink, x-height, quad, extra space.
        raw.params = vec![
            FixWord(1 << 16),
            FixWord(349_525),
            FixWord(174_763),
            FixWord(116_508),
            FixWord(450_000),
            FixWord(1 << 20),
            FixWord(116_508),
        ];
        raw
    }

    /// The test font at ten points.
    pub fn text_font() -> Font {
        let table = GlyphTable::from_raw(text_metrics()).unwrap();
        Font::new(Arc::new(table), FontKey::new("test"))
    }

    #[test]
    fn actual_size() {
        let table = Arc::new(GlyphTable::from_raw(text_metrics()).unwrap());
        let at_design = Font::new(table.clone(), FontKey::new("test"));
        assert_eq!(at_design.actual_size(), Sp::pt(10));

        let magnified = Font::new(table.clone(), FontKey::new("test").scaled(2000));
        assert_eq!(magnified.actual_size(), Sp::pt(20));

        let zero_scale = Font::new(table.clone(), FontKey::new("test").scaled(0));
        assert_eq!(zero_scale.actual_size(), Sp::pt(10));

        let sized = Font::new(table, FontKey::new("test").at(Sp::pt(12)).scaled(500));
        assert_eq!(sized.actual_size(), Sp::pt(6));
    }

    #[test]
    fn glyph_dimensions() {
        let font = text_font();
        assert_eq!(font.glyph(b'a').width, Sp::pt(5));
        assert_eq!(font.glyph(b'i').width, Sp(163_840));
        assert!(font.glyph(b'a').exists);

        let missing = font.glyph(b'A');
        assert!(!missing.exists);
        assert_eq!(missing.width, Sp(0));
    }

    #[test_case(FontParam::Space, Sp(218_453) ; "space")]
    #[test_case(FontParam::Quad, Sp::pt(10) ; "quad")]
    #[test_case(FontParam::Slant, Sp(4096) ; "slant is unscaled")]
    #[test_case(FontParam::AxisHeight, Sp(0) ; "missing is zero")]
    fn params(param: FontParam, expected: Sp) {
        assert_eq!(text_font().param(param), expected);
    }

    #[test]
    fn param_names() {
        assert_eq!("xheight".parse::<FontParam>().unwrap(), FontParam::XHeight);
        assert_eq!(
            "BIGOPSPACING5".parse::<FontParam>().unwrap().number(),
            13
        );
        assert!("WIDTH".parse::<FontParam>().is_err());
    }

    #[test]
    fn space_glue() {
        let font = text_font();
        assert_eq!(
            font.space(),
            Glue::new(Sp(218_453), Sp(109_226), Sp(72_817))
        );

        let mut raw = text_metrics();
        raw.params.truncate(1);
        let bare = Font::new(
            Arc::new(GlyphTable::from_raw(raw).unwrap()),
            FontKey::new("bare"),
        );
        assert_eq!(bare.space(), Glue::natural(Sp::pt(10)));
    }

    #[test]
    fn lig_kern_toggles() {
        let font = text_font();
        assert!(matches!(
            font.lookup(Some(b'f'), Some(b'i')),
            Some(LigKernStep::Ligature { lig_char: 12, .. })
        ));
        assert_eq!(
            font.lookup(Some(b'a'), Some(b'v')),
            Some(LigKernStep::Kern {
                next_char: b'v',
                amount: Sp(-40_960)
            })
        );
        assert_eq!(font.lookup(Some(b'a'), None), None);

        let table = Arc::new(GlyphTable::from_raw(text_metrics()).unwrap());
        let mut key = FontKey::new("test");
        key.ligatures = false;
        let plain = Font::new(table, key);
        assert_eq!(plain.lookup(Some(b'f'), Some(b'i')), None);
        assert_eq!(plain.lig_kern(b'a').len(), 1);
        assert!(plain.lig_kern(b'f').is_empty());
    }

    #[test]
    fn kern_behind_a_disabled_ligature() {
        let mut raw = text_metrics();
        raw.char_infos[b'a' as usize].remainder = 2;
        raw.lig_kern = vec![
            RawLigKern::from_bytes([0, b'i', 0, 12]),
            RawLigKern::from_bytes([128, b'i', 128, 0]),
            RawLigKern::from_bytes([128, b'v', 128, 0]),
        ];
        let table = Arc::new(GlyphTable::from_raw(raw).unwrap());

        let font = Font::new(table.clone(), FontKey::new("test"));
        assert!(matches!(
            font.lookup(Some(b'f'), Some(b'i')),
            Some(LigKernStep::Ligature { lig_char: 12, .. })
        ));

        let mut key = FontKey::new("test");
        key.ligatures = false;
        let plain = Font::new(table, key);
        let kern = Some(LigKernStep::Kern {
            next_char: b'i',
            amount: Sp(-40_960),
        });
        assert_eq!(plain.lookup(Some(b'f'), Some(b'i')), kern);
        assert_eq!(plain.lig_kern(b'f'), vec![kern.unwrap()]);
    }

    #[test]
    fn collaborators() {
        let mut names = vec![".notdef".to_owned(); 128];
        names[b'a' as usize] = "a".to_owned();
        let entry = FontMapEntry {
            metric_name: "test".into(),
            glyph_file: Some(PathBuf::from("test.pfb")),
            ..FontMapEntry::default()
        };
        let font = text_font()
            .with_encoding(Arc::new(EncodingVector(names)))
            .with_map_entry(entry);
        assert_eq!(font.glyph_name(b'a'), Some("a"));
        assert_eq!(font.glyph_name(b'b'), None);
        assert_eq!(font.glyph_file(), Some(&PathBuf::from("test.pfb")));
        assert_eq!(font.hyphen_char(), Some(b'-'));
    }
}
