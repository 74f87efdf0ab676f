//! Glue: space that can stretch and shrink.

use std::fmt;
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{multispace0, multispace1};
use nom::combinator::{all_consuming, map, opt};
use nom::sequence::{delimited, preceded};
use nom::IResult;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::units::{parse_decimal, parse_dimension, Pt, Sp};
use crate::Error;

/// The order of infinity of a stretch or shrink component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlueOrder {
    /// Finite.
    Normal,

    /// First order infinity.
    Fil,

    /// Second order infinity.
    Fill,

    /// Third order infinity.
    Filll,
}

impl GlueOrder {
    /// All orders, from finite to most infinite.
    pub const ALL: [GlueOrder; 4] = [
        GlueOrder::Normal,
        GlueOrder::Fil,
        GlueOrder::Fill,
        GlueOrder::Filll,
    ];

    /// Position of the order in [`GlueOrder::ALL`].
    pub fn index(self) -> usize {
        match self {
            GlueOrder::Normal => 0,
            GlueOrder::Fil => 1,
            GlueOrder::Fill => 2,
            GlueOrder::Filll => 3,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            GlueOrder::Normal => "pt",
            GlueOrder::Fil => "fil",
            GlueOrder::Fill => "fill",
            GlueOrder::Filll => "filll",
        }
    }
}

impl Default for GlueOrder {
    fn default() -> GlueOrder {
        GlueOrder::Normal
    }
}

/// A glue specification.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Glue {
    /// The natural width.
    pub width: Sp,

    /// How much the glue can stretch.
    pub stretch: Sp,

    /// The order of the stretch.
    pub stretch_order: GlueOrder,

    /// How much the glue can shrink.
    pub shrink: Sp,

    /// The order of the shrink.
    pub shrink_order: GlueOrder,
}

impl Glue {
    /// Glue of zero size that cannot stretch or shrink.
    pub const ZERO: Glue = Glue {
        width: Sp(0),
        stretch: Sp(0),
        stretch_order: GlueOrder::Normal,
        shrink: Sp(0),
        shrink_order: GlueOrder::Normal,
    };

    /// Creates glue with finite stretch and shrink.
    pub fn new(width: Sp, stretch: Sp, shrink: Sp) -> Glue {
        Glue {
            width,
            stretch,
            shrink,
            ..Glue::ZERO
        }
    }

    /// Creates rigid glue.
    pub fn natural(width: Sp) -> Glue {
        Glue::new(width, Sp(0), Sp(0))
    }

    /// Creates glue that stretches infinitely, like `\hfil`.
    pub fn fil(width: Sp, stretch: Sp, order: GlueOrder) -> Glue {
        Glue {
            width,
            stretch,
            stretch_order: order,
            ..Glue::ZERO
        }
    }

    /// Whether the glue has no width, stretch nor shrink.
    pub fn is_zero(&self) -> bool {
        self.width.is_zero() && self.stretch.is_zero() && self.shrink.is_zero()
    }
}

fn write_component(fmt: &mut fmt::Formatter, amount: Sp, order: GlueOrder) -> fmt::Result {
    let printed = amount.to_string();
    match order {
        GlueOrder::Normal => write!(fmt, "{}", printed),
        _ => write!(fmt, "{}{}", printed.trim_end_matches("pt"), order.suffix()),
    }
}

impl fmt::Display for Glue {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.width)?;
        if !self.stretch.is_zero() {
            write!(fmt, " plus ")?;
            write_component(fmt, self.stretch, self.stretch_order)?;
        }
        if !self.shrink.is_zero() {
            write!(fmt, " minus ")?;
            write_component(fmt, self.shrink, self.shrink_order)?;
        }
        Ok(())
    }
}

/// Parses an infinite amount such as `1fil` or `-2fill`.
fn parse_infinite(input: &str) -> IResult<&str, (Sp, GlueOrder)> {
    let (input, value) = parse_decimal(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("fi")(input)?;
    let (input, ls) = take_while1(|c: char| c == 'l')(input)?;
    let order = match ls.len() {
        1 => GlueOrder::Fil,
        2 => GlueOrder::Fill,
        3 => GlueOrder::Filll,
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::TooLarge,
            )))
        }
    };
    Ok((input, (Sp::from(Pt(value)), order)))
}

fn parse_component(input: &str) -> IResult<&str, (Sp, GlueOrder)> {
    alt((
        parse_infinite,
        map(parse_dimension, |sp| (sp, GlueOrder::Normal)),
    ))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    delimited(multispace1, tag(word), multispace1)
}

/// Parses a glue specification such as `3pt plus 1fil minus 2pt`.
pub fn parse_glue(input: &str) -> IResult<&str, Glue> {
    let (input, width) = parse_dimension(input)?;
    let (input, stretch) = opt(preceded(keyword("plus"), parse_component))(input)?;
    let (input, shrink) = opt(preceded(keyword("minus"), parse_component))(input)?;

    let (stretch, stretch_order) = stretch.unwrap_or((Sp(0), GlueOrder::Normal));
    let (shrink, shrink_order) = shrink.unwrap_or((Sp(0), GlueOrder::Normal));

    Ok((
        input,
        Glue {
            width,
            stretch,
            stretch_order,
            shrink,
            shrink_order,
        },
    ))
}

impl FromStr for Glue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Glue, Error> {
        match all_consuming(delimited(multispace0, parse_glue, multispace0))(s) {
            Ok((_, glue)) => Ok(glue),
            Err(_) => Err(Error::InvalidDimension(s.to_owned())),
        }
    }
}

impl Serialize for Glue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct GlueVisitor;

impl<'a> Visitor<'a> for GlueVisitor {
    type Value = Glue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a glue specification like \"3pt plus 1fil minus 1pt\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Glue, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Glue, E> {
        Ok(Glue::natural(Sp::from(Pt(value as f64))))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Glue, E> {
        Ok(Glue::natural(Sp::from(Pt(value as f64))))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Glue, E> {
        Ok(Glue::natural(Sp::from(Pt(value))))
    }
}

impl<'a> Deserialize<'a> for Glue {
    fn deserialize<D: Deserializer<'a>>(deserializer: D) -> Result<Glue, D::Error> {
        deserializer.deserialize_any(GlueVisitor)
    }
}
