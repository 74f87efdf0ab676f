//! Dimensions in scaled points, printed and parsed the way TeX does it.
//!
//! Physical units are converted with 1 in = 72.27 pt = 2.54 cm, and 1 pt = 65,536 sp.
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, Neg, Rem, Sub, SubAssign};
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit0, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::sequence::{delimited, pair, tuple};
use nom::IResult;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Scaled point, equal to 1/65,536 of a point.
///
/// Defining this unit is useful because the wavelength of visible light is around 100 sp. This
/// makes rounding errors invisible to the eye, which allows to perform uniquely integer
/// arithmetics by treating all dimensions as integer multiples of this tiny unit. This ensures
/// consistent computations, and thus output, across a wide variety of computers.
#[derive(Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sp(pub i64);

/// Points.
#[derive(Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pt(pub f64);

/// The number of scaled points in a point.
pub const UNITY: i64 = 65_536;

impl Sp {
    /// The zero dimension.
    pub const ZERO: Sp = Sp(0);

    /// The largest dimension TeX can represent, `\maxdimen`.
    pub const MAX_DIMEN: Sp = Sp(0x3FFF_FFFF);

    /// Returns a dimension of a whole number of points.
    pub const fn pt(points: i64) -> Sp {
        Sp(points * UNITY)
    }

    /// Returns the absolute value of the dimension.
    pub fn abs(self) -> Sp {
        Sp(self.0.abs())
    }

    /// Returns true if the dimension is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Sp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} sp", self.0)
    }
}

/// Prints the dimension the way TeX prints scaled values: the shortest decimal
/// expansion that reads back as the same number of scaled points.
impl fmt::Display for Sp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = self.0;
        if s < 0 {
            write!(f, "-")?;
            s = -s;
        }
        write!(f, "{}.", s / UNITY)?;

        s = 10 * (s % UNITY) + 5;
        let mut delta = 10;
        loop {
            if delta > UNITY {
                s += 0x8000 - 50_000;
            }
            write!(f, "{}", s / UNITY)?;
            s = 10 * (s % UNITY);
            delta *= 10;
            if s <= delta {
                break;
            }
        }

        write!(f, "pt")
    }
}

impl fmt::Debug for Pt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} pt", self.0)
    }
}

macro_rules! impl_operators {
    ($the_type: ty, $constructor: expr) => {
        impl Add for $the_type {
            type Output = $the_type;

            fn add(self, other: $the_type) -> $the_type {
                $constructor(self.0 + other.0)
            }
        }

        impl AddAssign for $the_type {
            fn add_assign(&mut self, other: $the_type) {
                self.0 += other.0;
            }
        }

        impl Sub for $the_type {
            type Output = $the_type;

            fn sub(self, other: $the_type) -> $the_type {
                $constructor(self.0 - other.0)
            }
        }

        impl SubAssign for $the_type {
            fn sub_assign(&mut self, other: $the_type) {
                self.0 -= other.0;
            }
        }

        impl Neg for $the_type {
            type Output = $the_type;

            fn neg(self) -> $the_type {
                $constructor(-self.0)
            }
        }

        impl Rem for $the_type {
            type Output = $the_type;

            fn rem(self, other: $the_type) -> $the_type {
                $constructor(self.0 % other.0)
            }
        }
    };
}

impl_operators!(Sp, Sp);

impl Mul<i64> for Sp {
    type Output = Sp;

    fn mul(self, rhs: i64) -> Sp {
        Sp(self.0 * rhs)
    }
}

impl Mul<Sp> for i64 {
    type Output = Sp;

    fn mul(self, rhs: Sp) -> Sp {
        Sp(self * rhs.0)
    }
}

impl Div<i64> for Sp {
    type Output = Sp;

    fn div(self, rhs: i64) -> Sp {
        Sp(self.0 / rhs)
    }
}

impl DivAssign<i64> for Sp {
    fn div_assign(&mut self, rhs: i64) {
        self.0 /= rhs;
    }
}

impl PartialOrd for Sp {
    fn partial_cmp(&self, other: &Sp) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sp {
    fn cmp(&self, other: &Sp) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<Pt> for Sp {
    fn from(pt: Pt) -> Sp {
        Sp((65_536.0 * pt.0).round() as i64)
    }
}

/// Parses a decimal number with an optional sign, such as `-12.5` or `.25`.
pub fn parse_decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

/// Parses a physical unit and returns how many points it is worth.
///
/// Scaled points are handled separately since they are not rounded.
fn parse_unit(input: &str) -> IResult<&str, f64> {
    alt((
        map(tag("pt"), |_| 1.0),
        map(tag("in"), |_| 72.27),
        map(tag("mm"), |_| 72.27 / 25.4),
        map(tag("cm"), |_| 72.27 / 2.54),
        map(tag("bp"), |_| 72.27 / 72.0),
        map(tag("pc"), |_| 12.0),
        map(tag("dd"), |_| 1238.0 / 1157.0),
        map(tag("cc"), |_| 12.0 * 1238.0 / 1157.0),
    ))(input)
}

/// Parses a dimension such as `12pt`, `-0.5 in` or `300sp`.
pub fn parse_dimension(input: &str) -> IResult<&str, Sp> {
    let (input, value) = parse_decimal(input)?;
    let (input, _) = multispace0(input)?;
    alt((
        map(tag("sp"), move |_| Sp(value.round() as i64)),
        map(parse_unit, move |factor| Sp::from(Pt(value * factor))),
    ))(input)
}

impl FromStr for Sp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Sp, Error> {
        match all_consuming(delimited(multispace0, parse_dimension, multispace0))(s) {
            Ok((_, sp)) => Ok(sp),
            Err(_) => Err(Error::InvalidDimension(s.to_owned())),
        }
    }
}
