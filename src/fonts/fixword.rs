//! Fixed point numbers as stored in font metric files.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::units::Sp;

/// A fixed point number with 20 fractional bits.
///
/// On disk a fix word is a signed 32 bit integer, so values lie in `(-2048, 2048)`; the wider
/// representation lets intermediate results overflow that range without wrapping.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixWord(pub i64);

impl FixWord {
    /// The number of fractional bits.
    pub const FRACTION_BITS: u32 = 20;

    /// Zero.
    pub const ZERO: FixWord = FixWord(0);

    /// One, which for dimensions means one design size.
    pub const UNITY: FixWord = FixWord(1 << 20);

    /// Creates a fix word from an integer.
    pub const fn from_int(n: i64) -> FixWord {
        FixWord(n << Self::FRACTION_BITS)
    }

    /// Decodes a raw on-disk word.
    pub const fn from_raw(raw: i32) -> FixWord {
        FixWord(raw as i64)
    }

    /// Returns the integer part, truncating towards negative infinity.
    pub const fn to_int(self) -> i64 {
        self.0 >> Self::FRACTION_BITS
    }

    /// Returns the raw on-disk word.
    pub fn to_raw(self) -> i32 {
        self.0 as i32
    }

    /// Returns true if the magnitude of the value is strictly below `bound`.
    pub fn is_within(self, bound: i64) -> bool {
        self.0.abs() < (bound << Self::FRACTION_BITS)
    }

    /// Converts the value to a float, for display only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << Self::FRACTION_BITS) as f64
    }

    /// Converts a design size to scaled points.
    ///
    /// Design sizes are expressed in points, so the conversion drops four fractional bits.
    pub fn to_sp(self) -> Sp {
        Sp(self.0 >> 4)
    }

    /// Scales a value relative to the design size to the actual size of a font.
    ///
    /// The actual size is halved until it fits in 23 bits, every halving costing one bit of
    /// the final shift, so that the product never exceeds the 64 bit intermediate.
    pub fn scale(self, actual: Sp) -> Sp {
        let mut z = actual.0;
        let mut shift = Self::FRACTION_BITS as i64;
        while z >= 0x80_0000 {
            z >>= 1;
            shift -= 1;
        }

        if shift >= 0 {
            Sp((z * self.0) >> shift)
        } else {
            Sp((z * self.0) << -shift)
        }
    }
}

impl Add for FixWord {
    type Output = FixWord;

    fn add(self, other: FixWord) -> FixWord {
        FixWord(self.0 + other.0)
    }
}

impl Sub for FixWord {
    type Output = FixWord;

    fn sub(self, other: FixWord) -> FixWord {
        FixWord(self.0 - other.0)
    }
}

impl Neg for FixWord {
    type Output = FixWord;

    fn neg(self) -> FixWord {
        FixWord(-self.0)
    }
}

impl fmt::Debug for FixWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} fw", self.0)
    }
}

impl fmt::Display for FixWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}
