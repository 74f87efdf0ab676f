//! Sums of widths, stretch and shrink.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::layout::glue::{Glue, GlueOrder};
use crate::units::Sp;

/// The six components of a width: natural width, stretch of each order and finite shrink.
///
/// Shrink is always finite: infinite shrink is rejected before breaking starts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RunningWidth {
    /// The natural width.
    pub natural: Sp,

    /// The stretch, indexed by [`GlueOrder::index`].
    pub stretch: [Sp; 4],

    /// The shrink.
    pub shrink: Sp,
}

impl RunningWidth {
    /// No width at all.
    pub const ZERO: RunningWidth = RunningWidth {
        natural: Sp(0),
        stretch: [Sp(0); 4],
        shrink: Sp(0),
    };

    /// The width of some glue.
    pub fn from_glue(glue: &Glue) -> RunningWidth {
        let mut width = RunningWidth::ZERO;
        width.add_glue(glue);
        width
    }

    /// Adds a rigid width.
    pub fn add_width(&mut self, width: Sp) {
        self.natural += width;
    }

    /// Removes a rigid width.
    pub fn sub_width(&mut self, width: Sp) {
        self.natural -= width;
    }

    /// Adds some glue.
    pub fn add_glue(&mut self, glue: &Glue) {
        self.natural += glue.width;
        self.stretch[glue.stretch_order.index()] += glue.stretch;
        self.shrink += glue.shrink;
    }

    /// Removes some glue.
    pub fn sub_glue(&mut self, glue: &Glue) {
        self.natural -= glue.width;
        self.stretch[glue.stretch_order.index()] -= glue.stretch;
        self.shrink -= glue.shrink;
    }

    /// Adds stretch of an order.
    pub fn add_stretch(&mut self, amount: Sp, order: GlueOrder) {
        self.stretch[order.index()] += amount;
    }

    /// The finite stretch.
    pub fn finite_stretch(&self) -> Sp {
        self.stretch[GlueOrder::Normal.index()]
    }

    /// Whether some stretch is infinite.
    pub fn has_infinite_stretch(&self) -> bool {
        self.stretch[1..].iter().any(|s| !s.is_zero())
    }
}

impl Add for RunningWidth {
    type Output = RunningWidth;

    fn add(mut self, other: RunningWidth) -> RunningWidth {
        self += other;
        self
    }
}

impl AddAssign for RunningWidth {
    fn add_assign(&mut self, other: RunningWidth) {
        self.natural += other.natural;
        for (s, o) in self.stretch.iter_mut().zip(other.stretch.iter()) {
            *s += *o;
        }
        self.shrink += other.shrink;
    }
}

impl Sub for RunningWidth {
    type Output = RunningWidth;

    fn sub(mut self, other: RunningWidth) -> RunningWidth {
        self -= other;
        self
    }
}

impl SubAssign for RunningWidth {
    fn sub_assign(&mut self, other: RunningWidth) {
        *self += -other;
    }
}

impl Neg for RunningWidth {
    type Output = RunningWidth;

    fn neg(self) -> RunningWidth {
        RunningWidth {
            natural: -self.natural,
            stretch: [
                -self.stretch[0],
                -self.stretch[1],
                -self.stretch[2],
                -self.stretch[3],
            ],
            shrink: -self.shrink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunningWidth;
    use crate::layout::glue::{Glue, GlueOrder};
    use crate::units::Sp;

    #[test]
    fn glue_goes_to_its_order() {
        let mut width = RunningWidth::ZERO;
        width.add_glue(&Glue::new(Sp::pt(3), Sp::pt(1), Sp::pt(1)));
        width.add_glue(&Glue::fil(Sp(0), Sp::pt(1), GlueOrder::Fill));

        assert_eq!(width.natural, Sp::pt(3));
        assert_eq!(width.finite_stretch(), Sp::pt(1));
        assert_eq!(width.stretch[2], Sp::pt(1));
        assert_eq!(width.shrink, Sp::pt(1));
        assert!(width.has_infinite_stretch());
    }

    #[test]
    fn deltas_cancel_out() {
        let a = RunningWidth::from_glue(&Glue::new(Sp::pt(5), Sp::pt(2), Sp::pt(1)));
        let mut b = a;
        b.add_width(Sp::pt(20));
        b.add_glue(&Glue::fil(Sp::pt(1), Sp::pt(1), GlueOrder::Fil));

        let delta = b - a;
        assert_eq!(a + delta, b);
        assert_eq!(delta.natural, Sp::pt(21));
        assert!(!a.has_infinite_stretch());

        let mut c = b;
        c.sub_glue(&Glue::fil(Sp::pt(1), Sp::pt(1), GlueOrder::Fil));
        c.sub_width(Sp::pt(20));
        assert_eq!(c, a);
    }
}
