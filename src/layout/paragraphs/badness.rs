//! How bad a line looks, and how much it costs.

use std::fmt;

use crate::layout::constants::{
    BIG_SHORTFALL, EJECT_PENALTY, INF_BAD, MAX_LINE_DEMERITS, SMALL_STRETCH,
};
use crate::layout::paragraphs::widths::RunningWidth;
use crate::units::Sp;

/// How much the glue of a line had to stretch or shrink.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fitness {
    /// Badness above 99 from stretching.
    VeryLoose = 0,

    /// Badness between 13 and 99 from stretching.
    Loose = 1,

    /// Badness at most 12.
    Decent = 2,

    /// Badness above 12 from shrinking.
    Tight = 3,
}

impl Fitness {
    /// All classes, from loosest to tightest.
    pub const ALL: [Fitness; 4] = [
        Fitness::VeryLoose,
        Fitness::Loose,
        Fitness::Decent,
        Fitness::Tight,
    ];

    /// Position of the class in [`Fitness::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether two consecutive lines of these classes look alike.
    pub fn is_adjacent(self, other: Fitness) -> bool {
        (self as i64 - other as i64).abs() <= 1
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", *self as u8)
    }
}

/// Computes the badness of stretching or shrinking by `t` when `s` is available.
///
/// This is about `100 * (t / s)^3`, computed with integers only, and capped at
/// [`INF_BAD`].
pub fn badness(t: Sp, s: Sp) -> i64 {
    let (t, s) = (t.0, s.0);
    if t == 0 {
        return 0;
    }
    if s <= 0 {
        return INF_BAD;
    }

    let r = if t <= BIG_SHORTFALL {
        (t * 297) / s
    } else if s >= SMALL_STRETCH {
        t / (s / 297)
    } else {
        t
    };

    if r > 1290 {
        INF_BAD
    } else {
        (r * r * r + 0x20000) / 0x40000
    }
}

/// Badness and fitness of a line that is `shortfall` too short.
pub fn stretch_fitness(shortfall: Sp, width: &RunningWidth) -> (i64, Fitness) {
    if width.has_infinite_stretch() {
        return (0, Fitness::Decent);
    }

    let stretch = width.finite_stretch();
    if shortfall.0 > BIG_SHORTFALL && stretch.0 < SMALL_STRETCH {
        return (INF_BAD, Fitness::VeryLoose);
    }

    let b = badness(shortfall, stretch);
    let fitness = if b > 99 {
        Fitness::VeryLoose
    } else if b > 12 {
        Fitness::Loose
    } else {
        Fitness::Decent
    };
    (b, fitness)
}

/// Badness and fitness of a line that is `-shortfall` too long.
///
/// A line that cannot shrink enough gets a badness above [`INF_BAD`].
pub fn shrink_fitness(shortfall: Sp, width: &RunningWidth) -> (i64, Fitness) {
    let excess = -shortfall;
    let b = if excess > width.shrink {
        INF_BAD + 1
    } else {
        badness(excess, width.shrink)
    };
    let fitness = if b > 12 {
        Fitness::Tight
    } else {
        Fitness::Decent
    };
    (b, fitness)
}

/// The part of the demerits of a line that comes from its badness.
pub fn base_demerits(line_penalty: i64, badness: i64) -> i64 {
    let d = line_penalty + badness;
    if d.abs() >= 10_000 {
        MAX_LINE_DEMERITS
    } else {
        d * d
    }
}

/// The demerits of a line of a given badness ending at a break of the given penalty.
pub fn line_demerits(line_penalty: i64, badness: i64, penalty: i64) -> i64 {
    let d = base_demerits(line_penalty, badness);
    if penalty > 0 {
        d + penalty * penalty
    } else if penalty > EJECT_PENALTY {
        d - penalty * penalty
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::glue::{Glue, GlueOrder};
    use test_case::test_case;

    #[test_case(Sp(0), Sp(0), 0 ; "nothing to do")]
    #[test_case(Sp::pt(1), Sp(0), 10_000 ; "no stretch")]
    #[test_case(Sp::pt(1), Sp::pt(1), 100 ; "ratio one")]
    #[test_case(Sp::pt(1), Sp::pt(2), 12 ; "ratio one half")]
    #[test_case(Sp::pt(3), Sp::pt(1), 2698 ; "ratio three")]
    #[test_case(Sp::pt(5), Sp::pt(1), 10_000 ; "ratio five")]
    #[test_case(Sp::pt(200), Sp::pt(100), 800 ; "large values")]
    fn badness_values(t: Sp, s: Sp, expected: i64) {
        assert_eq!(badness(t, s), expected);
    }

    #[test]
    fn badness_is_monotonic() {
        for s in &[Sp(1), Sp::pt(1), Sp::pt(10), Sp::pt(30), Sp::pt(100)] {
            let mut previous = 0;
            for step in 0..2000 {
                let b = badness(Sp(step * 4093), *s);
                assert!(b >= previous, "badness decreased at {} for {:?}", step, s);
                previous = b;
            }
        }
    }

    #[test]
    fn fitness_classes() {
        let width = RunningWidth::from_glue(&Glue::new(Sp::pt(30), Sp::pt(10), Sp::pt(4)));
        assert_eq!(stretch_fitness(Sp::pt(1), &width), (0, Fitness::Decent));
        assert_eq!(stretch_fitness(Sp::pt(6), &width), (22, Fitness::Loose));
        assert_eq!(stretch_fitness(Sp::pt(12), &width), (172, Fitness::VeryLoose));
        assert_eq!(shrink_fitness(Sp::pt(-4), &width), (100, Fitness::Tight));
        assert_eq!(shrink_fitness(Sp::pt(-1), &width), (2, Fitness::Decent));
        assert_eq!(
            shrink_fitness(Sp::pt(-5), &width),
            (INF_BAD + 1, Fitness::Tight)
        );

        let mut fil = width;
        fil.add_glue(&Glue::fil(Sp(0), Sp::pt(1), GlueOrder::Fil));
        assert_eq!(stretch_fitness(Sp::pt(100), &fil), (0, Fitness::Decent));
    }

    #[test]
    fn huge_shortfall_is_infinitely_bad() {
        let width = RunningWidth::from_glue(&Glue::new(Sp(0), Sp::pt(10), Sp(0)));
        assert_eq!(
            stretch_fitness(Sp(BIG_SHORTFALL + 1), &width),
            (INF_BAD, Fitness::VeryLoose)
        );
    }

    #[test]
    fn adjacency() {
        assert!(Fitness::Decent.is_adjacent(Fitness::Tight));
        assert!(Fitness::Loose.is_adjacent(Fitness::Loose));
        assert!(!Fitness::VeryLoose.is_adjacent(Fitness::Decent));
        assert!(!Fitness::Tight.is_adjacent(Fitness::Loose));
    }

    #[test]
    fn squared_term_is_never_negative() {
        for line_penalty in -20_000..20_000 {
            for &b in &[0, 1, 13, 100, 9_999, 10_000, 10_001] {
                assert!(base_demerits(line_penalty, b) >= 0);
            }
        }
    }

    #[test_case(10, 0, 0, 100 ; "perfect line")]
    #[test_case(10, 0, 50, 2_600 ; "hyphen")]
    #[test_case(10, 0, -50, -2_400 ; "bonus")]
    #[test_case(10, 0, -10_000, 100 ; "forced")]
    #[test_case(10, 10_000, 0, 100_000_000 ; "overflow")]
    fn demerits(line_penalty: i64, b: i64, pi: i64, expected: i64) {
        assert_eq!(line_demerits(line_penalty, b, pi), expected);
    }
}
