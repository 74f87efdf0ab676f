//! Packing a list of nodes into a box of a given width.

use crate::config::TypesettingOptions;
use crate::layout::glue::GlueOrder;
use crate::layout::paragraphs::badness::badness;
use crate::layout::paragraphs::items::Node;
use crate::units::Sp;

/// Whether the glue of a box is stretched or shrunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlueSign {
    /// The glue keeps its natural width.
    Normal,

    /// The glue is stretched.
    Stretching,

    /// The glue is shrunk.
    Shrinking,
}

/// How the glue of a box is set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlueSet {
    /// Stretching or shrinking.
    pub sign: GlueSign,

    /// Only glue of this order changes.
    pub order: GlueOrder,

    /// The ratio applied to the stretch or shrink of the glue.
    pub ratio: f64,
}

impl GlueSet {
    /// Glue at its natural width.
    pub const NATURAL: GlueSet = GlueSet {
        sign: GlueSign::Normal,
        order: GlueOrder::Normal,
        ratio: 0.0,
    };
}

/// A horizontal box.
#[derive(Debug, Clone, PartialEq)]
pub struct HBox {
    /// The width of the box.
    pub width: Sp,

    /// The height of the box.
    pub height: Sp,

    /// The depth of the box.
    pub depth: Sp,

    /// How far the box is moved, right for lines of a paragraph.
    pub shift: Sp,

    /// How the glue inside the box is set.
    pub glue_set: GlueSet,

    /// The badness of the box.
    pub badness: i64,

    /// The content of the box.
    pub list: Vec<Node>,
}

impl HBox {
    /// An empty box.
    pub fn empty(width: Sp) -> HBox {
        HBox {
            width,
            height: Sp(0),
            depth: Sp(0),
            shift: Sp(0),
            glue_set: GlueSet::NATURAL,
            badness: 0,
            list: vec![],
        }
    }

    /// Whether the box is overfull.
    pub fn is_overfull(&self) -> bool {
        self.badness > crate::layout::constants::INF_BAD
    }
}

fn highest_order(totals: &[Sp; 4]) -> GlueOrder {
    GlueOrder::ALL
        .iter()
        .rev()
        .copied()
        .find(|o| !totals[o.index()].is_zero())
        .unwrap_or(GlueOrder::Normal)
}

/// Badness recorded for boxes that cannot shrink enough.
const OVERFULL_BADNESS: i64 = 1_000_000;

/// Packs a list into a box of the given width.
///
/// Marks, insertions and adjusted material are moved out of the box and returned, in order.
pub fn hpack(list: Vec<Node>, width: Sp, options: &TypesettingOptions) -> (HBox, Vec<Node>) {
    let mut natural = Sp(0);
    let mut height = Sp(0);
    let mut depth = Sp(0);
    let mut stretch = [Sp(0); 4];
    let mut shrink = [Sp(0); 4];
    let mut kept = Vec::with_capacity(list.len());
    let mut migrated = vec![];

    for node in list {
        match node {
            Node::Mark(_) | Node::Insert(_) => {
                migrated.push(node);
                continue;
            }
            Node::Adjust(material) => {
                migrated.extend(material);
                continue;
            }
            Node::Glue(ref glue) => {
                stretch[glue.stretch_order.index()] += glue.stretch;
                shrink[glue.shrink_order.index()] += glue.shrink;
            }
            _ => (),
        }
        natural += node.width();
        height = height.max(node.height());
        depth = depth.max(node.depth());
        kept.push(node);
    }

    let mut hbox = HBox {
        width,
        height,
        depth,
        shift: Sp(0),
        glue_set: GlueSet::NATURAL,
        badness: 0,
        list: kept,
    };

    let excess = width - natural;
    if excess > Sp(0) {
        let order = highest_order(&stretch);
        let total = stretch[order.index()];
        if !total.is_zero() {
            hbox.glue_set = GlueSet {
                sign: GlueSign::Stretching,
                order,
                ratio: excess.0 as f64 / total.0 as f64,
            };
        }
        if order == GlueOrder::Normal && !hbox.list.is_empty() {
            hbox.badness = badness(excess, total);
            if hbox.badness > options.hbadness as i64 {
                if hbox.badness > 100 {
                    warn!("Underfull \\hbox (badness {}) in paragraph", hbox.badness);
                } else {
                    info!("Loose \\hbox (badness {}) in paragraph", hbox.badness);
                }
            }
        }
    } else if excess < Sp(0) {
        let order = highest_order(&shrink);
        let total = shrink[order.index()];
        if !total.is_zero() {
            hbox.glue_set = GlueSet {
                sign: GlueSign::Shrinking,
                order,
                ratio: -excess.0 as f64 / total.0 as f64,
            };
        }
        if order == GlueOrder::Normal && !hbox.list.is_empty() {
            if total < -excess {
                hbox.badness = OVERFULL_BADNESS;
                hbox.glue_set.ratio = 1.0;
                let overflow = -excess - total;
                if overflow > options.hfuzz || options.hbadness < 100 {
                    warn!("Overfull \\hbox ({} too wide) in paragraph", overflow);
                }
            } else {
                hbox.badness = badness(-excess, total);
                if hbox.badness > options.hbadness as i64 {
                    info!("Tight \\hbox (badness {}) in paragraph", hbox.badness);
                }
            }
        }
    }

    (hbox, migrated)
}
