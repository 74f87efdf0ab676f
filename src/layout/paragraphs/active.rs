//! The candidate breakpoints of a paragraph being broken.
//!
//! Active breakpoints are kept in a singly linked list, ordered by line number, stored in an
//! arena. Between two active nodes, a delta node may hold the difference between the widths
//! measured from each of them, so that only the width from the first active node has to be
//! maintained while scanning.

use crate::layout::paragraphs::badness::Fitness;
use crate::layout::paragraphs::widths::RunningWidth;

/// Index of the list head in the arena.
pub const HEAD: usize = 0;

/// A breakpoint that can still start a line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActiveNode {
    /// The fitness of the line ending at this breakpoint.
    pub fitness: Fitness,

    /// Whether the breakpoint is a discretionary.
    pub hyphenated: bool,

    /// The demerits of the best way of reaching this breakpoint.
    pub total_demerits: i64,

    /// The number of the line that starts after this breakpoint.
    pub line_number: usize,

    /// The passive node of this breakpoint, `None` for the start of the paragraph.
    pub break_node: Option<usize>,
}

/// A breakpoint recorded for good, used to rebuild the chosen breaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PassiveNode {
    /// The position of the break in the node list, `None` for the end of the paragraph.
    pub cur_break: Option<usize>,

    /// The passive node of the previous break on the best path to this one.
    pub prev_break: Option<usize>,

    /// The number of the node, starting at one, used in traces.
    pub serial: usize,
}

/// What an arena slot holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The list head.
    Head,

    /// An active breakpoint.
    Active(ActiveNode),

    /// The width difference between the previous and the next active breakpoint.
    Delta(RunningWidth),

    /// A slot waiting to be reused.
    Free,
}

#[derive(Debug, Copy, Clone)]
struct Entry {
    slot: Slot,
    link: Option<usize>,
}

/// The active list and the passive nodes of a paragraph.
#[derive(Debug, Clone)]
pub struct ActiveBreakpointSet {
    entries: Vec<Entry>,
    free: Vec<usize>,
    passives: Vec<PassiveNode>,
}

impl Default for ActiveBreakpointSet {
    fn default() -> ActiveBreakpointSet {
        ActiveBreakpointSet::new()
    }
}

impl ActiveBreakpointSet {
    /// Creates an empty set.
    pub fn new() -> ActiveBreakpointSet {
        ActiveBreakpointSet {
            entries: vec![Entry {
                slot: Slot::Head,
                link: None,
            }],
            free: vec![],
            passives: vec![],
        }
    }

    /// Removes every active and passive node.
    pub fn clear(&mut self) {
        self.entries.truncate(1);
        self.entries[HEAD].link = None;
        self.free.clear();
        self.passives.clear();
    }

    /// The slot following `index`, `None` at the end of the list.
    pub fn link(&self, index: usize) -> Option<usize> {
        self.entries[index].link
    }

    /// The first slot after the head.
    pub fn first(&self) -> Option<usize> {
        self.link(HEAD)
    }

    /// Whether no node is left.
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    /// The content of a slot.
    pub fn slot(&self, index: usize) -> &Slot {
        &self.entries[index].slot
    }

    /// The active node in a slot, if it holds one.
    pub fn active(&self, index: usize) -> Option<&ActiveNode> {
        match self.slot(index) {
            Slot::Active(node) => Some(node),
            _ => None,
        }
    }

    /// The delta in a slot, if it holds one.
    pub fn delta(&self, index: usize) -> Option<RunningWidth> {
        match *self.slot(index) {
            Slot::Delta(width) => Some(width),
            _ => None,
        }
    }

    /// A mutable reference to the delta in a slot, if it holds one.
    pub fn delta_mut(&mut self, index: usize) -> Option<&mut RunningWidth> {
        match &mut self.entries[index].slot {
            Slot::Delta(width) => Some(width),
            _ => None,
        }
    }

    /// Whether a slot holds a delta.
    pub fn is_delta(&self, index: usize) -> bool {
        matches!(self.slot(index), Slot::Delta(_))
    }

    /// Links a new slot right after `prev`, and returns its index.
    pub fn insert_after(&mut self, prev: usize, slot: Slot) -> usize {
        let link = self.entries[prev].link;
        let entry = Entry { slot, link };
        let index = match self.free.pop() {
            Some(index) => {
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.entries[prev].link = Some(index);
        index
    }

    /// Unlinks the slot following `prev` and frees it.
    pub fn remove_after(&mut self, prev: usize) -> Option<Slot> {
        let index = self.entries[prev].link?;
        self.entries[prev].link = self.entries[index].link;
        let slot = std::mem::replace(&mut self.entries[index].slot, Slot::Free);
        self.entries[index].link = None;
        self.free.push(index);
        Some(slot)
    }

    /// Iterates over the active nodes, in list order.
    pub fn active_nodes(&self) -> ActiveNodes {
        ActiveNodes {
            set: self,
            next: self.first(),
        }
    }

    /// Records a passive node, and returns its index.
    pub fn push_passive(&mut self, cur_break: Option<usize>, prev_break: Option<usize>) -> usize {
        let serial = self.passives.len() + 1;
        self.passives.push(PassiveNode {
            cur_break,
            prev_break,
            serial,
        });
        self.passives.len() - 1
    }

    /// A passive node.
    pub fn passive(&self, index: usize) -> &PassiveNode {
        &self.passives[index]
    }

    /// The serial of the passive node of an active node, 0 for the start of the paragraph.
    pub fn serial(&self, break_node: Option<usize>) -> usize {
        break_node.map_or(0, |p| self.passives[p].serial)
    }

    /// The indices of the passive nodes of the path ending at `last`, from the first line to
    /// the last.
    pub fn path(&self, last: Option<usize>) -> Vec<usize> {
        let mut path = vec![];
        let mut current = last;
        while let Some(index) = current {
            path.push(index);
            current = self.passives[index].prev_break;
        }
        path.reverse();
        path
    }
}

/// Iterator over the active nodes of a set, with their slot.
pub struct ActiveNodes<'a> {
    set: &'a ActiveBreakpointSet,
    next: Option<usize>,
}

impl<'a> Iterator for ActiveNodes<'a> {
    type Item = (usize, &'a ActiveNode);

    fn next(&mut self) -> Option<(usize, &'a ActiveNode)> {
        while let Some(index) = self.next {
            self.next = self.set.link(index);
            if let Slot::Active(node) = &self.set.entries[index].slot {
                return Some((index, node));
            }
        }
        None
    }
}
