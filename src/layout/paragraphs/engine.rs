//! Breaking a paragraph into lines, making exactly the decisions TeX makes.
//!
//! The breaker scans the list of nodes once per pass. Every legal breakpoint is tried against
//! the active breakpoints, the feasible ones become new active breakpoints, and at the end of
//! the paragraph the path with the fewest total demerits is turned into lines.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::config::TypesettingOptions;
use crate::layout::constants::{AWFUL_BAD, EJECT_PENALTY, INF_BAD, INF_PENALTY, MAX_LINE};
use crate::layout::glue::{Glue, GlueOrder};
use crate::layout::paragraphs::active::{ActiveBreakpointSet, ActiveNode, Slot, HEAD};
use crate::layout::paragraphs::badness::{line_demerits, shrink_fitness, stretch_fitness, Fitness};
use crate::layout::paragraphs::hyphenation::Hyphenator;
use crate::layout::paragraphs::items::{
    CharNode, DiscretionaryNode, FontId, KernKind, MathKind, Node, VerticalItem,
};
use crate::layout::paragraphs::packing::{hpack, HBox};
use crate::layout::paragraphs::shape::ParagraphShape;
use crate::layout::paragraphs::trace::{break_name, short_display, LogTracer, Tracer};
use crate::layout::paragraphs::widths::RunningWidth;
use crate::layout::paragraphs::Paragraph;
use crate::units::Sp;
use crate::{Error, Result};

/// The passes of the line breaker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pass {
    /// Lines up to `pretolerance`, without hyphenation.
    First,

    /// Lines up to `tolerance`, hyphenating words.
    Second,

    /// Like the second pass, with `emergency_stretch` available in every line.
    Emergency,
}

impl fmt::Display for Pass {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Pass::First => write!(fmt, "first"),
            Pass::Second => write!(fmt, "second"),
            Pass::Emergency => write!(fmt, "emergency"),
        }
    }
}

/// A breakpoint of the chosen path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// The index of the break in the list that was broken, after the end of paragraph glue was
    /// appended and words were hyphenated. `None` for the end of the paragraph.
    pub position: Option<usize>,

    /// The number of the line ending at this break.
    pub line: usize,

    /// The fitness class of that line.
    pub fitness: Fitness,

    /// Whether the break is at a discretionary.
    pub hyphenated: bool,

    /// The demerits of the path up to this break.
    pub total_demerits: i64,
}

/// A paragraph broken into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenParagraph {
    /// The lines, with the penalties between them and the material moved out of them.
    pub items: Vec<VerticalItem>,

    /// The chosen breakpoints, one per line.
    pub breaks: Vec<Breakpoint>,

    /// The pass that found the breakpoints.
    pub pass: Pass,

    /// The demerits of the whole paragraph.
    pub total_demerits: i64,

    /// The number of lines typeset so far, including the ones of this paragraph.
    pub prev_graf: usize,
}

impl BrokenParagraph {
    /// The lines of the paragraph.
    pub fn lines(&self) -> impl Iterator<Item = &HBox> + '_ {
        self.items.iter().filter_map(|item| match item {
            VerticalItem::Line(hbox) => Some(hbox),
            _ => None,
        })
    }
}

/// Breaks paragraphs into lines.
///
/// ```
/// # use spandex_core::config::TypesettingOptions;
/// # use spandex_core::layout::paragraphs::Paragraph;
/// # use spandex_core::layout::paragraphs::engine::LineBreaker;
/// let mut options = TypesettingOptions::default();
/// let broken = LineBreaker::new(&mut options)
///     .break_paragraph(Paragraph::new())
///     .unwrap();
/// assert_eq!(broken.lines().count(), 1);
/// assert_eq!(options.prev_graf, 1);
/// ```
pub struct LineBreaker<'a> {
    options: &'a mut TypesettingOptions,
    hyphenator: Option<&'a mut dyn Hyphenator>,
    tracer: Option<&'a mut dyn Tracer>,
}

impl<'a> LineBreaker<'a> {
    /// Creates a line breaker using some options; `prev_graf` is updated after each paragraph.
    pub fn new(options: &'a mut TypesettingOptions) -> LineBreaker<'a> {
        LineBreaker {
            options,
            hyphenator: None,
            tracer: None,
        }
    }

    /// Hyphenates words on the second pass.
    pub fn hyphenator(mut self, hyphenator: &'a mut dyn Hyphenator) -> LineBreaker<'a> {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Sends the trace of the breaker to `tracer`, whatever `tracing_paragraphs` says.
    ///
    /// Without tracer, the trace is logged when `tracing_paragraphs` is positive.
    pub fn tracer(mut self, tracer: &'a mut dyn Tracer) -> LineBreaker<'a> {
        self.tracer = Some(tracer);
        self
    }

    /// Breaks a paragraph into lines.
    pub fn break_paragraph(&mut self, paragraph: Paragraph) -> Result<BrokenParagraph> {
        let Paragraph {
            nodes,
            hyphen_chars,
            before_display,
        } = paragraph;

        let mut log_tracer = LogTracer;
        let tracer: Option<&mut dyn Tracer> = match self.tracer.as_mut() {
            Some(tracer) => Some(&mut **tracer),
            None if self.options.tracing_paragraphs > 0 => Some(&mut log_tracer),
            None => None,
        };
        let hyphenator: Option<&mut dyn Hyphenator> = match self.hyphenator.as_mut() {
            Some(hyphenator) => Some(&mut **hyphenator),
            None => None,
        };

        let mut breaker = Breaker::new(&*self.options, &hyphen_chars, hyphenator, tracer, nodes);
        let (pass, choice) = breaker.break_lines()?;
        let (items, breaks) = breaker.post_line_break(&choice, before_display)?;

        let prev_graf = choice.line - 1;
        debug!(
            "paragraph broken into {} lines on the {} pass",
            breaks.len(),
            pass
        );
        self.options.prev_graf = prev_graf;

        Ok(BrokenParagraph {
            items,
            breaks,
            pass,
            total_demerits: choice.total_demerits,
            prev_graf,
        })
    }
}

/// What the scan does with a node.
enum Step {
    Width(Sp),
    Glue,
    Kern(Sp, KernKind),
    Discretionary {
        pre_break: Sp,
        empty: bool,
        replace_count: usize,
    },
    Math(MathKind, Sp),
    Penalty(i64),
    Nothing,
}

/// The position of `try_break` in the active list.
struct Walk {
    prev_r: usize,
    prev_prev_r: usize,
    cur_active_width: RunningWidth,
    no_break_yet: bool,
}

/// The active node ending the best path.
struct Choice {
    break_node: Option<usize>,
    line: usize,
    total_demerits: i64,
}

impl<'n> From<&'n ActiveNode> for Choice {
    fn from(node: &'n ActiveNode) -> Choice {
        Choice {
            break_node: node.break_node,
            line: node.line_number,
            total_demerits: node.total_demerits,
        }
    }
}

/// Makes infinite shrink finite, warning once per paragraph.
fn check_shrinkage(glue: &mut Glue, warned: &mut bool) {
    if glue.shrink_order != GlueOrder::Normal && !glue.shrink.is_zero() {
        if !*warned {
            warn!("Infinite glue shrinkage found in a paragraph");
            *warned = true;
        }
        glue.shrink_order = GlueOrder::Normal;
    }
}

/// The working state of the breaker for one paragraph.
struct Breaker<'b> {
    options: &'b TypesettingOptions,
    shape: ParagraphShape,
    hyphen_chars: &'b HashMap<FontId, CharNode>,
    hyphenator: Option<&'b mut dyn Hyphenator>,
    tracer: Option<&'b mut dyn Tracer>,
    nodes: Vec<Node>,
    left_skip: Glue,
    right_skip: Glue,
    set: ActiveBreakpointSet,
    breakpoints: Vec<Breakpoint>,
    background: RunningWidth,
    active_width: RunningWidth,
    break_width: RunningWidth,
    disc_width: Sp,
    minimal_demerits: [i64; 4],
    minimum_demerits: i64,
    best_place: [Option<usize>; 4],
    best_pl_line: [usize; 4],
    easy_line: usize,
    threshold: i64,
    second_pass: bool,
    final_pass: bool,
    printed: usize,
    shrink_warned: bool,
}

impl<'b> Breaker<'b> {
    fn new(
        options: &'b TypesettingOptions,
        hyphen_chars: &'b HashMap<FontId, CharNode>,
        hyphenator: Option<&'b mut dyn Hyphenator>,
        tracer: Option<&'b mut dyn Tracer>,
        mut nodes: Vec<Node>,
    ) -> Breaker<'b> {
        // The paragraph ends with an unbreakable space and the parfillskip.
        if let Some(Node::Glue(_)) = nodes.last() {
            nodes.pop();
        }
        nodes.push(Node::Penalty(INF_PENALTY as i32));
        nodes.push(Node::Glue(options.par_fill_skip));

        let mut shrink_warned = false;
        let mut left_skip = options.left_skip;
        let mut right_skip = options.right_skip;
        check_shrinkage(&mut left_skip, &mut shrink_warned);
        check_shrinkage(&mut right_skip, &mut shrink_warned);
        let background = RunningWidth::from_glue(&left_skip) + RunningWidth::from_glue(&right_skip);

        let shape = ParagraphShape::from_options(options);
        let easy_line = if options.looseness == 0 {
            shape.last_special_line()
        } else {
            MAX_LINE
        };

        Breaker {
            options,
            shape,
            hyphen_chars,
            hyphenator,
            tracer,
            nodes,
            left_skip,
            right_skip,
            set: ActiveBreakpointSet::new(),
            breakpoints: vec![],
            background,
            active_width: background,
            break_width: background,
            disc_width: Sp(0),
            minimal_demerits: [AWFUL_BAD; 4],
            minimum_demerits: AWFUL_BAD,
            best_place: [None; 4],
            best_pl_line: [0; 4],
            easy_line,
            threshold: 0,
            second_pass: false,
            final_pass: false,
            printed: 0,
            shrink_warned,
        }
    }

    fn trace(&mut self, line: &str) {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.trace(line);
        }
    }

    /// Runs the passes until one finds the breakpoints.
    fn break_lines(&mut self) -> Result<(Pass, Choice)> {
        let mut pass = if self.options.pretolerance >= 0 {
            Pass::First
        } else {
            Pass::Second
        };

        loop {
            self.start_pass(pass);
            if let Some(choice) = self.scan()? {
                return Ok((pass, choice));
            }

            pass = if !self.second_pass {
                Pass::Second
            } else if !self.final_pass {
                Pass::Emergency
            } else {
                return Err(Error::LineBreaking(String::from(
                    "no active breakpoint left after the final pass",
                )));
            };
        }
    }

    fn start_pass(&mut self, pass: Pass) {
        let options = self.options;
        match pass {
            Pass::First => {
                self.threshold = i64::from(options.pretolerance);
                self.second_pass = false;
                self.final_pass = false;
                self.trace("@firstpass");
            }
            Pass::Second => {
                self.threshold = i64::from(options.tolerance);
                self.second_pass = true;
                self.final_pass = options.emergency_stretch <= Sp(0);
                if options.pretolerance >= 0 {
                    self.trace("@secondpass");
                }
            }
            Pass::Emergency => {
                self.background
                    .add_stretch(options.emergency_stretch, GlueOrder::Normal);
                self.final_pass = true;
                self.trace("@emergencypass");
            }
        }
        self.threshold = self.threshold.min(INF_BAD);
        debug!("{} pass with threshold {}", pass, self.threshold);

        self.set.clear();
        self.breakpoints.clear();
        self.set.insert_after(
            HEAD,
            Slot::Active(ActiveNode {
                fitness: Fitness::Decent,
                hyphenated: false,
                total_demerits: 0,
                line_number: options.prev_graf + 1,
                break_node: None,
            }),
        );
        self.active_width = self.background;
        self.minimal_demerits = [AWFUL_BAD; 4];
        self.minimum_demerits = AWFUL_BAD;
        self.printed = 0;
    }

    /// Scans the paragraph once; returns the best path if the pass succeeds.
    fn scan(&mut self) -> Result<Option<Choice>> {
        let options = self.options;
        let mut cur_p = 0;
        let mut prev_p: Option<usize> = None;
        let mut auto_breaking = true;

        while cur_p < self.nodes.len() && !self.set.is_empty() {
            let step = match &self.nodes[cur_p] {
                Node::Char(c) => Step::Width(c.width),
                Node::Ligature(l) => Step::Width(l.glyph.width),
                Node::HBox(b) => Step::Width(b.width),
                Node::Rule(r) => Step::Width(r.width),
                Node::Glue(_) => Step::Glue,
                Node::Kern(k) => Step::Kern(k.width, k.kind),
                Node::Discretionary(d) => Step::Discretionary {
                    pre_break: d.pre_break.iter().fold(Sp(0), |w, n| w + n.width()),
                    empty: d.pre_break.is_empty(),
                    replace_count: d.replace_count,
                },
                Node::Math(m) => Step::Math(m.kind, m.width),
                Node::Penalty(p) => Step::Penalty(i64::from(*p)),
                Node::Mark(_) | Node::Insert(_) | Node::Adjust(_) | Node::Whatsit(_) => {
                    Step::Nothing
                }
            };

            match step {
                Step::Width(width) => self.active_width.add_width(width),
                Step::Glue => {
                    if auto_breaking && prev_p.map_or(false, |p| self.glue_breaks_after(p)) {
                        self.try_break(0, false, Some(cur_p));
                    }
                    if let Node::Glue(glue) = &mut self.nodes[cur_p] {
                        check_shrinkage(glue, &mut self.shrink_warned);
                        self.active_width.add_glue(glue);
                    }
                    if self.second_pass && auto_breaking {
                        if let Some(hyphenator) = self.hyphenator.as_mut() {
                            hyphenator.hyphenate(
                                &mut self.nodes,
                                cur_p + 1,
                                self.hyphen_chars,
                                options,
                            )?;
                        }
                    }
                }
                Step::Kern(width, KernKind::Explicit) => {
                    self.kern_break(cur_p, width, auto_breaking)
                }
                Step::Kern(width, KernKind::Font) => self.active_width.add_width(width),
                Step::Discretionary {
                    pre_break,
                    empty,
                    replace_count,
                } => {
                    self.disc_width = pre_break;
                    if empty {
                        self.try_break(i64::from(options.ex_hyphen_penalty), true, Some(cur_p));
                    } else {
                        self.active_width.add_width(pre_break);
                        self.try_break(i64::from(options.hyphen_penalty), true, Some(cur_p));
                        self.active_width.sub_width(pre_break);
                    }

                    // The replaced nodes are not breakpoints.
                    let end = (cur_p + 1 + replace_count).min(self.nodes.len());
                    for index in cur_p + 1..end {
                        let width = self.nodes[index].width();
                        self.active_width.add_width(width);
                    }
                    prev_p = Some(cur_p);
                    cur_p = end;
                    continue;
                }
                Step::Math(kind, width) => {
                    auto_breaking = kind == MathKind::After;
                    self.kern_break(cur_p, width, auto_breaking);
                }
                Step::Penalty(penalty) => self.try_break(penalty, false, Some(cur_p)),
                Step::Nothing => (),
            }

            prev_p = Some(cur_p);
            cur_p += 1;
        }

        if cur_p < self.nodes.len() {
            return Ok(None);
        }

        self.try_break(EJECT_PENALTY, true, None);
        Ok(self.choose())
    }

    /// Whether glue following the node at `p` is a legal breakpoint.
    fn glue_breaks_after(&self, p: usize) -> bool {
        match &self.nodes[p] {
            Node::Char(_) => true,
            Node::Kern(k) => k.kind == KernKind::Font,
            node => node.precedes_break(),
        }
    }

    /// A kern or a math node is a legal breakpoint when followed by glue.
    fn kern_break(&mut self, cur_p: usize, width: Sp, auto_breaking: bool) {
        if auto_breaking {
            if let Some(Node::Glue(_)) = self.nodes.get(cur_p + 1) {
                self.try_break(0, false, Some(cur_p));
            }
        }
        self.active_width.add_width(width);
    }

    /// Picks the best active node after the final breakpoint, honouring the looseness.
    fn choose(&self) -> Option<Choice> {
        let mut best = self
            .set
            .active_nodes()
            .map(|(_, node)| node)
            .min_by_key(|node| node.total_demerits)?;

        let looseness = i64::from(self.options.looseness);
        if looseness == 0 {
            return Some(Choice::from(best));
        }

        let best_line = best.line_number as i64;
        let mut actual_looseness = 0;
        let mut fewest_demerits = best.total_demerits;
        for (_, node) in self.set.active_nodes() {
            let line_diff = node.line_number as i64 - best_line;
            if (line_diff < actual_looseness && looseness <= line_diff)
                || (line_diff > actual_looseness && looseness >= line_diff)
            {
                best = node;
                actual_looseness = line_diff;
                fewest_demerits = node.total_demerits;
            } else if line_diff == actual_looseness && node.total_demerits < fewest_demerits {
                best = node;
                fewest_demerits = node.total_demerits;
            }
        }

        if actual_looseness == looseness || self.final_pass {
            Some(Choice::from(best))
        } else {
            None
        }
    }

    /// Tries a break at `cur_p`, `None` meaning the end of the paragraph, against every
    /// active node.
    fn try_break(&mut self, pi: i64, hyphenated: bool, cur_p: Option<usize>) {
        let options = self.options;
        let mut pi = pi;
        if pi.abs() >= INF_PENALTY {
            if pi > 0 {
                return;
            }
            pi = EJECT_PENALTY;
        }

        let mut walk = Walk {
            prev_r: HEAD,
            prev_prev_r: HEAD,
            cur_active_width: self.active_width,
            no_break_yet: true,
        };
        let mut old_l = 0;
        let mut line_width = Sp(0);

        loop {
            let r = self.set.link(walk.prev_r);

            if let Some(index) = r {
                if let Some(delta) = self.set.delta(index) {
                    walk.cur_active_width += delta;
                    walk.prev_prev_r = walk.prev_r;
                    walk.prev_r = index;
                    continue;
                }
            }

            let active = r.and_then(|index| self.set.active(index).copied());
            let l = active.map_or(MAX_LINE, |node| node.line_number);
            if l > old_l {
                if self.minimum_demerits < AWFUL_BAD && (old_l != self.easy_line || r.is_none()) {
                    self.create_active_nodes(&mut walk, r, hyphenated, cur_p);
                }
                if r.is_none() {
                    return;
                }
                line_width = self.shape.width(l);
                old_l = if l > self.easy_line { MAX_LINE - 1 } else { l };
            }

            let (r, active) = match (r, active) {
                (Some(r), Some(active)) => (r, active),
                _ => return,
            };

            let shortfall = line_width - walk.cur_active_width.natural;
            let (b, fit) = if shortfall > Sp(0) {
                stretch_fitness(shortfall, &walk.cur_active_width)
            } else {
                shrink_fitness(shortfall, &walk.cur_active_width)
            };

            let mut artificial_demerits = false;
            let node_r_stays_active;
            if b > INF_BAD || pi == EJECT_PENALTY {
                // On the final pass the last active node is never lost.
                if self.final_pass
                    && self.minimum_demerits == AWFUL_BAD
                    && self.set.link(r).is_none()
                    && walk.prev_r == HEAD
                {
                    artificial_demerits = true;
                } else if b > self.threshold {
                    self.deactivate(&mut walk);
                    continue;
                }
                node_r_stays_active = false;
            } else {
                walk.prev_r = r;
                if b > self.threshold {
                    continue;
                }
                node_r_stays_active = true;
            }

            let mut d = 0;
            if !artificial_demerits {
                d = line_demerits(i64::from(options.line_penalty), b, pi);
                if hyphenated && active.hyphenated {
                    d += if cur_p.is_some() {
                        i64::from(options.double_hyphen_demerits)
                    } else {
                        i64::from(options.final_hyphen_demerits)
                    };
                }
                if !fit.is_adjacent(active.fitness) {
                    d += i64::from(options.adj_demerits);
                }
            }

            if self.tracer.is_some() {
                let d = if artificial_demerits { None } else { Some(d) };
                self.trace_feasible_break(cur_p, active.break_node, b, pi, d);
            }

            d += active.total_demerits;
            let f = fit.index();
            if d <= self.minimal_demerits[f] {
                self.minimal_demerits[f] = d;
                self.best_place[f] = active.break_node;
                self.best_pl_line[f] = l;
                if d < self.minimum_demerits {
                    self.minimum_demerits = d;
                }
            }

            if !node_r_stays_active {
                self.deactivate(&mut walk);
            }
        }
    }

    /// Removes the active node following `walk.prev_r`, keeping the deltas around it exact.
    fn deactivate(&mut self, walk: &mut Walk) {
        self.set.remove_after(walk.prev_r);

        if walk.prev_r == HEAD {
            if let Some(first) = self.set.first() {
                if let Some(delta) = self.set.delta(first) {
                    self.active_width += delta;
                    walk.cur_active_width = self.active_width;
                    self.set.remove_after(HEAD);
                }
            }
        } else if let Some(prev_delta) = self.set.delta(walk.prev_r) {
            match self.set.link(walk.prev_r) {
                None => {
                    walk.cur_active_width -= prev_delta;
                    self.set.remove_after(walk.prev_prev_r);
                    walk.prev_r = walk.prev_prev_r;
                }
                Some(next) => {
                    if let Some(next_delta) = self.set.delta(next) {
                        walk.cur_active_width += next_delta;
                        if let Some(delta) = self.set.delta_mut(walk.prev_r) {
                            *delta += next_delta;
                        }
                        self.set.remove_after(walk.prev_r);
                    }
                }
            }
        }
    }

    /// Turns the best feasible breaks recorded for each fitness class into active nodes,
    /// inserted before `r`.
    fn create_active_nodes(
        &mut self,
        walk: &mut Walk,
        r: Option<usize>,
        hyphenated: bool,
        cur_p: Option<usize>,
    ) {
        if walk.no_break_yet {
            walk.no_break_yet = false;
            self.compute_break_width(hyphenated, cur_p);
        }

        let before = self.break_width - walk.cur_active_width;
        if self.set.is_delta(walk.prev_r) {
            if let Some(delta) = self.set.delta_mut(walk.prev_r) {
                *delta += before;
            }
        } else if walk.prev_r == HEAD {
            self.active_width = self.break_width;
        } else {
            let q = self.set.insert_after(walk.prev_r, Slot::Delta(before));
            walk.prev_prev_r = walk.prev_r;
            walk.prev_r = q;
        }

        let adj_demerits = i64::from(self.options.adj_demerits).abs();
        if adj_demerits >= AWFUL_BAD - self.minimum_demerits {
            self.minimum_demerits = AWFUL_BAD - 1;
        } else {
            self.minimum_demerits += adj_demerits;
        }

        for &fit in Fitness::ALL.iter() {
            let f = fit.index();
            if self.minimal_demerits[f] <= self.minimum_demerits {
                let passive = self.set.push_passive(cur_p, self.best_place[f]);
                let node = ActiveNode {
                    fitness: fit,
                    hyphenated,
                    total_demerits: self.minimal_demerits[f],
                    line_number: self.best_pl_line[f] + 1,
                    break_node: Some(passive),
                };
                self.breakpoints.push(Breakpoint {
                    position: cur_p,
                    line: self.best_pl_line[f],
                    fitness: fit,
                    hyphenated,
                    total_demerits: node.total_demerits,
                });
                walk.prev_r = self.set.insert_after(walk.prev_r, Slot::Active(node));

                if self.tracer.is_some() {
                    let line = format!(
                        "@@{}: line {}.{}{} t={} -> @@{}",
                        self.set.serial(Some(passive)),
                        self.best_pl_line[f],
                        fit,
                        if hyphenated { "-" } else { "" },
                        node.total_demerits,
                        self.set.serial(self.best_place[f]),
                    );
                    self.trace(&line);
                }
            }
            self.minimal_demerits[f] = AWFUL_BAD;
        }
        self.minimum_demerits = AWFUL_BAD;

        if r.is_some() {
            let after = walk.cur_active_width - self.break_width;
            let q = self.set.insert_after(walk.prev_r, Slot::Delta(after));
            walk.prev_prev_r = walk.prev_r;
            walk.prev_r = q;
        }
    }

    /// The width of an empty line starting after a break at `cur_p`: the background, less
    /// what disappears after the break.
    fn compute_break_width(&mut self, hyphenated: bool, cur_p: Option<usize>) {
        self.break_width = self.background;
        let mut s = cur_p;

        if let (true, Some(p)) = (hyphenated, cur_p) {
            if let Node::Discretionary(disc) = &self.nodes[p] {
                let end = (p + 1 + disc.replace_count).min(self.nodes.len());
                for node in &self.nodes[p + 1..end] {
                    self.break_width.sub_width(node.width());
                }
                for node in &disc.post_break {
                    self.break_width.add_width(node.width());
                }
                self.break_width.add_width(self.disc_width);
                s = if disc.post_break.is_empty() {
                    Some(end)
                } else {
                    None
                };
            }
        }

        if let Some(start) = s {
            for node in self.nodes.iter().skip(start) {
                match node {
                    Node::Glue(glue) => self.break_width.sub_glue(glue),
                    Node::Penalty(_) => (),
                    Node::Math(math) => self.break_width.sub_width(math.width),
                    Node::Kern(kern) if kern.kind == KernKind::Explicit => {
                        self.break_width.sub_width(kern.width)
                    }
                    _ => break,
                }
            }
        }
    }

    fn trace_feasible_break(
        &mut self,
        cur_p: Option<usize>,
        break_node: Option<usize>,
        b: i64,
        pi: i64,
        d: Option<i64>,
    ) {
        let upto = cur_p.map_or(self.nodes.len(), |p| p + 1);
        if self.printed < upto || cur_p.is_none() {
            let text = short_display(&self.nodes[self.printed.min(upto)..upto]);
            self.trace(&text);
            self.printed = upto;
        }

        let b = if b > INF_BAD {
            String::from("*")
        } else {
            b.to_string()
        };
        let d = d.map_or_else(|| String::from("*"), |d| d.to_string());
        let line = format!(
            "@{} via @@{} b={} p={} d={}",
            break_name(cur_p.map(|p| &self.nodes[p])),
            self.set.serial(break_node),
            b,
            pi,
            d
        );
        self.trace(&line);
    }

    /// Cuts the list at the chosen breakpoints and packs the lines.
    fn post_line_break(
        &mut self,
        choice: &Choice,
        before_display: bool,
    ) -> Result<(Vec<VerticalItem>, Vec<Breakpoint>)> {
        let options = self.options;
        let chain = self.set.path(choice.break_node);

        let mut rest: VecDeque<Node> = std::mem::take(&mut self.nodes).into();
        let mut consumed = 0;
        let mut carry: Vec<Node> = vec![];
        let mut items = vec![];
        let mut breaks = Vec::with_capacity(chain.len());
        let mut cur_line = options.prev_graf + 1;

        for (i, &passive) in chain.iter().enumerate() {
            let position = self.set.passive(passive).cur_break;
            let end = position.unwrap_or(consumed + rest.len());
            if end < consumed || end - consumed > rest.len() {
                return Err(Error::LineBreaking(format!(
                    "breakpoint {} is out of the list",
                    end
                )));
            }

            let mut line = std::mem::take(&mut carry);
            line.extend(rest.drain(..end - consumed));
            consumed = end;

            let mut disc_break = false;
            let right_skip = Node::Glue(self.right_skip);
            let break_node = if position.is_some() {
                rest.pop_front()
            } else {
                None
            };
            match break_node {
                None => line.push(right_skip),
                Some(node) => {
                    consumed += 1;
                    match node {
                        Node::Glue(_) => line.push(right_skip),
                        Node::Discretionary(disc) => {
                            let dropped = disc.replace_count.min(rest.len());
                            rest.drain(..dropped);
                            consumed += dropped;
                            line.push(Node::Discretionary(DiscretionaryNode::default()));
                            line.extend(disc.pre_break);
                            line.push(right_skip);
                            carry = disc.post_break;
                            disc_break = true;
                        }
                        Node::Math(mut math) => {
                            math.width = Sp(0);
                            line.push(Node::Math(math));
                            line.push(right_skip);
                        }
                        Node::Kern(mut kern) => {
                            kern.width = Sp(0);
                            line.push(Node::Kern(kern));
                            line.push(right_skip);
                        }
                        other => {
                            line.push(other);
                            line.push(right_skip);
                        }
                    }
                }
            }

            if !self.left_skip.is_zero() {
                line.insert(0, Node::Glue(self.left_skip));
            }

            let geometry = self.shape.line(cur_line);
            let (mut hbox, migrated) = hpack(line, geometry.width, options);
            hbox.shift = geometry.indent;
            items.push(VerticalItem::Line(hbox));
            items.extend(migrated.into_iter().map(VerticalItem::Migrated));

            if cur_line + 1 != choice.line {
                let mut penalty = options.inter_line_penalty;
                if cur_line == options.prev_graf + 1 {
                    penalty += options.club_penalty;
                }
                if cur_line + 2 == choice.line {
                    penalty += if before_display {
                        options.display_widow_penalty
                    } else {
                        options.widow_penalty
                    };
                }
                if disc_break {
                    penalty += options.broken_penalty;
                }
                if penalty != 0 {
                    items.push(VerticalItem::Penalty(penalty));
                }
            }

            breaks.push(self.breakpoints[passive]);
            cur_line += 1;

            // Discardable items after a break vanish, unless a discretionary left some
            // material for the next line.
            if let (Some(&next), true) = (chain.get(i + 1), carry.is_empty()) {
                let next_break = self.set.passive(next).cur_break;
                while let Some(node) = rest.front() {
                    if next_break == Some(consumed) || !node.is_discardable() {
                        break;
                    }
                    rest.pop_front();
                    consumed += 1;
                }
            }
        }

        if !rest.is_empty() || cur_line != choice.line {
            return Err(Error::LineBreaking(format!(
                "{} lines made instead of {}, {} nodes left",
                cur_line - options.prev_graf - 1,
                choice.line - options.prev_graf - 1,
                rest.len()
            )));
        }

        Ok((items, breaks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::paragraphs::items::RuleNode;
    use crate::layout::paragraphs::packing::GlueSign;
    use crate::layout::paragraphs::trace::MemoryTracer;

    fn glyph(code: u8, width: i64) -> Node {
        Node::Char(CharNode {
            font: 0,
            code,
            width: Sp::pt(width),
            height: Sp::pt(7),
            depth: Sp(0),
        })
    }

    fn options(hsize: i64) -> TypesettingOptions {
        TypesettingOptions {
            hsize: Sp::pt(hsize),
            ..TypesettingOptions::default()
        }
    }

    fn ragged_right(hsize: i64) -> TypesettingOptions {
        TypesettingOptions {
            right_skip: Glue::fil(Sp(0), Sp::pt(1), GlueOrder::Fil),
            ..options(hsize)
        }
    }

    /// Six words of 30pt, separated by glue that can only stretch.
    fn six_words() -> Paragraph {
        let mut paragraph = Paragraph::new();
        for i in 0..6 {
            if i > 0 {
                paragraph.push(Node::Glue(Glue::new(Sp::pt(10), Sp::pt(20), Sp(0))));
            }
            paragraph.push(glyph(b'a', 30));
        }
        paragraph
    }

    fn penalties(broken: &BrokenParagraph) -> Vec<i32> {
        broken
            .items
            .iter()
            .filter_map(|item| match item {
                VerticalItem::Penalty(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_paragraph() {
        let mut options = options(100);
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(Paragraph::new())
            .unwrap();

        assert_eq!(broken.lines().count(), 1);
        assert_eq!(broken.pass, Pass::First);
        assert_eq!(broken.total_demerits, 100);
        assert_eq!(options.prev_graf, 1);
    }

    #[test]
    fn exact_fit_on_one_line() {
        let mut paragraph = Paragraph::new();
        for i in 0..4 {
            if i > 0 {
                paragraph.push(Node::Glue(Glue::natural(Sp::pt(12))));
            }
            paragraph.push(glyph(b'a', 8));
            paragraph.push(glyph(b'b', 8));
        }

        let mut options = TypesettingOptions {
            tolerance: 10_000,
            ..options(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        let lines: Vec<_> = broken.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, Sp::pt(100));
        assert_eq!(lines[0].badness, 0);
        assert_eq!(broken.pass, Pass::First);
        assert_eq!(broken.breaks[0].total_demerits, 100);
        assert_eq!(broken.breaks[0].fitness, Fitness::Decent);
        assert_eq!(broken.breaks[0].position, None);
    }

    #[test]
    fn word_too_long_for_the_line() {
        let paragraph = Paragraph::from_nodes((0..20).map(|_| glyph(b'a', 10)).collect());
        let mut options = options(100);
        let mut tracer = MemoryTracer::new();
        let broken = LineBreaker::new(&mut options)
            .tracer(&mut tracer)
            .break_paragraph(paragraph)
            .unwrap();

        let lines: Vec<_> = broken.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_overfull());
        assert_eq!(broken.pass, Pass::Second);
        assert_eq!(broken.total_demerits, 0);
        assert_eq!(broken.breaks[0].fitness, Fitness::Tight);

        assert_eq!(
            tracer.lines,
            [
                "@firstpass",
                "@secondpass",
                "aaaaaaaaaaaaaaaaaaaa ",
                "@\\par via @@0 b=* p=-10000 d=*",
                "@@1: line 1.3- t=0 -> @@0",
            ]
        );
    }

    #[test]
    fn emergency_pass() {
        let paragraph = Paragraph::from_nodes((0..20).map(|_| glyph(b'a', 10)).collect());
        let mut options = TypesettingOptions {
            emergency_stretch: Sp::pt(10),
            ..options(100)
        };
        let mut tracer = MemoryTracer::new();
        let broken = LineBreaker::new(&mut options)
            .tracer(&mut tracer)
            .break_paragraph(paragraph)
            .unwrap();

        assert_eq!(broken.pass, Pass::Emergency);
        assert_eq!(broken.lines().count(), 1);
        assert!(tracer.lines.iter().any(|l| l == "@emergencypass"));
    }

    #[test]
    fn optimal_breaks() {
        let mut options = TypesettingOptions {
            tolerance: 10_000,
            ..options(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(six_words())
            .unwrap();

        assert_eq!(broken.pass, Pass::Second);
        assert_eq!(broken.lines().count(), 3);
        // Two very loose lines of badness 336, and a decent last line.
        assert_eq!(broken.total_demerits, 259_532);
        let fitness: Vec<_> = broken.breaks.iter().map(|b| b.fitness).collect();
        assert_eq!(
            fitness,
            [Fitness::VeryLoose, Fitness::VeryLoose, Fitness::Decent]
        );
        let lines: Vec<_> = broken.breaks.iter().map(|b| b.line).collect();
        assert_eq!(lines, [1, 2, 3]);

        for line in broken.lines() {
            assert_eq!(line.width, Sp::pt(100));
        }
        let first = broken.lines().next().unwrap();
        assert_eq!(first.badness, 336);
        // Word, glue, word and the right skip replacing the glue of the break.
        assert_eq!(first.list.len(), 4);

        // Club penalty after the first line, widow penalty before the last one.
        assert_eq!(penalties(&broken), [150, 150]);
        assert_eq!(options.prev_graf, 3);
    }

    #[test]
    fn penalties_before_a_display() {
        let mut paragraph = six_words();
        paragraph.before_display = true;
        let mut options = TypesettingOptions {
            tolerance: 10_000,
            inter_line_penalty: 5,
            ..options(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        assert_eq!(penalties(&broken), [155, 55]);
    }

    #[test]
    fn looseness() {
        let mut options = TypesettingOptions {
            tolerance: 10_000,
            looseness: 1,
            ..options(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(six_words())
            .unwrap();
        assert_eq!(broken.lines().count(), 4);
        assert!(broken.total_demerits >= 100_000_000);

        // No two line paragraph exists: the optimum is kept.
        let mut options = TypesettingOptions {
            tolerance: 10_000,
            looseness: -1,
            ..self::options(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(six_words())
            .unwrap();
        assert_eq!(broken.lines().count(), 3);
        assert_eq!(broken.total_demerits, 259_532);
    }

    #[test]
    fn hanging_indentation() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 30),
            Node::Penalty(-10_000),
            glyph(b'b', 30),
            Node::Penalty(-10_000),
            glyph(b'c', 30),
        ]);
        let mut options = TypesettingOptions {
            hang_indent: Sp::pt(20),
            ..ragged_right(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        let geometry: Vec<_> = broken.lines().map(|l| (l.width, l.shift)).collect();
        assert_eq!(
            geometry,
            [
                (Sp::pt(100), Sp(0)),
                (Sp::pt(80), Sp::pt(20)),
                (Sp::pt(80), Sp::pt(20))
            ]
        );
        assert_eq!(broken.pass, Pass::First);
        assert_eq!(broken.total_demerits, 300);

        let text: Vec<_> = broken.lines().map(|l| short_display(&l.list)).collect();
        assert_eq!(text, ["a ", "b ", "c  "]);
    }

    #[test]
    fn break_at_a_discretionary() {
        let disc = DiscretionaryNode {
            pre_break: vec![glyph(b'-', 10)],
            post_break: vec![glyph(b'b', 10)],
            replace_count: 1,
        };
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'x', 60),
            Node::Discretionary(disc),
            glyph(b'c', 10),
            glyph(b'y', 50),
        ]);
        let mut options = ragged_right(100);
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        assert_eq!(broken.pass, Pass::First);
        assert_eq!(broken.breaks.len(), 2);
        assert!(broken.breaks[0].hyphenated);
        assert_eq!(broken.breaks[0].position, Some(1));
        // Hyphen penalty, then the final hyphen demerits.
        assert_eq!(broken.total_demerits, 2_600 + 5_100);

        let text: Vec<_> = broken.lines().map(|l| short_display(&l.list)).collect();
        assert_eq!(text, ["x- ", "by  "]);

        // Club, widow and broken penalties.
        assert_eq!(penalties(&broken), [400]);
    }

    #[test]
    fn discardable_items_after_a_break() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 30),
            Node::Penalty(-10_000),
            Node::Glue(Glue::natural(Sp::pt(5))),
            Node::kern(Sp::pt(3)),
            Node::Rule(RuleNode {
                width: Sp::pt(1),
                height: Sp::pt(1),
                depth: Sp(0),
            }),
            glyph(b'b', 30),
        ]);
        let mut options = ragged_right(100);
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        let text: Vec<_> = broken.lines().map(|l| short_display(&l.list)).collect();
        assert_eq!(text, ["a ", "|b  "]);
    }

    #[test]
    fn migrated_material() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 30),
            Node::Mark(String::from("section")),
            Node::Penalty(-10_000),
            glyph(b'b', 30),
        ]);
        let mut options = ragged_right(100);
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        assert!(matches!(broken.items[0], VerticalItem::Line(_)));
        assert_eq!(
            broken.items[1],
            VerticalItem::Migrated(Node::Mark(String::from("section")))
        );
    }

    #[derive(Default)]
    struct Recorder {
        words: Vec<String>,
    }

    impl Hyphenator for Recorder {
        fn word_breaks(&mut self, word: &str) -> Result<Vec<usize>> {
            self.words.push(word.to_owned());
            Ok(vec![2])
        }
    }

    #[test]
    fn hyphenation_on_the_second_pass() {
        let mut paragraph = Paragraph::new();
        for (i, word) in ["hello", "world", "again"].iter().enumerate() {
            if i > 0 {
                paragraph.push(Node::Glue(Glue::new(Sp::pt(3), Sp::pt(1), Sp::pt(1))));
            }
            for c in word.bytes() {
                paragraph.push(glyph(c, 5));
            }
        }
        paragraph.set_hyphen_char(CharNode {
            font: 0,
            code: b'-',
            width: Sp::pt(3),
            height: Sp(0),
            depth: Sp(0),
        });

        let mut options = TypesettingOptions {
            pretolerance: -1,
            ..TypesettingOptions::default()
        };
        let mut recorder = Recorder::default();
        let broken = LineBreaker::new(&mut options)
            .hyphenator(&mut recorder)
            .break_paragraph(paragraph)
            .unwrap();

        assert_eq!(recorder.words, ["world", "again"]);
        assert_eq!(broken.pass, Pass::Second);

        let line = broken.lines().next().unwrap();
        let discretionaries = line
            .list
            .iter()
            .filter(|n| matches!(n, Node::Discretionary(_)))
            .count();
        assert_eq!(discretionaries, 2);
    }

    #[test]
    fn no_hyphenation_on_the_first_pass() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 5),
            Node::Glue(Glue::new(Sp::pt(3), Sp::pt(1), Sp::pt(1))),
            glyph(b'b', 5),
        ]);
        let mut options = ragged_right(100);
        let mut recorder = Recorder::default();
        let broken = LineBreaker::new(&mut options)
            .hyphenator(&mut recorder)
            .break_paragraph(paragraph)
            .unwrap();

        assert_eq!(broken.pass, Pass::First);
        assert!(recorder.words.is_empty());
    }

    #[test]
    fn infinite_shrink_is_made_finite() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 60),
            Node::Glue(Glue {
                shrink: Sp::pt(30),
                shrink_order: GlueOrder::Fil,
                ..Glue::natural(Sp::pt(10))
            }),
            glyph(b'b', 40),
        ]);
        let mut options = options(100);
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        // 110pt with 30pt of finite shrink still fits on one line.
        assert_eq!(broken.lines().count(), 1);
        let line = broken.lines().next().unwrap();
        assert_eq!(line.glue_set.sign, GlueSign::Shrinking);
        assert_eq!(line.glue_set.order, GlueOrder::Normal);
    }

    #[test]
    fn prev_graf_numbers_lines() {
        let paragraph = Paragraph::from_nodes(vec![
            glyph(b'a', 30),
            Node::Penalty(-10_000),
            glyph(b'b', 30),
        ]);
        let mut options = TypesettingOptions {
            prev_graf: 4,
            ..ragged_right(100)
        };
        let broken = LineBreaker::new(&mut options)
            .break_paragraph(paragraph)
            .unwrap();

        let lines: Vec<_> = broken.breaks.iter().map(|b| b.line).collect();
        assert_eq!(lines, [5, 6]);
        assert_eq!(broken.prev_graf, 6);
        assert_eq!(options.prev_graf, 6);
        // Club and widow penalties on the same break.
        assert_eq!(penalties(&broken), [300]);
    }
}
