//! Diagnostics of the paragraph builder, in the format of `\tracingparagraphs`.

use crate::layout::paragraphs::items::Node;

/// Receives the trace of the paragraph builder, one line at a time.
pub trait Tracer {
    /// Records a line of the trace.
    fn trace(&mut self, line: &str);
}

/// Sends the trace to the log, with the `paragraph` target.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&mut self, line: &str) {
        info!(target: "paragraph", "{}", line);
    }
}

/// Keeps the trace in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryTracer {
    /// The lines traced so far.
    pub lines: Vec<String>,
}

impl MemoryTracer {
    /// Creates an empty tracer.
    pub fn new() -> MemoryTracer {
        MemoryTracer::default()
    }
}

impl Tracer for MemoryTracer {
    fn trace(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

fn push_short(out: &mut String, node: &Node) {
    match node {
        Node::Char(c) => out.push(c.code as char),
        Node::Ligature(l) => out.extend(l.original.iter().map(|&c| c as char)),
        Node::HBox(_) => out.push_str("[]"),
        Node::Rule(_) => out.push('|'),
        Node::Glue(g) if !g.is_zero() => out.push(' '),
        Node::Math(_) => out.push('$'),
        Node::Discretionary(d) => {
            for n in d.pre_break.iter().chain(d.post_break.iter()) {
                push_short(out, n);
            }
        }
        _ => (),
    }
}

/// Displays a list the way TeX shows the text of a paragraph in traces.
pub fn short_display(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_short(&mut out, node);
    }
    out
}

/// The name of a breakpoint in traces.
pub fn break_name(node: Option<&Node>) -> &'static str {
    match node {
        None => "\\par",
        Some(Node::Glue(_)) => "",
        Some(Node::Penalty(_)) => "\\penalty",
        Some(Node::Discretionary(_)) => "\\discretionary",
        Some(Node::Kern(_)) => "\\kern",
        Some(_) => "\\math",
    }
}
