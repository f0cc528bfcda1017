//! Multi-line rendering of plans
//!
//! The deep form of a plan already carries its nesting in its punctuation,
//! so pretty printing is a single scan over that text.

use crate::plan::InjectionPlan;

const INDENT: &str = "  ";

/// Indent a flat plan string by its brackets
///
/// Rules, starting at depth 1 with two spaces per level:
/// - `()` / `[]` are copied unchanged
/// - `(` / `[`: newline at the current depth, then the bracket and a space;
///   depth goes up
/// - `)` / `]`: depth goes down, newline, then the bracket
/// - `|`: newline at the current depth, then `|`
/// - `,`: newline one level shallower, then `,`
#[must_use]
pub fn prettify(flat: &str) -> String {
    let mut out = String::with_capacity(flat.len() * 2);
    let mut depth: usize = 1;
    let mut chars = flat.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' | '[' => {
                let close = if c == '(' { ')' } else { ']' };
                if chars.peek() == Some(&close) {
                    chars.next();
                    out.push(c);
                    out.push(close);
                } else {
                    newline(&mut out, depth);
                    depth += 1;
                    out.push(c);
                    out.push(' ');
                }
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(c);
            }
            '|' => {
                newline(&mut out, depth);
                out.push(c);
            }
            ',' => {
                newline(&mut out, depth.saturating_sub(1));
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl InjectionPlan {
    /// Indented, human-readable form headed by the node's full name
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        prettify(&format!("{}:\n{self}", self.node().full_name()))
    }
}
