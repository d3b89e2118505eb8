//! Extended factor 2 collection.
//!
//! Opcodes such as `EVAL`, `IF` and `CALLP` take free-form expression text
//! in columns 36-80, continued on lines whose columns 7-35 are blank. The
//! fragments are joined with the quote-aware rules of
//! [`crate::continuation`].

use super::cspec::is_ext_continuation;
use super::{extend_forward, CollectedStmt};
use crate::continuation::Joiner;
use crate::opcode::{is_valid_opcode, Opcode};
use crate::source::raw_col;

/// Collect continuation lines after the operation at `op_idx` and return
/// the joined factor 2 text.
pub(crate) fn collect_into(stmt: &mut CollectedStmt, lines: &[String], op_idx: usize) -> String {
    extend_forward(stmt, lines, |_, line| is_ext_continuation(line));

    let mut joiner = Joiner::new();
    for (line, &idx) in stmt.lines.iter().zip(&stmt.indexes) {
        if idx >= op_idx {
            joiner.push(&raw_col(line, 36, 80));
        }
    }
    joiner.finish()
}

/// Whether the `EVAL`/`CALLP` keyword can be dropped in front of `text`.
///
/// The keyword stays when extenders are present, when the expression
/// starts with a name that reads as an opcode, or for a `CALLP` of a
/// procedure without a parameter list.
pub fn elide_keyword(opcode: &Opcode, text: &str) -> bool {
    if !matches!(opcode.name.as_str(), "EVAL" | "CALLP") || !opcode.extenders.is_empty() {
        return false;
    }
    let first = text
        .split(|c: char| c.is_whitespace() || c == '(' || c == '=' || c == ';')
        .next()
        .unwrap_or("");
    if first.is_empty() || is_valid_opcode(first) {
        return false;
    }
    if opcode.name == "CALLP" && !text.contains('(') {
        return false;
    }
    true
}

/// The free-form statement for an extended factor 2 operation.
pub fn render(opcode: &Opcode, text: &str) -> String {
    if elide_keyword(opcode, text) {
        text.to_string()
    } else if text.is_empty() {
        opcode.to_string()
    } else {
        format!("{opcode} {text}")
    }
}
