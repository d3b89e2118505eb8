//! File spec collection.
//!
//! A file description is its header line (file name in columns 7-16)
//! followed by keyword lines with columns 7-43 blank.

use super::{extend_forward, prev_code_line, CollectedStmt, StmtKind};
use crate::source::{col, is_blank, spec_type, SpecType};

fn is_file(line: &str) -> bool {
    spec_type(line) == Some(SpecType::File)
}

fn is_continuation(line: &str) -> bool {
    is_file(line) && is_blank(line, 7, 43)
}

/// Collect the file description containing line `index`.
pub fn collect(lines: &[String], index: usize) -> CollectedStmt {
    let mut first = index;
    while is_continuation(&lines[first]) {
        match prev_code_line(lines, first) {
            Some(p) if is_file(&lines[p]) => first = p,
            _ => break,
        }
    }
    let mut stmt = CollectedStmt::single(StmtKind::Spec(SpecType::File), lines, first);
    extend_forward(&mut stmt, lines, |_, line| is_continuation(line));
    let name = col(&lines[first], 7, 16);
    stmt.entity_name = (!name.is_empty()).then_some(name);
    stmt
}
