//! Control spec collection.
//!
//! Consecutive H lines form one `ctl-opt` statement.

use super::{extend_forward, prev_code_line, CollectedStmt, StmtKind};
use crate::source::{spec_type, SpecType};

fn is_control(line: &str) -> bool {
    spec_type(line) == Some(SpecType::Control)
}

/// Collect the run of H specs containing line `index`.
pub fn collect(lines: &[String], index: usize) -> CollectedStmt {
    let mut first = index;
    while let Some(p) = prev_code_line(lines, first) {
        if !is_control(&lines[p]) {
            break;
        }
        first = p;
    }
    let mut stmt = CollectedStmt::single(StmtKind::Spec(SpecType::Control), lines, first);
    extend_forward(&mut stmt, lines, |_, line| is_control(line));
    stmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_h_lines() {
        let lines: Vec<String> = [
            "     H DFTACTGRP(*NO)",
            "     H* activation group",
            "     H ACTGRP('QILE')",
            "     FCUST      IF   E             DISK",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let stmt = collect(&lines, 2);
        assert_eq!(stmt.indexes, vec![0, 2]);
        assert_eq!(stmt.comments.len(), 1);
    }
}
