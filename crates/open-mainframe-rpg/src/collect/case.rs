//! `CASxx` chain collection.
//!
//! ```text
//!      C     SEL           CASEQ     '1'           SR1
//!      C     SEL           CASEQ     '2'           SR2
//!      C                   CAS                     SR3
//!      C                   ENDCS
//! ```
//!
//! becomes a `SELECT` group whose `WHEN` clauses all compare the selector
//! from the first line. `ENDCS` is converted on its own, to `ENDSL`.

use super::cspec::line_opcode;
use super::{extend_forward, prev_code_line, CollectedStmt};
use crate::opcode::{is_case_opcode, Comparison};
use crate::source::col;

/// One `CASxx` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseArm {
    pub comparison: Comparison,
    /// Factor 2 of the line.
    pub value: String,
    /// Subroutine named in the result field.
    pub subroutine: String,
}

/// A whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseChain {
    /// Factor 1 of the first line.
    pub selector: String,
    pub arms: Vec<CaseArm>,
    /// Subroutine of a trailing bare `CAS`.
    pub otherwise: Option<String>,
}

impl CaseChain {
    /// Free-form statements, without terminating `;`.
    pub fn render(&self) -> Vec<String> {
        let mut out = vec!["SELECT".to_string()];
        for arm in &self.arms {
            out.push(format!(
                "WHEN ({} {} {})",
                self.selector,
                arm.comparison.symbol(),
                arm.value
            ));
            out.push(format!("EXSR {}", arm.subroutine));
        }
        if let Some(sr) = &self.otherwise {
            out.push("OTHER".to_string());
            out.push(format!("EXSR {sr}"));
        }
        out
    }
}

fn is_bare_cas(line: &str) -> bool {
    line_opcode(line).is_some_and(|op| op.name == "CAS")
}

fn is_cas(line: &str) -> bool {
    line_opcode(line).is_some_and(|op| is_case_opcode(&op.name))
}

/// First line of the chain containing `index`.
pub fn find_chain_start(lines: &[String], index: usize) -> usize {
    let mut first = index;
    while let Some(p) = prev_code_line(lines, first) {
        // A bare CAS always ends the chain above it.
        if is_cas(&lines[p]) && !is_bare_cas(&lines[p]) {
            first = p;
        } else {
            break;
        }
    }
    first
}

/// Collect the chain starting at `op_idx` into `stmt`.
pub(crate) fn collect_into(stmt: &mut CollectedStmt, lines: &[String], op_idx: usize) -> CaseChain {
    if !is_bare_cas(&lines[op_idx]) {
        extend_forward(stmt, lines, |prev, line| is_cas(line) && !is_bare_cas(prev));
    }

    let selector = col(&lines[op_idx], 12, 25);
    let mut arms = Vec::new();
    let mut otherwise = None;
    for (line, &idx) in stmt.lines.iter().zip(&stmt.indexes) {
        if idx < op_idx {
            continue;
        }
        let Some(op) = line_opcode(line) else {
            continue;
        };
        let subroutine = col(line, 50, 63);
        match op.comparison() {
            Some((_, comparison)) => arms.push(CaseArm {
                comparison,
                value: col(line, 36, 49),
                subroutine,
            }),
            None => otherwise = Some(subroutine),
        }
    }

    CaseChain {
        selector,
        arms,
        otherwise,
    }
}

#[cfg(test)]
mod tests {
    use super::super::{collect_at, Detail};
    use super::*;

    fn calc(f1: &str, op: &str, f2: &str, result: &str) -> String {
        format!("     C     {:<14}{:<10}{:<14}{:<14}", f1, op, f2, result)
    }

    fn chain_lines() -> Vec<String> {
        vec![
            calc("SEL", "CASEQ", "'1'", "SR1"),
            calc("SEL", "CASEQ", "'2'", "SR2"),
            calc("", "CAS", "", "SR3"),
            calc("", "ENDCS", "", ""),
        ]
    }

    #[test]
    fn test_chain_renders_select() {
        let lines = chain_lines();
        for start in 0..3 {
            let stmt = collect_at(&lines, start).unwrap();
            assert_eq!(stmt.indexes, vec![0, 1, 2]);
            let Detail::Case(chain) = &stmt.detail else {
                panic!("expected case chain");
            };
            assert_eq!(
                chain.render(),
                vec![
                    "SELECT",
                    "WHEN (SEL = '1')",
                    "EXSR SR1",
                    "WHEN (SEL = '2')",
                    "EXSR SR2",
                    "OTHER",
                    "EXSR SR3",
                ]
            );
        }
    }

    #[test]
    fn test_selector_fixed_to_first_line() {
        let lines = vec![
            calc("CODE", "CASLT", "5", "LOW"),
            calc("OTHERVAR", "CASGE", "5", "HIGH"),
        ];
        let stmt = collect_at(&lines, 1).unwrap();
        let Detail::Case(chain) = &stmt.detail else {
            panic!("expected case chain");
        };
        assert_eq!(chain.render()[3], "WHEN (CODE >= 5)");
        assert_eq!(chain.otherwise, None);
    }

    #[test]
    fn test_adjacent_chains_split_after_bare_cas() {
        let lines = vec![
            calc("A", "CASEQ", "1", "SR1"),
            calc("", "CAS", "", "SR2"),
            calc("B", "CASEQ", "2", "SR3"),
        ];
        assert_eq!(collect_at(&lines, 1).unwrap().indexes, vec![0, 1]);
        assert_eq!(collect_at(&lines, 2).unwrap().indexes, vec![2]);
    }
}
