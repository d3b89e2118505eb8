//! Compound condition collection.
//!
//! `IFxx`, `WHENxx`, `DOWxx` and `DOUxx` compare factor 1 with factor 2
//! and may be extended by any number of `ANDxx`/`ORxx` lines:
//!
//! ```text
//!      C     A             IFEQ      B
//!      C     C             OREQ      D
//! ```
//!
//! becomes `IF A = B or C = D`.

use super::cspec::line_opcode;
use super::{extend_forward, prev_code_line, CollectedStmt};
use crate::opcode::{is_and_or_opcode, is_boolean_opcode, Comparison};
use crate::source::col;

/// Clause joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn keyword(self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }
}

/// One `factor1 op factor2` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// `None` for the opener's own comparison.
    pub connector: Option<Connector>,
    pub factor1: String,
    pub comparison: Comparison,
    pub factor2: String,
}

/// A compound condition statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanBlock {
    /// Opener line.
    pub index: usize,
    /// Free-form keyword, in the case it was written (`IF`, `when`, ...).
    pub keyword: String,
    /// Comparisons, in source order.
    pub clauses: Vec<Clause>,
    /// Conditioning indicator expression of the opener.
    pub condition: Option<String>,
}

impl BooleanBlock {
    /// The condition as a free-form expression.
    pub fn expression(&self) -> String {
        let mut expr = String::new();
        for clause in &self.clauses {
            if let Some(conn) = clause.connector {
                expr.push(' ');
                expr.push_str(conn.keyword());
                expr.push(' ');
            }
            expr.push_str(&format!(
                "{} {} {}",
                clause.factor1,
                clause.comparison.symbol(),
                clause.factor2
            ));
        }
        expr
    }

    /// The complete free-form statement, without the terminating `;`.
    pub fn render(&self) -> String {
        match &self.condition {
            Some(cond) => format!("{} ({}) and ({})", self.keyword, cond, self.expression()),
            None => format!("{} {}", self.keyword, self.expression()),
        }
    }
}

/// Walk back from an `ANDxx`/`ORxx` line to its opener.
pub fn find_opener(lines: &[String], index: usize) -> Option<usize> {
    let mut i = index;
    loop {
        let p = prev_code_line(lines, i)?;
        let op = line_opcode(&lines[p])?;
        if is_boolean_opcode(&op.name) {
            return Some(p);
        }
        if !is_and_or_opcode(&op.name) {
            return None;
        }
        i = p;
    }
}

fn clause_from(line: &str, connector: Option<Connector>) -> Option<Clause> {
    let op = line_opcode(line)?;
    let (_, comparison) = op.comparison()?;
    Some(Clause {
        connector,
        factor1: col(line, 12, 25),
        comparison,
        factor2: col(line, 36, 49),
    })
}

/// Collect the opener at `op_idx` and its `ANDxx`/`ORxx` lines into `stmt`.
pub(crate) fn collect_into(
    stmt: &mut CollectedStmt,
    lines: &[String],
    op_idx: usize,
    condition: Option<String>,
) -> BooleanBlock {
    extend_forward(stmt, lines, |_, line| {
        line_opcode(line).is_some_and(|op| is_and_or_opcode(&op.name))
    });

    let raw = col(&lines[op_idx], 26, 35);
    let raw_name = raw.split('(').next().unwrap_or("").trim();
    let keyword = raw_name
        .get(..raw_name.len().saturating_sub(2))
        .unwrap_or(raw_name)
        .to_string();

    let mut clauses = Vec::new();
    for (line, &idx) in stmt.lines.iter().zip(&stmt.indexes) {
        if idx < op_idx {
            continue;
        }
        let connector = if idx == op_idx {
            None
        } else {
            match line_opcode(line).map(|op| op.name) {
                Some(name) if name.starts_with("OR") => Some(Connector::Or),
                _ => Some(Connector::And),
            }
        };
        if let Some(clause) = clause_from(line, connector) {
            clauses.push(clause);
        }
    }

    BooleanBlock {
        index: op_idx,
        keyword,
        clauses,
        condition,
    }
}

#[cfg(test)]
mod tests {
    use super::super::{collect_at, Detail};
    use super::*;

    fn calc(ind: &str, f1: &str, op: &str, f2: &str) -> String {
        format!("     C  {:<3}{:<14}{:<10}{:<14}", ind, f1, op, f2)
    }

    #[test]
    fn test_if_or_collects_both_lines() {
        let lines = vec![
            calc("", "A", "IFEQ", "B"),
            calc("", "C", "OREQ", "D"),
            calc("", "", "ENDIF", ""),
        ];
        for start in [0, 1] {
            let stmt = collect_at(&lines, start).unwrap();
            assert_eq!(stmt.indexes, vec![0, 1]);
            let Detail::Boolean(block) = &stmt.detail else {
                panic!("expected boolean block");
            };
            assert_eq!(block.render(), "IF A = B or C = D");
        }
        assert_eq!(collect_at(&lines, 2).unwrap().indexes, vec![2]);
    }

    #[test]
    fn test_keyword_case_and_connectors() {
        let lines = vec![
            calc("", "X", "dowlt", "10"),
            calc("", "Y", "andne", "'Q'"),
        ];
        let stmt = collect_at(&lines, 0).unwrap();
        let Detail::Boolean(block) = &stmt.detail else {
            panic!("expected boolean block");
        };
        assert_eq!(block.render(), "dow X < 10 and Y <> 'Q'");
    }

    #[test]
    fn test_conditioning_wraps_expression() {
        let lines = vec![calc("50", "A", "IFGT", "B")];
        let stmt = collect_at(&lines, 0).unwrap();
        let Detail::Boolean(block) = &stmt.detail else {
            panic!("expected boolean block");
        };
        assert_eq!(block.render(), "IF (*IN50) and (A > B)");
    }

    #[test]
    fn test_orphan_or_has_no_statement() {
        let lines = vec![calc("", "A", "ADD", "B"), calc("", "C", "OREQ", "D")];
        assert!(collect_at(&lines, 1).is_none());
    }
}
