//! Calculation spec collection.
//!
//! A calculation statement is:
//!
//! 1. optional conditioning lines (indicators in 9-11, `AN`/`OR` in 7-8,
//!    no opcode),
//! 2. the operation line,
//! 3. for extended factor 2 opcodes, continuation lines with columns 7-35
//!    blank, or for `IFxx`-style opcodes the `ANDxx`/`ORxx` lines, or for
//!    `CASxx` the rest of the chain.

use tracing::debug;

use super::{boolean, case, extfactor2, next_code_line, prev_code_line, CollectedStmt, Detail, StmtKind};
use crate::opcode::{is_and_or_opcode, is_boolean_opcode, is_case_opcode, is_ext_opcode, Opcode};
use crate::source::{col, is_blank, spec_type, SpecType, BODY_END};

/// One calculation operation, split into its fixed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcSpec {
    /// Source line of the operation.
    pub index: usize,
    /// Control level, columns 7-8.
    pub level: String,
    /// Conditioning expression built from columns 7-11 of the operation
    /// and any conditioning lines above it.
    pub condition: Option<String>,
    /// Factor 1, columns 12-25.
    pub factor1: String,
    /// Opcode and extenders, columns 26-35.
    pub opcode: Opcode,
    /// Factor 2, columns 36-49, or the joined extended factor 2 text.
    pub factor2: String,
    /// Result field, columns 50-63.
    pub result: String,
    /// Result field length, columns 64-68.
    pub length: String,
    /// Result field decimals, columns 69-70.
    pub decimals: String,
    /// High / first resulting indicator, columns 71-72.
    pub hi: String,
    /// Low / second resulting indicator, columns 73-74.
    pub lo: String,
    /// Equal / third resulting indicator, columns 75-76.
    pub eq: String,
    /// Factor 2 came from the extended area (columns 36-80).
    pub extended: bool,
}

impl CalcSpec {
    /// Split a single operation line.
    pub fn parse(line: &str, index: usize) -> Self {
        let opcode = Opcode::parse(&col(line, 26, 35));
        let extended = is_ext_opcode(&opcode.name);
        let factor2 = if extended {
            col(line, 36, BODY_END)
        } else {
            col(line, 36, 49)
        };
        let (result, length, decimals, hi, lo, eq) = if extended {
            Default::default()
        } else {
            (
                col(line, 50, 63),
                col(line, 64, 68),
                col(line, 69, 70),
                col(line, 71, 72),
                col(line, 73, 74),
                col(line, 75, 76),
            )
        };
        Self {
            index,
            level: col(line, 7, 8).to_ascii_uppercase(),
            condition: None,
            factor1: col(line, 12, 25),
            opcode,
            factor2,
            result,
            length,
            decimals,
            hi,
            lo,
            eq,
            extended,
        }
    }

    /// Resulting indicators in column order.
    pub fn indicators(&self) -> [&str; 3] {
        [&self.hi, &self.lo, &self.eq]
    }

    /// Any resulting indicator is present.
    pub fn has_indicators(&self) -> bool {
        self.indicators().iter().any(|i| !i.is_empty())
    }
}

fn is_calc(line: &str) -> bool {
    spec_type(line) == Some(SpecType::Calc)
}

/// Conditioning-only line: indicators but no operation.
pub(crate) fn is_indicator_only(line: &str) -> bool {
    is_calc(line) && !is_blank(line, 9, 11) && is_blank(line, 12, BODY_END)
}

/// Extended factor 2 continuation: columns 7-35 blank, text in 36-80.
pub(crate) fn is_ext_continuation(line: &str) -> bool {
    is_calc(line) && is_blank(line, 7, 35) && !is_blank(line, 36, BODY_END)
}

/// Opcode on a calculation line, if the line carries one.
pub(crate) fn line_opcode(line: &str) -> Option<Opcode> {
    if !is_calc(line) {
        return None;
    }
    let text = col(line, 26, 35);
    (!text.is_empty()).then(|| Opcode::parse(&text))
}

fn indicator_term(indicator: &str) -> Option<String> {
    let ind = indicator.trim().to_ascii_uppercase();
    if ind.is_empty() {
        return None;
    }
    Some(match ind.strip_prefix('N') {
        Some(rest) if !rest.is_empty() => format!("NOT *IN{}", rest.trim()),
        _ => format!("*IN{ind}"),
    })
}

/// Build the conditioning expression for an operation from its own
/// columns 7-11 and the conditioning-only lines above it.
pub(crate) fn condition_expr(lines: &[&str]) -> Option<String> {
    let mut expr = String::new();
    for line in lines {
        let level = col(line, 7, 8).to_ascii_uppercase();
        let Some(term) = indicator_term(&col(line, 9, 11)) else {
            continue;
        };
        if !expr.is_empty() {
            expr.push_str(if level == "OR" { " or " } else { " and " });
        }
        expr.push_str(&term);
    }
    if let Some(last) = lines.last() {
        let level = col(last, 7, 8).to_ascii_uppercase();
        let is_level = level == "LR"
            || (level.len() == 2 && level.starts_with('L') && level[1..].chars().all(|c| c.is_ascii_digit()));
        if is_level {
            expr = if expr.is_empty() {
                format!("*IN{level}")
            } else {
                format!("*IN{level} and ({expr})")
            };
        }
    }
    (!expr.is_empty()).then_some(expr)
}

/// Collect the calculation statement containing line `index`.
pub fn collect(lines: &[String], index: usize) -> Option<CollectedStmt> {
    let mut op_idx = index;

    if is_indicator_only(&lines[op_idx]) {
        while is_indicator_only(&lines[op_idx]) {
            match next_code_line(lines, op_idx) {
                Some(n) if is_calc(&lines[n]) => op_idx = n,
                _ => return Some(CollectedStmt::single(StmtKind::Spec(SpecType::Calc), lines, index)),
            }
        }
    } else if is_ext_continuation(&lines[op_idx]) {
        while is_ext_continuation(&lines[op_idx]) {
            match prev_code_line(lines, op_idx) {
                Some(p) if is_calc(&lines[p]) => op_idx = p,
                _ => return Some(CollectedStmt::single(StmtKind::Spec(SpecType::Calc), lines, index)),
            }
        }
        let orphan = line_opcode(&lines[op_idx]).map_or(true, |op| !is_ext_opcode(&op.name));
        if orphan {
            return Some(CollectedStmt::single(StmtKind::Spec(SpecType::Calc), lines, index));
        }
    }

    let Some(opcode) = line_opcode(&lines[op_idx]) else {
        return Some(CollectedStmt::single(StmtKind::Spec(SpecType::Calc), lines, index));
    };

    if is_and_or_opcode(&opcode.name) {
        op_idx = boolean::find_opener(lines, op_idx)?;
    } else if is_case_opcode(&opcode.name) {
        op_idx = case::find_chain_start(lines, op_idx);
    }

    // Conditioning lines above the operation.
    let mut first = op_idx;
    while let Some(p) = prev_code_line(lines, first) {
        if is_indicator_only(&lines[p]) {
            first = p;
        } else {
            break;
        }
    }

    let mut stmt = CollectedStmt::single(StmtKind::Spec(SpecType::Calc), lines, first);
    let mut i = first;
    while i < op_idx {
        match next_code_line(lines, i) {
            Some(n) => {
                for c in (i + 1)..n {
                    stmt.push_comment(lines, c);
                }
                stmt.push_line(lines, n);
                i = n;
            }
            None => break,
        }
    }

    let cond_lines: Vec<&str> = stmt.lines.iter().map(String::as_str).collect();
    let condition = condition_expr(&cond_lines);
    let opcode_name = line_opcode(&lines[op_idx]).map(|op| op.name).unwrap_or_default();

    stmt.detail = if is_boolean_opcode(&opcode_name) {
        Detail::Boolean(boolean::collect_into(&mut stmt, lines, op_idx, condition))
    } else if is_case_opcode(&opcode_name) {
        Detail::Case(case::collect_into(&mut stmt, lines, op_idx))
    } else {
        let mut calc = CalcSpec::parse(&lines[op_idx], op_idx);
        calc.condition = condition;
        if calc.extended {
            calc.factor2 = extfactor2::collect_into(&mut stmt, lines, op_idx);
        }
        Detail::Calc(calc)
    };

    debug!(
        first = stmt.first_index(),
        last = stmt.last_index(),
        opcode = %opcode_name,
        "collected calculation"
    );
    Some(stmt)
}
