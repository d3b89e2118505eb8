//! Indicator setting, comparison, storage and everything written out
//! with its keyword.

use tracing::warn;

use super::{is_known, keyword_statement, set_indicator, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};

/// Opcodes that accept `(E)` in free form.
const ERROR_CAPABLE: &[&str] = &[
    "ACQ", "COMMIT", "DEALLOC", "DSPLY", "IN", "NEXT", "OUT", "POST", "REL", "RESET", "ROLBK",
    "TEST",
];

/// Indicator assignments for the populated columns; nothing to assign
/// deletes the operation.
fn assign_indicators(spec: &CalcSpec, exprs: [&str; 3]) -> Action {
    let lines: Vec<FreeLine> = spec
        .indicators()
        .into_iter()
        .zip(exprs)
        .filter(|(ind, _)| !ind.is_empty())
        .map(|(ind, expr)| set_indicator(ind, expr))
        .collect();
    if lines.is_empty() {
        Action::Delete
    } else {
        Action::Replace(lines)
    }
}

pub fn comp(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let (a, b) = (&spec.factor1, &spec.factor2);
    Ok(assign_indicators(
        spec,
        [
            &format!("({a} > {b})"),
            &format!("({a} < {b})"),
            &format!("({a} = {b})"),
        ],
    ))
}

pub fn seton(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(assign_indicators(spec, ["*ON"; 3]))
}

pub fn setoff(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(assign_indicators(spec, ["*OFF"; 3]))
}

/// `OCCUR` sets the occurrence from factor 1, reads it into the result,
/// or both.
pub fn occur(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let ds = spec.factor2.as_str();
    if ds.is_empty() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: "OCCUR".to_string(),
            operand: "a data structure in factor 2".to_string(),
        });
    }
    let mut lines = Vec::new();
    if !spec.factor1.is_empty() {
        lines.push(FreeLine::code(format!("%OCCUR({ds}) = {}", spec.factor1)));
    }
    if !spec.result.is_empty() {
        lines.push(FreeLine::code(format!("{} = %OCCUR({ds})", spec.result)));
    }
    if lines.is_empty() {
        return Ok(Action::Delete);
    }
    Ok(Action::Replace(lines))
}

pub fn alloc(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{} = %ALLOC({})",
        spec.result, spec.factor2
    ))]))
}

pub fn realloc(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let ptr = &spec.result;
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{ptr} = %REALLOC({ptr} : {})",
        spec.factor2
    ))]))
}

pub fn shtdn(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    if spec.hi.is_empty() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: "SHTDN".to_string(),
            operand: "a resulting indicator in columns 71-72".to_string(),
        });
    }
    Ok(Action::Replace(vec![set_indicator(&spec.hi, "%SHTDN()")]))
}

/// Opcodes with the same meaning in free form, written out keyword first.
/// An opcode that is not recognized at all is still written out, behind a
/// warning comment.
pub fn passthrough(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let mut opcode = spec.opcode.clone();
    if !spec.lo.is_empty() && ERROR_CAPABLE.contains(&opcode.name.as_str()) {
        opcode.add_extender('E');
    }
    let mut lines = Vec::new();
    if !is_known(&opcode.name) {
        warn!(line = spec.index, opcode = %spec.opcode, "unrecognized opcode");
        lines.push(FreeLine::comment(format!(
            " rpgfree: {} is not a recognized opcode",
            spec.opcode
        )));
    }
    lines.push(FreeLine::code(keyword_statement(spec, &opcode)));
    Ok(Action::Replace(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::test_support::*;

    #[test]
    fn test_comp_indicators() {
        let lines = vec![calc_full("A", "COMP", "B", "", "", "", ["10", "", "12"])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["*IN10 = (A > B)", "*IN12 = (A = B)"]
        );
        let lines = vec![calc("A", "COMP", "B", "")];
        assert_eq!(run(&lines, 0), Action::Delete);
    }

    #[test]
    fn test_seton_setoff() {
        let lines = vec![
            calc_full("", "SETON", "", "", "", "", ["LR", "", ""]),
            calc_full("", "SETOFF", "", "", "", "", ["30", "31", "32"]),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["*INLR = *ON"]);
        assert_eq!(
            texts(&run(&lines, 1)),
            vec!["*IN30 = *OFF", "*IN31 = *OFF", "*IN32 = *OFF"]
        );
    }

    #[test]
    fn test_occur_forms() {
        let lines = vec![
            calc("5", "OCCUR", "SALESDS", ""),
            calc("", "OCCUR", "SALESDS", "N"),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["%OCCUR(SALESDS) = 5"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["N = %OCCUR(SALESDS)"]);
    }

    #[test]
    fn test_storage() {
        let lines = vec![calc("", "ALLOC", "1024", "PTR"), calc("", "REALLOC", "SIZE", "PTR")];
        assert_eq!(texts(&run(&lines, 0)), vec!["PTR = %ALLOC(1024)"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["PTR = %REALLOC(PTR : SIZE)"]);
    }

    #[test]
    fn test_shtdn() {
        let lines = vec![calc_full("", "SHTDN", "", "", "", "", ["99", "", ""])];
        assert_eq!(texts(&run(&lines, 0)), vec!["*IN99 = %SHTDN()"]);
    }

    #[test]
    fn test_passthrough_error_extender() {
        let lines = vec![calc_full("'Hi'", "DSPLY", "", "", "", "", ["", "50", ""])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["DSPLY(E) 'Hi'", "*IN50 = %ERROR()"]
        );
    }

    #[test]
    fn test_unknown_opcode_warns() {
        let lines = vec![calc("", "FROB", "X", "")];
        let out = run(&lines, 0);
        let Action::Replace(lines) = out else {
            panic!("expected replacement");
        };
        assert!(matches!(&lines[0], FreeLine::Comment(c) if c.contains("FROB")));
        assert_eq!(lines[1], FreeLine::code("FROB X"));
    }
}
