//! Arithmetic operations.

use super::{assign, OpContext};
use crate::collect::CalcSpec;
use crate::collect::cspec::line_opcode;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};
use crate::source::col;

fn binary(spec: &CalcSpec, op: char) -> Action {
    let text = if spec.factor1.is_empty() {
        assign(&spec.opcode, &spec.result, &format!("{op}="), &spec.factor2)
    } else {
        assign(
            &spec.opcode,
            &spec.result,
            "=",
            &format!("{} {op} {}", spec.factor1, spec.factor2),
        )
    };
    Action::Replace(vec![FreeLine::code(text)])
}

pub fn add(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(binary(spec, '+'))
}

pub fn sub(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(binary(spec, '-'))
}

pub fn mult(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(binary(spec, '*'))
}

pub fn div(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(binary(spec, '/'))
}

pub fn z_add(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(assign(
        &spec.opcode,
        &spec.result,
        "=",
        &spec.factor2,
    ))]))
}

pub fn z_sub(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![
        FreeLine::code(format!("{} = 0", spec.result)),
        FreeLine::code(assign(&spec.opcode, &spec.result, "-=", &spec.factor2)),
    ]))
}

pub fn sqrt(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(assign(
        &spec.opcode,
        &spec.result,
        "=",
        &format!("%SQRT({})", spec.factor2),
    ))]))
}

pub fn xfoot(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(assign(
        &spec.opcode,
        &spec.result,
        "=",
        &format!("%XFOOT({})", spec.factor2),
    ))]))
}

/// `MVR` takes the remainder of the `DIV` immediately above it.
pub fn mvr(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let previous = (0..spec.index)
        .rev()
        .map(|i| ctx.lines[i].as_str())
        .find_map(|line| line_opcode(line).map(|op| (line, op)));
    let Some((div, _)) = previous.filter(|(_, op)| op.name == "DIV") else {
        return Err(RpgError::MalformedStatement {
            line: spec.index,
            reason: "MVR must directly follow a DIV".to_string(),
        });
    };
    let dividend = match col(div, 12, 25) {
        f1 if f1.is_empty() => col(div, 50, 63),
        f1 => f1,
    };
    let divisor = col(div, 36, 49);
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{} = %REM({dividend} : {divisor})",
        spec.result
    ))]))
}

#[cfg(test)]
mod tests {
    use crate::opcodes::test_support::*;

    #[test]
    fn test_add_forms() {
        let lines = vec![
            calc("A", "ADD", "B", "TOTAL"),
            calc("", "ADD", "1", "COUNT"),
            calc("", "MULT(H)", "RATE", "AMT"),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["TOTAL = A + B"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["COUNT += 1"]);
        assert_eq!(texts(&run(&lines, 2)), vec!["EVAL(H) AMT *= RATE"]);
    }

    #[test]
    fn test_z_add_and_z_sub() {
        let lines = vec![calc("", "Z-ADD", "0", "X"), calc("", "Z-SUB", "Y", "X")];
        assert_eq!(texts(&run(&lines, 0)), vec!["X = 0"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["X = 0", "X -= Y"]);
    }

    #[test]
    fn test_sub_with_indicators() {
        let lines = vec![calc_full("A", "SUB", "B", "DIFF", "", "", ["", "", "50"])];
        assert_eq!(texts(&run(&lines, 0)), vec!["DIFF = A - B", "*IN50 = (DIFF = 0)"]);
    }

    #[test]
    fn test_mvr_follows_div() {
        let lines = vec![calc("TOTAL", "DIV", "7", "Q"), calc("", "MVR", "", "R")];
        assert_eq!(texts(&run(&lines, 1)), vec!["R = %REM(TOTAL : 7)"]);
    }

    #[test]
    fn test_builtin_wrappers() {
        let lines = vec![calc("", "SQRT", "N", "ROOT"), calc("", "XFOOT", "ARR", "SUM")];
        assert_eq!(texts(&run(&lines, 0)), vec!["ROOT = %SQRT(N)"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["SUM = %XFOOT(ARR)"]);
    }
}
