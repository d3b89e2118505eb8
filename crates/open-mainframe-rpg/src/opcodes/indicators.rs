//! Resulting indicator synthesis.
//!
//! Fixed-format operations set up to three indicators from columns 71-76.
//! Free form has no such columns, so each populated indicator becomes an
//! assignment from the built-in function that reports the same condition.

use super::set_indicator;
use crate::collect::CalcSpec;
use crate::convert::FreeLine;

/// Assignments for the resulting indicators of `spec`.
pub fn synthesize(spec: &CalcSpec) -> Vec<FreeLine> {
    let [hi, lo, eq] = spec.indicators();
    let result = spec.result.as_str();
    let file = spec.factor2.as_str();
    let exprs: [Option<String>; 3] = match spec.opcode.name.as_str() {
        "ADD" | "SUB" | "MULT" | "DIV" | "Z-ADD" | "Z-SUB" | "SQRT" | "XFOOT" | "MVR" => [
            Some(format!("({result} > 0)")),
            Some(format!("({result} < 0)")),
            Some(format!("({result} = 0)")),
        ],
        "CHAIN" => [
            Some(format!("NOT %FOUND({file})")),
            Some(format!("%ERROR({file})")),
            None,
        ],
        "READ" | "READC" | "READE" | "READP" | "READPE" => [
            None,
            Some("%ERROR()".to_string()),
            Some("%EOF()".to_string()),
        ],
        "SETLL" => [
            Some("NOT %FOUND()".to_string()),
            Some("%ERROR()".to_string()),
            Some("%EQUAL()".to_string()),
        ],
        "SETGT" | "DELETE" => [
            Some("NOT %FOUND()".to_string()),
            Some("%ERROR()".to_string()),
            None,
        ],
        "WRITE" => [
            None,
            Some(format!("%ERROR({file})")),
            Some("%EOF()".to_string()),
        ],
        _ => [
            None,
            Some("%ERROR()".to_string()),
            Some("%FOUND()".to_string()),
        ],
    };

    [hi, lo, eq]
        .into_iter()
        .zip(exprs)
        .filter(|(ind, _)| !ind.is_empty())
        .filter_map(|(ind, expr)| expr.map(|e| set_indicator(ind, &e)))
        .collect()
}
