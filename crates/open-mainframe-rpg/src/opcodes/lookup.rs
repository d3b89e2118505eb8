//! `LOOKUP` against arrays and tables.
//!
//! The resulting indicators pick the search: equal only is an exact
//! match, high or low with or without equal are the nearest-match forms.
//! Tables (names starting `TAB`) use `%TLOOKUP`, which returns the found
//! condition directly; arrays use `%LOOKUP`, which returns an index.

use super::{set_indicator, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};

fn search_suffix(spec: &CalcSpec) -> &'static str {
    let (hi, lo, eq) = (!spec.hi.is_empty(), !spec.lo.is_empty(), !spec.eq.is_empty());
    match (hi, lo, eq) {
        (true, _, true) => "GE",
        (true, _, false) => "GT",
        (false, true, true) => "LE",
        (false, true, false) => "LT",
        _ => "",
    }
}

/// Split `ARR(IDX)` into the array and its index.
fn array_index(operand: &str) -> (String, Option<String>) {
    match operand.find('(') {
        Some(open) if operand.ends_with(')') => (
            operand[..open].trim().to_string(),
            Some(operand[open + 1..operand.len() - 1].trim().to_string()),
        ),
        _ => (operand.trim().to_string(), None),
    }
}

pub fn lookup(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    if !spec.has_indicators() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: "LOOKUP".to_string(),
            operand: "a resulting indicator".to_string(),
        });
    }
    let suffix = search_suffix(spec);
    let arg = &spec.factor1;
    let (array, index) = array_index(&spec.factor2);

    if array.to_ascii_uppercase().starts_with("TAB") {
        let call = if spec.result.is_empty() {
            format!("%TLOOKUP{suffix}({arg} : {array})")
        } else {
            format!("%TLOOKUP{suffix}({arg} : {array} : {})", spec.result)
        };
        let lines = spec
            .indicators()
            .into_iter()
            .filter(|i| !i.is_empty())
            .map(|ind| set_indicator(ind, &call))
            .collect();
        return Ok(Action::Replace(lines));
    }

    if index.is_none() && suffix.is_empty() {
        return Ok(Action::Replace(vec![set_indicator(
            &spec.eq,
            &format!("(%LOOKUP({arg} : {array}) > 0)"),
        )]));
    }

    let (index, start) = match index {
        Some(idx) => (idx.clone(), Some(idx)),
        None => {
            let work = ctx.options.temp_var1.clone();
            (ctx.work_int(&work), None)
        }
    };
    let call = match &start {
        Some(start) => format!("%LOOKUP{suffix}({arg} : {array} : {start})"),
        None => format!("%LOOKUP{suffix}({arg} : {array})"),
    };
    let mut lines = vec![FreeLine::code(format!("{index} = {call}"))];
    let found = format!("({index} > 0)");
    let exact = format!("({index} > 0 and {array}({index}) = {arg})");
    for (ind, nearest) in [(&spec.hi, true), (&spec.lo, true), (&spec.eq, false)] {
        if ind.is_empty() {
            continue;
        }
        let expr = if nearest || suffix.is_empty() {
            &found
        } else {
            &exact
        };
        lines.push(set_indicator(ind, expr));
    }
    if start.is_some() {
        lines.push(FreeLine::code(format!("IF {index} = 0")));
        lines.push(FreeLine::code(format!("  {index} = 1")));
        lines.push(FreeLine::code("ENDIF"));
    }
    Ok(Action::Replace(lines))
}
