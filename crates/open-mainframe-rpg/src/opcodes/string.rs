//! String operations: `CAT`, `SUBST`, `SCAN`, `CHECK`, `CHECKR`, `XLATE`.

use super::{set_indicator, split_colon, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};
use crate::symbols::result_field_info;

/// `CAT`. Without `(P)` only the concatenated length of the result is
/// replaced, so the assignment goes through `%SUBST` with a work length.
pub fn cat(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let dst = spec.result.as_str();
    let left = if spec.factor1.is_empty() {
        dst
    } else {
        spec.factor1.as_str()
    };
    let (right, blanks) = split_colon(&spec.factor2);
    let expr = match blanks.as_deref() {
        None => format!("{left} + {right}"),
        Some(n) => match n.parse::<usize>() {
            Ok(0) => format!("%TRIMR({left}) + {right}"),
            Ok(n) => format!("%TRIMR({left}) + '{}' + {right}", " ".repeat(n)),
            Err(_) => {
                return Err(RpgError::MalformedStatement {
                    line: spec.index,
                    reason: format!("CAT blank count '{n}' is not a number"),
                })
            }
        },
    };

    if spec.opcode.has_extender('P') {
        return Ok(Action::Replace(vec![FreeLine::code(format!("{dst} = {expr}"))]));
    }
    let work = ctx.options.temp_var1.clone();
    let work = ctx.work_int(&work);
    Ok(Action::Replace(vec![
        FreeLine::code(format!("{work} = %LEN({expr})")),
        FreeLine::code(format!("IF {work} > %LEN({dst})")),
        FreeLine::code(format!("  {work} = %LEN({dst})")),
        FreeLine::code("ENDIF"),
        FreeLine::code(format!("%SUBST({dst} : 1 : {work}) = {expr}")),
    ]))
}

/// `SUBST`. Without `(P)` the result keeps its bytes past the extracted
/// length, which needs the result's declared length.
pub fn subst(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let dst = spec.result.as_str();
    let (source, start) = split_colon(&spec.factor2);
    let start = start.unwrap_or_else(|| "1".to_string());
    let len = spec.factor1.as_str();
    let extract = if len.is_empty() {
        format!("%SUBST({source} : {start})")
    } else {
        format!("%SUBST({source} : {start} : {len})")
    };

    if spec.opcode.has_extender('P') {
        return Ok(Action::Replace(vec![FreeLine::code(format!("{dst} = {extract}"))]));
    }
    if !ctx.symbols.is_available() {
        return Ok(Action::Annotate(format!(
            "SUBST into {dst} needs its length; no symbol service is available"
        )));
    }
    let target_len = result_field_info(spec)
        .or_else(|| ctx.operand_info(dst))
        .and_then(|info| info.length);
    let (Some(target_len), false) = (target_len, len.is_empty()) else {
        return Ok(Action::Annotate(format!(
            "SUBST into {dst} needs both the extracted and the result length"
        )));
    };

    let text = match len.parse::<u32>() {
        Ok(n) if n >= target_len => {
            format!("{dst} = %SUBST({source} : {start} : {target_len})")
        }
        _ => format!("%SUBST({dst} : 1 : {len}) = {extract}"),
    };
    Ok(Action::Replace(vec![FreeLine::code(text)]))
}

/// Shared shape of `SCAN` and `CHECK`: a position into the result, and
/// the equal indicator set when the position is non-zero.
fn position_search(spec: &CalcSpec, call: String) -> Result<Action> {
    let mut lines = Vec::new();
    let found = if spec.result.is_empty() {
        format!("({call} > 0)")
    } else {
        lines.push(FreeLine::code(format!("{} = {call}", spec.result)));
        format!("({} > 0)", spec.result)
    };
    if !spec.eq.is_empty() {
        lines.push(set_indicator(&spec.eq, &found));
    }
    if lines.is_empty() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: spec.opcode.name.clone(),
            operand: "a result field or an equal indicator".to_string(),
        });
    }
    Ok(Action::Replace(lines))
}

fn with_start(func: &str, args: &[&str], start: Option<String>) -> String {
    let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    args.extend(start);
    format!("{func}({})", args.join(" : "))
}

pub fn scan(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let (compare, compare_len) = split_colon(&spec.factor1);
    let compare = match compare_len {
        Some(len) => format!("%SUBST({compare} : 1 : {len})"),
        None => compare,
    };
    let (base, start) = split_colon(&spec.factor2);
    position_search(spec, with_start("%SCAN", &[compare.as_str(), base.as_str()], start))
}

/// `CHECK` and `CHECKR`.
pub fn check(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let func = if spec.opcode.name == "CHECKR" {
        "%CHECKR"
    } else {
        "%CHECK"
    };
    let (base, start) = split_colon(&spec.factor2);
    position_search(spec, with_start(func, &[spec.factor1.as_str(), base.as_str()], start))
}

pub fn xlate(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let (from, to) = split_colon(&spec.factor1);
    let Some(to) = to else {
        return Err(RpgError::MalformedStatement {
            line: spec.index,
            reason: "XLATE factor 1 must be from:to".to_string(),
        });
    };
    let (source, start) = split_colon(&spec.factor2);
    let call = with_start("%XLATE", &[from.as_str(), to.as_str(), source.as_str()], start);
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{} = {call}",
        spec.result
    ))]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use crate::opcodes::test_support::*;
    use crate::symbols::{DataType, ResolvedSymbols, SymbolInfo};

    #[test]
    fn test_cat_padded() {
        let lines = vec![
            calc("FIRST", "CAT(P)", "LAST:1", "FULL"),
            calc("", "CAT(P)", "'X':0", "FULL"),
            calc("A", "CAT(P)", "B", "C"),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["FULL = %TRIMR(FIRST) + ' ' + LAST"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["FULL = %TRIMR(FULL) + 'X'"]);
        assert_eq!(texts(&run(&lines, 2)), vec!["C = A + B"]);
    }

    #[test]
    fn test_cat_without_pad_uses_work_length() {
        let options = ConvertOptions::default();
        let lines = vec![calc("A", "CAT", "B", "C")];
        let (action, decls) = run_with(&lines, 0, &options, &ResolvedSymbols::unavailable());
        assert_eq!(
            texts(&action),
            vec![
                "FREE_WORK1 = %LEN(A + B)",
                "IF FREE_WORK1 > %LEN(C)",
                "  FREE_WORK1 = %LEN(C)",
                "ENDIF",
                "%SUBST(C : 1 : FREE_WORK1) = A + B",
            ]
        );
        assert_eq!(decls.len(), 1);
    }

    #[test]
    fn test_subst_forms() {
        let lines = vec![calc("3", "SUBST(P)", "NAME:2", "PART")];
        assert_eq!(texts(&run(&lines, 0)), vec!["PART = %SUBST(NAME : 2 : 3)"]);

        let lines = vec![calc("3", "SUBST", "NAME:2", "PART")];
        assert!(matches!(run(&lines, 0), Action::Annotate(_)));

        let options = ConvertOptions::default();
        let mut resolved = ResolvedSymbols::available();
        resolved.insert("PART", SymbolInfo::new(DataType::Char, Some(10), None));
        let (action, _) = run_with(&lines, 0, &options, &resolved);
        assert_eq!(texts(&action), vec!["%SUBST(PART : 1 : 3) = %SUBST(NAME : 2 : 3)"]);

        let lines = vec![calc("12", "SUBST", "NAME", "PART")];
        let (action, _) = run_with(&lines, 0, &options, &resolved);
        assert_eq!(texts(&action), vec!["PART = %SUBST(NAME : 1 : 10)"]);
    }

    #[test]
    fn test_scan_with_indicator() {
        let lines = vec![calc_full("'/'", "SCAN", "PATH:2", "POS", "", "", ["", "", "40"])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["POS = %SCAN('/' : PATH : 2)", "*IN40 = (POS > 0)"]
        );
        let lines = vec![calc_full("'AB':1", "SCAN", "TEXT", "", "", "", ["", "", "41"])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["*IN41 = (%SCAN(%SUBST('AB' : 1 : 1) : TEXT) > 0)"]
        );
    }

    #[test]
    fn test_check_and_checkr() {
        let lines = vec![
            calc("DIGITS", "CHECK", "INPUT", "POS"),
            calc("' '", "CHECKR", "NAME", "LAST"),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["POS = %CHECK(DIGITS : INPUT)"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["LAST = %CHECKR(' ' : NAME)"]);
    }

    #[test]
    fn test_xlate() {
        let lines = vec![calc("LO:UP", "XLATE", "NAME:2", "NAME")];
        assert_eq!(texts(&run(&lines, 0)), vec!["NAME = %XLATE(LO : UP : NAME : 2)"]);
    }
}
