//! Date and time operations: `EXTRCT`, `ADDDUR`, `SUBDUR`, `TIME`.

use super::{split_colon, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::Result;
use crate::symbols::{result_field_info, DataType};

const DURATION_MISSING: &str = "<factor 2 duration code missing>";
const FACTOR1_MISSING: &str = "<factor 1 missing>";

/// Full unit keyword for a duration code (`*D` -> `*DAYS`).
pub fn unit_keyword(code: &str) -> Option<&'static str> {
    Some(match code.trim().to_ascii_uppercase().as_str() {
        "*Y" | "*YEARS" => "*YEARS",
        "*M" | "*MONTHS" => "*MONTHS",
        "*D" | "*DAYS" => "*DAYS",
        "*H" | "*HOURS" => "*HOURS",
        "*MN" | "*MINUTES" => "*MINUTES",
        "*S" | "*SECONDS" => "*SECONDS",
        "*MS" | "*MSECONDS" => "*MSECONDS",
        _ => return None,
    })
}

/// `%DAYS(n)` and friends for a `n:*D` factor 2.
fn duration(factor2: &str) -> String {
    let (count, code) = split_colon(factor2);
    code.as_deref()
        .and_then(unit_keyword)
        .map(|unit| format!("%{}({count})", &unit[1..]))
        .unwrap_or_else(|| DURATION_MISSING.to_string())
}

fn code(text: String) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(text)]))
}

pub fn extrct(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let (value, unit) = split_colon(&spec.factor2);
    let unit = unit.as_deref().and_then(unit_keyword).unwrap_or(DURATION_MISSING);
    code(format!("{} = %SUBDT({value} : {unit})", spec.result))
}

fn add_or_sub(spec: &CalcSpec, op: char) -> String {
    let dur = duration(&spec.factor2);
    if spec.factor1.is_empty() {
        format!("{} {op}= {dur}", spec.result)
    } else {
        format!("{} = {} {op} {dur}", spec.result, spec.factor1)
    }
}

pub fn adddur(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    code(add_or_sub(spec, '+'))
}

/// `SUBDUR` either subtracts a duration or, with a `target:unit` result,
/// computes the difference between two dates.
pub fn subdur(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let (target, unit) = split_colon(&spec.result);
    let Some(unit) = unit else {
        return code(add_or_sub(spec, '-'));
    };
    let unit = unit_keyword(&unit).unwrap_or(DURATION_MISSING);
    let from = if spec.factor1.is_empty() {
        FACTOR1_MISSING
    } else {
        spec.factor1.as_str()
    };
    code(format!("{target} = %DIFF({from} : {} : {unit})", spec.factor2))
}

/// `TIME` fills its result from the system clock in the shape of the
/// result field.
pub fn time(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let target = spec.result.as_str();
    let info = result_field_info(spec).or_else(|| ctx.operand_info(target));
    let Some(info) = info.filter(|_| ctx.symbols.is_available() || !spec.length.is_empty())
    else {
        return Ok(Action::Annotate(format!(
            "TIME into {target} needs its type; no symbol service is available"
        )));
    };
    let expr = match (info.data_type, info.length) {
        (DataType::Timestamp, _) => "%TIMESTAMP()".to_string(),
        (DataType::Date, _) => "%DATE()".to_string(),
        (DataType::Time, _) => "%TIME()".to_string(),
        (t, Some(6)) if t.is_numeric() => "%DEC(%TIME() : *HMS)".to_string(),
        (t, Some(len @ (12 | 14))) if t.is_numeric() => {
            let date_fmt = if len == 12 { "*MDY0" } else { "*USA0" };
            format!("%DEC(%CHAR(%TIME() : *HMS0) + %CHAR(%DATE() : {date_fmt}) : {len} : 0)")
        }
        _ => {
            return Ok(Action::Annotate(format!(
                "TIME into {target} needs a date, time, timestamp or 6, 12 or 14 digit field"
            )))
        }
    };
    code(format!("{target} = {expr}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use crate::opcodes::test_support::*;
    use crate::symbols::{ResolvedSymbols, SymbolInfo};

    #[test]
    fn test_unit_keywords() {
        assert_eq!(unit_keyword("*d"), Some("*DAYS"));
        assert_eq!(unit_keyword("*MN"), Some("*MINUTES"));
        assert_eq!(unit_keyword("*X"), None);
    }

    #[test]
    fn test_adddur_forms() {
        let lines = vec![
            calc("START", "ADDDUR", "30:*D", "DUE"),
            calc("", "ADDDUR", "1:*Y", "DUE"),
            calc("", "ADDDUR", "1", "DUE"),
        ];
        assert_eq!(texts(&run(&lines, 0)), vec!["DUE = START + %DAYS(30)"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["DUE += %YEARS(1)"]);
        assert_eq!(
            texts(&run(&lines, 2)),
            vec!["DUE += <factor 2 duration code missing>"]
        );
    }

    #[test]
    fn test_subdur_difference() {
        let lines = vec![
            calc("TODAY", "SUBDUR", "BIRTH", "AGE:*Y"),
            calc("", "SUBDUR", "2:*M", "DUE"),
        ];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["AGE = %DIFF(TODAY : BIRTH : *YEARS)"]
        );
        assert_eq!(texts(&run(&lines, 1)), vec!["DUE -= %MONTHS(2)"]);
    }

    #[test]
    fn test_extrct() {
        let lines = vec![calc("", "EXTRCT", "DUE:*M", "MONTH")];
        assert_eq!(texts(&run(&lines, 0)), vec!["MONTH = %SUBDT(DUE : *MONTHS)"]);
    }

    #[test]
    fn test_time_shapes() {
        let lines = vec![calc_full("", "TIME", "", "NOW", "6", "0", ["", "", ""])];
        assert_eq!(texts(&run(&lines, 0)), vec!["NOW = %DEC(%TIME() : *HMS)"]);

        let lines = vec![calc("", "TIME", "", "STAMP")];
        assert!(matches!(run(&lines, 0), Action::Annotate(_)));

        let options = ConvertOptions::default();
        let mut resolved = ResolvedSymbols::available();
        resolved.insert("STAMP", SymbolInfo::new(DataType::Timestamp, None, None));
        let (action, _) = run_with(&lines, 0, &options, &resolved);
        assert_eq!(texts(&action), vec!["STAMP = %TIMESTAMP()"]);
    }
}
