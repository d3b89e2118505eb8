//! `MOVE`, `MOVEL` and `MOVEA`.
//!
//! `MOVE` is right-adjusted and converts between character, numeric and
//! date/time values depending on its operands, so its free-form
//! equivalent depends on operand types. Without a symbol service it is
//! left as it is with a note.

use super::{is_figurative, is_indicator, literal_len, OpContext};
use crate::collect::CalcSpec;
use crate::config::MoveaStyle;
use crate::convert::{Action, FreeLine};
use crate::error::Result;
use crate::symbols::{result_field_info, DataType, SymbolInfo};

fn code(text: String) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(text)]))
}

fn datetime_bif(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Time => "%TIME",
        DataType::Timestamp => "%TIMESTAMP",
        _ => "%DATE",
    }
}

fn with_format(func: &str, value: &str, format: Option<&str>) -> String {
    match format {
        Some(fmt) => format!("{func}({value} : {fmt})"),
        None => format!("{func}({value})"),
    }
}

fn typed_move(
    spec: &CalcSpec,
    source: &SymbolInfo,
    target: &SymbolInfo,
    format: Option<&str>,
) -> String {
    let (src, dst) = (spec.factor2.as_str(), spec.result.as_str());
    let (st, dt) = (source.data_type, target.data_type);

    if dt.is_datetime() && !st.is_datetime() {
        return format!("{dst} = {}", with_format(datetime_bif(dt), src, format));
    }
    if st.is_datetime() {
        return if dt.is_character() {
            format!("{dst} = {}", with_format("%CHAR", src, format))
        } else if dt.is_numeric() {
            format!("{dst} = {}", with_format("%DEC", src, format))
        } else {
            format!("{dst} = {src}")
        };
    }
    if dt.is_character() && st.is_numeric() {
        return format!("EVALR {dst} = %EDITC({src} : 'X')");
    }
    if dt.is_numeric() && st.is_character() {
        return match target.length {
            Some(len) => format!(
                "{dst} = %DEC({src} : {len} : {})",
                target.decimals.unwrap_or(0)
            ),
            None => format!("{dst} = %INT({src})"),
        };
    }
    if dt.is_character() && st.is_character() {
        if spec.opcode.has_extender('P') {
            return format!("EVALR {dst} = {src}");
        }
        return match (source.length, target.length) {
            (Some(sl), Some(dl)) if sl == dl => format!("{dst} = {src}"),
            (Some(sl), Some(dl)) if sl > dl => {
                format!("{dst} = %SUBST({src} : {} : {dl})", sl - dl + 1)
            }
            (Some(sl), Some(dl)) => format!("%SUBST({dst} : {} : {sl}) = {src}", dl - sl + 1),
            _ => format!("EVALR {dst} = {src}"),
        };
    }
    format!("{dst} = {src}")
}

/// `MOVE`: right-adjusted move.
pub fn move_right(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let (src, dst) = (spec.factor2.as_str(), spec.result.as_str());
    if is_indicator(src) || is_indicator(dst) || is_figurative(src) {
        return code(format!("{dst} = {src}"));
    }
    if !ctx.symbols.is_available() {
        return Ok(Action::Annotate(format!(
            "MOVE to {dst} needs operand types; no symbol service is available"
        )));
    }
    let format = (!spec.factor1.is_empty()).then_some(spec.factor1.as_str());
    let source = ctx.operand_info(src);
    let target = result_field_info(spec).or_else(|| ctx.operand_info(dst));
    let text = match (source, target) {
        (Some(s), Some(t)) => typed_move(spec, &s, &t, format),
        _ => format!("EVALR {dst} = {src}"),
    };
    code(text)
}

/// `MOVEL`: left-adjusted move.
pub fn move_left(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let (src, dst) = (spec.factor2.as_str(), spec.result.as_str());
    let mut lines = vec![FreeLine::code(format!("{dst} = {src}"))];
    let padded = spec.opcode.has_extender('P') || is_figurative(src) || is_indicator(src);
    if ctx.options.alt_movel && !padded {
        lines.push(FreeLine::comment(format!(
            " %SUBST({dst} : 1 : %LEN({src})) = {src}"
        )));
    }
    Ok(Action::Replace(lines))
}

/// First element of an indicator array reference.
fn indicator_start(operand: &str) -> Option<String> {
    let upper = operand.trim().to_ascii_uppercase();
    let rest = upper.strip_prefix("*IN")?;
    if rest.is_empty() {
        return Some("1".to_string());
    }
    if let Some(index) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        return Some(index.trim().to_string());
    }
    rest.chars()
        .all(|c| c.is_ascii_digit())
        .then(|| rest.trim_start_matches('0').to_string())
        .map(|s| if s.is_empty() { "0".to_string() } else { s })
}

/// `MOVEA` of a `'0101'` literal into the indicator array. Anything else
/// stays in fixed form.
pub fn move_array(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let literal = spec.factor2.trim();
    let bits: Option<Vec<bool>> = literal_len(literal).and_then(|_| {
        let inner = &literal[1..literal.len() - 1];
        (!inner.is_empty() && inner.chars().all(|c| c == '0' || c == '1'))
            .then(|| inner.chars().map(|c| c == '1').collect())
    });
    let (Some(bits), Some(start)) = (bits, indicator_start(&spec.result)) else {
        return Ok(Action::Keep);
    };

    let lines = match ctx.options.indy_movea_style {
        MoveaStyle::List => {
            let values: Vec<&str> = bits.iter().map(|&b| if b { "*ON" } else { "*OFF" }).collect();
            vec![FreeLine::code(format!(
                "%SUBARR(*IN : {start} : {}) = %LIST({})",
                bits.len(),
                values.join(" : ")
            ))]
        }
        MoveaStyle::For => {
            let work = ctx.options.temp_var1.clone();
            let work = ctx.work_int(&work);
            let index = match start.as_str() {
                "1" => work.clone(),
                s => match s.parse::<u32>() {
                    Ok(n) => format!("{work} + {}", n.saturating_sub(1)),
                    Err(_) => format!("{work} + {s} - 1"),
                },
            };
            vec![
                FreeLine::code(format!("FOR {work} = 1 to {}", bits.len())),
                FreeLine::code(format!(
                    "  *IN({index}) = (%SUBST({literal} : {work} : 1) = '1')"
                )),
                FreeLine::code("ENDFOR"),
            ]
        }
    };
    Ok(Action::Replace(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use crate::opcodes::test_support::*;
    use crate::symbols::ResolvedSymbols;

    fn symbols(entries: &[(&str, DataType, u32, Option<u32>)]) -> ResolvedSymbols {
        let mut resolved = ResolvedSymbols::available();
        for (name, ty, len, dec) in entries {
            resolved.insert(name, SymbolInfo::new(*ty, Some(*len), *dec));
        }
        resolved
    }

    fn run_typed(line: String, resolved: &ResolvedSymbols) -> Vec<String> {
        let options = ConvertOptions::default();
        texts(&run_with(&[line], 0, &options, resolved).0)
    }

    #[test]
    fn test_move_without_symbols_is_annotated() {
        let lines = vec![calc("", "MOVE", "CUSTNO", "CUSTKEY")];
        assert!(matches!(run(&lines, 0), Action::Annotate(_)));
    }

    #[test]
    fn test_move_indicators_and_figuratives() {
        let lines = vec![calc("", "MOVE", "*ON", "*IN50"), calc("", "MOVE", "*BLANKS", "NAME")];
        assert_eq!(texts(&run(&lines, 0)), vec!["*IN50 = *ON"]);
        assert_eq!(texts(&run(&lines, 1)), vec!["NAME = *BLANKS"]);
    }

    #[test]
    fn test_move_character_lengths() {
        let resolved = symbols(&[
            ("LONG", DataType::Char, 10, None),
            ("SHORT", DataType::Char, 4, None),
        ]);
        assert_eq!(
            run_typed(calc("", "MOVE", "LONG", "SHORT"), &resolved),
            vec!["SHORT = %SUBST(LONG : 7 : 4)"]
        );
        assert_eq!(
            run_typed(calc("", "MOVE", "SHORT", "LONG"), &resolved),
            vec!["%SUBST(LONG : 7 : 4) = SHORT"]
        );
        assert_eq!(
            run_typed(calc("", "MOVE(P)", "SHORT", "LONG"), &resolved),
            vec!["EVALR LONG = SHORT"]
        );
    }

    #[test]
    fn test_move_numeric_and_dates() {
        let resolved = symbols(&[
            ("AMT", DataType::Packed, 7, Some(2)),
            ("TEXT", DataType::Char, 7, None),
            ("DUE", DataType::Date, 10, None),
        ]);
        assert_eq!(
            run_typed(calc("", "MOVE", "AMT", "TEXT"), &resolved),
            vec!["EVALR TEXT = %EDITC(AMT : 'X')"]
        );
        assert_eq!(
            run_typed(calc("", "MOVE", "TEXT", "AMT"), &resolved),
            vec!["AMT = %DEC(TEXT : 7 : 2)"]
        );
        assert_eq!(
            run_typed(calc("*ISO", "MOVE", "TEXT", "DUE"), &resolved),
            vec!["DUE = %DATE(TEXT : *ISO)"]
        );
        assert_eq!(
            run_typed(calc("*USA", "MOVE", "DUE", "TEXT"), &resolved),
            vec!["TEXT = %CHAR(DUE : *USA)"]
        );
    }

    #[test]
    fn test_move_unknown_types_use_evalr() {
        let resolved = ResolvedSymbols::available();
        assert_eq!(
            run_typed(calc("", "MOVE", "A", "B"), &resolved),
            vec!["EVALR B = A"]
        );
    }

    #[test]
    fn test_movel_alternative_comment() {
        let mut options = ConvertOptions::default();
        let lines = vec![calc("", "MOVEL", "CODE", "FIELD")];
        let unavailable = ResolvedSymbols::unavailable();
        assert_eq!(
            texts(&run_with(&lines, 0, &options, &unavailable).0),
            vec!["FIELD = CODE"]
        );
        options.alt_movel = true;
        let (action, _) = run_with(&lines, 0, &options, &unavailable);
        assert_eq!(
            texts(&action),
            vec!["FIELD = CODE", " %SUBST(FIELD : 1 : %LEN(CODE)) = CODE"]
        );
    }

    #[test]
    fn test_movea_list_style() {
        let lines = vec![
            calc("", "MOVEA", "'0110'", "*IN(30)"),
            calc("", "MOVEA", "'10'", "*IN"),
            calc("", "MOVEA", "ARR", "OTHER"),
        ];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["%SUBARR(*IN : 30 : 4) = %LIST(*OFF : *ON : *ON : *OFF)"]
        );
        assert_eq!(
            texts(&run(&lines, 1)),
            vec!["%SUBARR(*IN : 1 : 2) = %LIST(*ON : *OFF)"]
        );
        assert_eq!(run(&lines, 2), Action::Keep);
    }

    #[test]
    fn test_movea_for_style() {
        let mut options = ConvertOptions::default();
        options.indy_movea_style = MoveaStyle::For;
        let lines = vec![calc("", "MOVEA", "'01'", "*IN41")];
        let (action, decls) = run_with(&lines, 0, &options, &ResolvedSymbols::unavailable());
        assert_eq!(
            texts(&action),
            vec![
                "FOR FREE_WORK1 = 1 to 2",
                "  *IN(FREE_WORK1 + 40) = (%SUBST('01' : FREE_WORK1 : 1) = '1')",
                "ENDFOR",
            ]
        );
        assert_eq!(decls[0].text, "dcl-s FREE_WORK1 int(10)");
    }
}
