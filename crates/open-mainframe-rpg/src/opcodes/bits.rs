//! Bit and character tests: `BITON`, `BITOFF`, `TESTB`, `TESTN`, `TESTZ`.

use super::{literal_len, set_indicator, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::Result;

/// The byte mask for factor 2. Bit numbers `'0246'` (bit 0 is the high
/// order bit) become a hex literal; hex literals and field names are used
/// as they are.
pub fn mask(factor2: &str) -> String {
    let text = factor2.trim();
    if literal_len(text).is_some() {
        let inner = &text[1..text.len() - 1];
        if !inner.is_empty() && inner.chars().all(|c| ('0'..='7').contains(&c)) {
            let value = inner
                .chars()
                .filter_map(|c| c.to_digit(10))
                .fold(0u8, |acc, bit| acc | (0x80 >> bit));
            return format!("X'{value:02X}'");
        }
    }
    text.to_string()
}

pub fn biton(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let target = &spec.result;
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{target} = %BITOR({target} : {})",
        mask(&spec.factor2)
    ))]))
}

pub fn bitoff(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let target = &spec.result;
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "{target} = %BITAND({target} : %BITNOT({}))",
        mask(&spec.factor2)
    ))]))
}

/// One assignment per populated indicator; a test with no indicators does
/// nothing and is dropped.
fn indicator_tests(spec: &CalcSpec, exprs: [String; 3]) -> Action {
    let lines: Vec<FreeLine> = spec
        .indicators()
        .into_iter()
        .zip(exprs)
        .filter(|(ind, _)| !ind.is_empty())
        .map(|(ind, expr)| set_indicator(ind, &expr))
        .collect();
    if lines.is_empty() {
        Action::Delete
    } else {
        Action::Replace(lines)
    }
}

pub fn testb(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let mask = mask(&spec.factor2);
    let bits = format!("%BITAND({} : {mask})", spec.result);
    Ok(indicator_tests(
        spec,
        [
            format!("({bits} = X'00')"),
            format!("({bits} <> X'00' and {bits} <> {mask})"),
            format!("({bits} = {mask})"),
        ],
    ))
}

pub fn testn(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let field = &spec.result;
    Ok(indicator_tests(
        spec,
        [
            format!("(%CHECK('0123456789' : {field}) = 0)"),
            format!(
                "(%SUBST({field} : 1 : 1) = ' ' and %CHECK('0123456789' : %TRIML({field})) = 0)"
            ),
            format!("({field} = *BLANKS)"),
        ],
    ))
}

pub fn testz(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let zone = format!("%SUBST({} : 1 : 1)", spec.result);
    Ok(indicator_tests(
        spec,
        [
            format!("(%SCAN({zone} : '&ABCDEFGHI{{') > 0)"),
            format!("(%SCAN({zone} : '-JKLMNOPQR}}') > 0)"),
            format!("(%SCAN({zone} : '&ABCDEFGHI{{-JKLMNOPQR}}') = 0)"),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::test_support::*;

    #[test]
    fn test_mask_from_bit_numbers() {
        assert_eq!(mask("'0'"), "X'80'");
        assert_eq!(mask("'01'"), "X'C0'");
        assert_eq!(mask("'7'"), "X'01'");
        assert_eq!(mask("X'0F'"), "X'0F'");
        assert_eq!(mask("FLAGS"), "FLAGS");
    }

    #[test]
    fn test_biton_bitoff() {
        let lines = vec![calc("", "BITON", "'01'", "FLAG"), calc("", "BITOFF", "'7'", "FLAG")];
        assert_eq!(texts(&run(&lines, 0)), vec!["FLAG = %BITOR(FLAG : X'C0')"]);
        assert_eq!(
            texts(&run(&lines, 1)),
            vec!["FLAG = %BITAND(FLAG : %BITNOT(X'01'))"]
        );
    }

    #[test]
    fn test_testb_indicators() {
        let lines = vec![calc_full("", "TESTB", "'0'", "FLAG", "", "", ["", "", "50"])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["*IN50 = (%BITAND(FLAG : X'80') = X'80')"]
        );
        let lines = vec![calc("", "TESTB", "'0'", "FLAG")];
        assert_eq!(run(&lines, 0), Action::Delete);
    }

    #[test]
    fn test_testn_and_testz() {
        let lines = vec![
            calc_full("", "TESTN", "", "CODE", "", "", ["10", "", "12"]),
            calc_full("", "TESTZ", "", "CODE", "", "", ["", "21", ""]),
        ];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec![
                "*IN10 = (%CHECK('0123456789' : CODE) = 0)",
                "*IN12 = (CODE = *BLANKS)",
            ]
        );
        assert_eq!(
            texts(&run(&lines, 1)),
            vec!["*IN21 = (%SCAN(%SUBST(CODE : 1 : 1) : '-JKLMNOPQR}') > 0)"]
        );
    }
}
