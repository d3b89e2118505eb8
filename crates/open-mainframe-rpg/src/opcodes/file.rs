//! File operations.
//!
//! Free form has no resulting indicators, so an operation whose error
//! indicator is set needs the `(E)` extender for `%ERROR` to be
//! meaningful. Key lists named in factor 1 are expanded inline.

use super::{keyword_statement, OpContext};
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::Result;
use crate::opcode::Opcode;

fn error_opcode(spec: &CalcSpec) -> Opcode {
    let mut opcode = spec.opcode.clone();
    if !spec.lo.is_empty() {
        opcode.add_extender('E');
    }
    opcode
}

/// `CHAIN`, `SETLL`, `SETGT`, `READE`, `READPE` and `DELETE`: factor 1 is
/// a key or key list.
pub fn keyed(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let opcode = error_opcode(spec);
    let mut resolved = spec.clone();
    if let Some(key) = ctx.keylists.resolve(&spec.factor1) {
        resolved.factor1 = key;
    }
    Ok(Action::Replace(vec![FreeLine::code(keyword_statement(
        &resolved, &opcode,
    ))]))
}

/// Operations on a file or record format without a key.
pub fn record(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    let opcode = error_opcode(spec);
    Ok(Action::Replace(vec![FreeLine::code(keyword_statement(
        spec, &opcode,
    ))]))
}

#[cfg(test)]
mod tests {
    use crate::opcodes::test_support::*;

    #[test]
    fn test_chain_with_key_list() {
        let lines = vec![
            calc("CUSTKEY", "KLIST", "", ""),
            calc("", "KFLD", "", "F1"),
            calc("", "KFLD", "", "F2"),
            calc_full("CUSTKEY", "CHAIN", "CUSTMAST", "", "", "", ["10", "20", ""]),
        ];
        assert_eq!(
            texts(&run(&lines, 3)),
            vec![
                "CHAIN(E) (F1 : F2) CUSTMAST",
                "*IN10 = NOT %FOUND(CUSTMAST)",
                "*IN20 = %ERROR(CUSTMAST)",
            ]
        );
    }

    #[test]
    fn test_plain_key_and_data_structure() {
        let lines = vec![calc("ID", "CHAIN(N)", "ITEMS", "ITEMDS")];
        assert_eq!(texts(&run(&lines, 0)), vec!["CHAIN(N) ID ITEMS ITEMDS"]);
    }

    #[test]
    fn test_read_eof_indicator() {
        let lines = vec![calc_full("", "READ", "CUSTMAST", "", "", "", ["", "", "90"])];
        assert_eq!(texts(&run(&lines, 0)), vec!["READ CUSTMAST", "*IN90 = %EOF()"]);
    }

    #[test]
    fn test_write_error_forces_extender() {
        let lines = vec![calc_full("", "WRITE", "ORDREC", "", "", "", ["", "99", ""])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["WRITE(E) ORDREC", "*IN99 = %ERROR(ORDREC)"]
        );
    }

    #[test]
    fn test_setll_equal() {
        let lines = vec![calc_full("*LOVAL", "SETLL", "CUSTMAST", "", "", "", ["", "", "50"])];
        assert_eq!(
            texts(&run(&lines, 0)),
            vec!["SETLL *LOVAL CUSTMAST", "*IN50 = %EQUAL()"]
        );
    }
}
