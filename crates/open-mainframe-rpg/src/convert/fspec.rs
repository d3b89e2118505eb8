//! File spec conversion.
//!
//! | Columns | Field                                        |
//! |---------|----------------------------------------------|
//! | 7-16    | file name                                    |
//! | 17      | type: `I`, `O`, `U`, `C`                     |
//! | 18      | designation: `F` full procedural, `P`/`S`... |
//! | 20      | `A` record addition                          |
//! | 22      | format: `E` external, `F` program described  |
//! | 23-27   | record length                                |
//! | 29-33   | key length                                   |
//! | 34      | record address type (`K`, `A`)               |
//! | 36-42   | device                                       |
//! | 44-80   | keywords                                     |

use super::{ConvertContext, Converted};
use crate::collect::CollectedStmt;
use crate::error::{Result, RpgError};
use crate::source::{col, col_char, BODY_END};

/// Convert a file description to `dcl-f`.
pub fn convert(stmt: &CollectedStmt, ctx: &ConvertContext<'_>) -> Result<Converted> {
    let Some(line) = stmt.lines.first() else {
        return Ok(Converted::keep());
    };
    let index = stmt.first_index();
    let name = col(line, 7, 16);
    let file_type = col_char(line, 17).to_ascii_uppercase();
    let designation = col_char(line, 18).to_ascii_uppercase();
    let addition = col_char(line, 20).eq_ignore_ascii_case(&'A');
    let external = col_char(line, 22).eq_ignore_ascii_case(&'E');
    let record_length = col(line, 23, 27);
    let key_length = col(line, 29, 33);
    let address_type = col_char(line, 34).to_ascii_uppercase();
    let device = col(line, 36, 42).to_ascii_uppercase();

    if matches!(designation, 'P' | 'S' | 'R' | 'T') {
        return Ok(Converted::annotate(format!(
            "{name}: cycle file designation '{designation}' has no free-form equivalent"
        )));
    }

    let mut usage: Vec<&str> = match file_type {
        'I' => vec!["*input"],
        'O' => vec!["*output"],
        'U' => vec!["*update", "*delete"],
        'C' => vec!["*input", "*output"],
        other => {
            return Err(RpgError::InvalidField {
                line: index,
                field: "file type".to_string(),
                value: other.to_string(),
            })
        }
    };
    if addition && !usage.contains(&"*output") {
        usage.push("*output");
    }

    let device = if device.is_empty() { "DISK".to_string() } else { device };
    let mut text = format!("dcl-f {name} ");
    if external {
        if ctx.options.add_ext_dev_flag {
            text.push_str(&format!("{device}(*EXT)"));
        } else {
            text.push_str(&device);
        }
    } else if record_length.is_empty() {
        text.push_str(&device);
    } else {
        text.push_str(&format!("{device}({record_length})"));
    }
    text.push_str(&format!(" usage({})", usage.join(":")));

    match address_type {
        'K' if external || key_length.is_empty() => text.push_str(" KEYED"),
        'K' | 'A' if !key_length.is_empty() => {
            text.push_str(&format!(" KEYED(*CHAR:{key_length})"))
        }
        _ => {}
    }

    let keywords: Vec<String> = stmt
        .lines
        .iter()
        .map(|l| col(l, 44, BODY_END))
        .filter(|k| !k.is_empty())
        .collect();
    if !keywords.is_empty() {
        text.push(' ');
        text.push_str(&keywords.join(" "));
    }
    Ok(Converted::code(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_at;
    use crate::config::ConvertOptions;
    use crate::convert::Action;
    use crate::keylist::KeyListCache;
    use crate::symbols::ResolvedSymbols;

    /// Column-exact file line.
    #[allow(clippy::too_many_arguments)]
    fn f(
        name: &str,
        ftype: &str,
        desig: &str,
        add: &str,
        format: &str,
        reclen: &str,
        keylen: &str,
        addr: &str,
        device: &str,
        kws: &str,
    ) -> String {
        format!(
            "     F{:<10}{:1}{:1} {:1} {:1}{:>5} {:>5}{:1} {:<7} {}",
            name, ftype, desig, add, format, reclen, keylen, addr, device, kws
        )
    }

    fn run(lines: &[String], opts: &ConvertOptions) -> Action {
        let keylists = KeyListCache::default();
        let symbols = ResolvedSymbols::unavailable();
        let ctx = ConvertContext {
            options: opts,
            keylists: &keylists,
            lines,
            symbols: &symbols,
            sql_member: false,
        };
        let stmt = collect_at(lines, 0).unwrap();
        convert(&stmt, &ctx).unwrap().action
    }

    fn text(action: Action) -> String {
        match action {
            Action::Replace(lines) => lines[0].text().to_string(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_external_keyed_input() {
        let opts = ConvertOptions::default();
        let lines = vec![f("CUSTMAST", "I", "F", "", "E", "", "", "K", "DISK", "")];
        assert_eq!(
            text(run(&lines, &opts)),
            "dcl-f CUSTMAST DISK(*EXT) usage(*input) KEYED"
        );
    }

    #[test]
    fn test_update_with_addition_and_keywords() {
        let opts = ConvertOptions::default();
        let lines = vec![
            f("ORDERS", "U", "F", "A", "E", "", "", "K", "DISK", "RENAME(ORDREC:OREC)"),
            format!("     F{:37}{}", "", "PREFIX(O_)"),
        ];
        assert_eq!(
            text(run(&lines, &opts)),
            "dcl-f ORDERS DISK(*EXT) usage(*update:*delete:*output) KEYED RENAME(ORDREC:OREC) PREFIX(O_)"
        );
    }

    #[test]
    fn test_program_described_printer() {
        let mut opts = ConvertOptions::default();
        opts.add_ext_dev_flag = false;
        let lines = vec![f("QPRINT", "O", "F", "", "F", "132", "", "", "PRINTER", "OFLIND(*INOF)")];
        assert_eq!(
            text(run(&lines, &opts)),
            "dcl-f QPRINT PRINTER(132) usage(*output) OFLIND(*INOF)"
        );
        let lines = vec![f("DSPF", "C", "F", "", "E", "", "", "", "WORKSTN", "")];
        assert_eq!(text(run(&lines, &opts)), "dcl-f DSPF WORKSTN usage(*input:*output)");
    }

    #[test]
    fn test_program_described_keyed() {
        let opts = ConvertOptions::default();
        let lines = vec![f("WORK", "I", "F", "", "F", "100", "10", "K", "DISK", "")];
        assert_eq!(
            text(run(&lines, &opts)),
            "dcl-f WORK DISK(100) usage(*input) KEYED(*CHAR:10)"
        );
    }

    #[test]
    fn test_cycle_file_annotated() {
        let opts = ConvertOptions::default();
        let lines = vec![f("INPUT", "I", "P", "", "E", "", "", "", "DISK", "")];
        assert!(matches!(run(&lines, &opts), Action::Annotate(_)));
    }
}
