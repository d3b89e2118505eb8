//! Procedure spec conversion.

use super::dspec::{quote_name, split_keywords, Keyword};
use super::Converted;
use crate::collect::{name_fragment, CollectedStmt};
use crate::continuation::Joiner;
use crate::error::{Result, RpgError};
use crate::source::{col, raw_col, BODY_END};

fn quote_proc_keyword(kw: &Keyword) -> Keyword {
    if !(kw.is("EXPORT") || kw.is("EXTPROC")) {
        return kw.clone();
    }
    match kw.args.as_deref() {
        Some(args) => Keyword::new(&kw.name, Some(quote_name(args))),
        None => kw.clone(),
    }
}

/// `B` becomes `dcl-proc`, `E` becomes `end-proc`.
pub fn convert(stmt: &CollectedStmt) -> Result<Converted> {
    let pos = stmt
        .lines
        .iter()
        .position(|l| name_fragment(l).is_none())
        .unwrap_or(0);
    let Some(line) = stmt.lines.get(pos) else {
        return Ok(Converted::keep());
    };
    let name = stmt.entity_name.clone().unwrap_or_default();

    let mut joiner = Joiner::new();
    for l in &stmt.lines[pos..] {
        joiner.push(&raw_col(l, 44, BODY_END));
    }
    let keywords = split_keywords(&joiner.finish());

    match col(line, 24, 24).to_ascii_uppercase().as_str() {
        "B" => {
            let mut text = format!("dcl-proc {name}");
            for kw in &keywords {
                text.push(' ');
                text.push_str(&quote_proc_keyword(kw).to_string());
            }
            Ok(Converted::code(text))
        }
        "E" => Ok(Converted::code(if name.is_empty() {
            "end-proc".to_string()
        } else {
            format!("end-proc {name}")
        })),
        other => Err(RpgError::InvalidField {
            line: stmt.indexes.get(pos).copied().unwrap_or(0),
            field: "procedure boundary".to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_at;
    use crate::convert::{Action, FreeLine};

    fn p(name: &str, be: &str, kws: &str) -> String {
        format!("     P{:<15}  {:<1}{:19}{}", name, be, "", kws)
    }

    fn code(lines: &[String], index: usize) -> Action {
        let stmt = collect_at(lines, index).unwrap();
        convert(&stmt).unwrap().action
    }

    #[test]
    fn test_begin_and_end() {
        let lines = vec![p("GETCUST", "B", "EXPORT"), p("GETCUST", "E", ""), p("", "E", "")];
        assert_eq!(
            code(&lines, 0),
            Action::Replace(vec![FreeLine::code("dcl-proc GETCUST EXPORT")])
        );
        assert_eq!(
            code(&lines, 1),
            Action::Replace(vec![FreeLine::code("end-proc GETCUST")])
        );
        assert_eq!(code(&lines, 2), Action::Replace(vec![FreeLine::code("end-proc")]));
    }

    #[test]
    fn test_export_name_quoted() {
        let lines = vec![p("calc", "B", "EXPORT(calcTotal)"), p("X", "B", "EXTPROC('keep')")];
        assert_eq!(
            code(&lines, 0),
            Action::Replace(vec![FreeLine::code("dcl-proc calc EXPORT('CALCTOTAL')")])
        );
        assert_eq!(
            code(&lines, 1),
            Action::Replace(vec![FreeLine::code("dcl-proc X EXTPROC('keep')")])
        );
    }

    #[test]
    fn test_bad_boundary() {
        let lines = vec![p("X", "Q", "")];
        let stmt = collect_at(&lines, 0).unwrap();
        assert!(convert(&stmt).is_err());
    }
}
