//! Per-spec conversion of collected statements.
//!
//! Each converter turns one [`CollectedStmt`] into free-form lines. The
//! output is plain data: what to put in place of the statement, any work
//! variables that must be declared elsewhere, and the `end-xx` closer a
//! declaration block needs.

pub mod cspec;
pub mod dspec;
pub mod fspec;
pub mod hspec;
pub mod pspec;

use crate::collect::{CollectedStmt, StmtKind};
use crate::config::ConvertOptions;
use crate::error::Result;
use crate::keylist::KeyListCache;
use crate::source::{col, col_char, SpecType, BODY_END};
use crate::symbols::ResolvedSymbols;

/// One line of converted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreeLine {
    /// A statement; layout adds the margin and terminating `;`.
    Code(String),
    /// A `//` comment; layout adds the marker.
    Comment(String),
    /// Emitted exactly as given.
    Raw(String),
}

impl FreeLine {
    /// Shorthand for [`FreeLine::Code`].
    pub fn code(text: impl Into<String>) -> Self {
        FreeLine::Code(text.into())
    }

    /// Shorthand for [`FreeLine::Comment`].
    pub fn comment(text: impl Into<String>) -> Self {
        FreeLine::Comment(text.into())
    }

    /// The text without layout.
    pub fn text(&self) -> &str {
        match self {
            FreeLine::Code(t) | FreeLine::Comment(t) | FreeLine::Raw(t) => t,
        }
    }
}

/// What happens to the statement's source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace them with these lines.
    Replace(Vec<FreeLine>),
    /// Leave them untouched.
    Keep,
    /// Remove them.
    Delete,
    /// Keep them, preceded by a `// rpgfree:` note.
    Annotate(String),
}

/// A work variable or definition to insert in the declaration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraDecl {
    /// Declared name; declarations are de-duplicated on it.
    pub name: String,
    /// Free-form declaration without `;`.
    pub text: String,
}

impl ExtraDecl {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Result of converting one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub action: Action,
    pub declarations: Vec<ExtraDecl>,
    /// `end-ds`/`end-pr`/`end-pi` to insert after the block's last member.
    pub closer: Option<String>,
}

impl Converted {
    /// Replace the statement with these lines.
    pub fn lines(lines: Vec<FreeLine>) -> Self {
        Self::from(Action::Replace(lines))
    }

    /// Replace the statement with a single statement.
    pub fn code(text: impl Into<String>) -> Self {
        Self::lines(vec![FreeLine::code(text)])
    }

    /// Leave the statement alone.
    pub fn keep() -> Self {
        Self::from(Action::Keep)
    }

    /// Delete the statement.
    pub fn delete() -> Self {
        Self::from(Action::Delete)
    }

    /// Keep the statement with a note.
    pub fn annotate(note: impl Into<String>) -> Self {
        Self::from(Action::Annotate(note.into()))
    }

    pub fn with_closer(mut self, closer: impl Into<String>) -> Self {
        self.closer = Some(closer.into());
        self
    }
}

impl From<Action> for Converted {
    fn from(action: Action) -> Self {
        Self {
            action,
            declarations: Vec::new(),
            closer: None,
        }
    }
}

/// Everything a converter may consult.
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext<'a> {
    pub options: &'a ConvertOptions,
    pub keylists: &'a KeyListCache,
    /// The whole member, for scans beyond the statement.
    pub lines: &'a [String],
    /// Operand types resolved for this statement.
    pub symbols: &'a ResolvedSymbols,
    /// The member contains embedded SQL.
    pub sql_member: bool,
}

/// Convert one collected statement.
pub fn convert_statement(stmt: &CollectedStmt, ctx: &ConvertContext<'_>) -> Result<Converted> {
    let mut converted = match stmt.kind {
        StmtKind::Spec(SpecType::Control) => hspec::convert(stmt)?,
        StmtKind::Spec(SpecType::File) => fspec::convert(stmt, ctx)?,
        StmtKind::Spec(SpecType::Definition) => dspec::convert(stmt, ctx)?,
        StmtKind::Spec(SpecType::Procedure) => pspec::convert(stmt)?,
        StmtKind::Spec(SpecType::Calc) => cspec::convert(stmt, ctx)?,
        StmtKind::Comment => convert_comment(stmt),
        StmtKind::Directive => convert_directive(stmt, ctx),
        StmtKind::Sql => convert_sql(stmt),
        StmtKind::Spec(SpecType::Input | SpecType::Output)
        | StmtKind::Free
        | StmtKind::Empty
        | StmtKind::Other => Converted::keep(),
    };

    if let Action::Replace(lines) = &mut converted.action {
        if !matches!(stmt.kind, StmtKind::Comment) {
            lines.extend(stmt.comment_texts().map(FreeLine::comment));
        }
    }
    Ok(converted)
}

fn convert_comment(stmt: &CollectedStmt) -> Converted {
    let Some(line) = stmt.lines.first() else {
        return Converted::keep();
    };
    // Free-form `//` comments are already in their final form.
    if col_char(line, 7) != '*' {
        return Converted::keep();
    }
    let text = col(line, 8, BODY_END);
    Converted::lines(vec![FreeLine::comment(if text.is_empty() {
        String::new()
    } else {
        format!(" {text}")
    })])
}

fn convert_directive(stmt: &CollectedStmt, ctx: &ConvertContext<'_>) -> Converted {
    let Some(line) = stmt.lines.first() else {
        return Converted::keep();
    };
    let body = col(line, 7, BODY_END);
    let word = body
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    let opts = ctx.options;
    match word.as_str() {
        "/FREE" | "/END-FREE" if opts.remove_free_dir => Converted::delete(),
        "/EJECT" | "/SPACE" | "/TITLE" if opts.remove_old_dir => Converted::delete(),
        "/COPY" => {
            let replace = if ctx.sql_member {
                opts.replace_copy_in_sqlrpg
            } else {
                opts.replace_copy_in_rpg
            };
            if replace {
                let member = body[word.len()..].trim();
                Converted::lines(vec![FreeLine::Raw(format!("      /INCLUDE {member}"))])
            } else {
                Converted::keep()
            }
        }
        _ => Converted::keep(),
    }
}

fn convert_sql(stmt: &CollectedStmt) -> Converted {
    let mut parts: Vec<String> = Vec::new();
    for line in &stmt.lines {
        let text = col(line, 8, BODY_END);
        if text.to_ascii_uppercase().starts_with("END-EXEC") {
            continue;
        }
        if !text.is_empty() {
            parts.push(text);
        }
    }
    Converted::code(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_at;

    fn run(lines: &[&str], index: usize, opts: &ConvertOptions, sql: bool) -> Converted {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let keylists = KeyListCache::default();
        let symbols = ResolvedSymbols::unavailable();
        let ctx = ConvertContext {
            options: opts,
            keylists: &keylists,
            lines: &lines,
            symbols: &symbols,
            sql_member: sql,
        };
        let stmt = collect_at(&lines, index).unwrap();
        convert_statement(&stmt, &ctx).unwrap()
    }

    #[test]
    fn test_comment_conversion() {
        let opts = ConvertOptions::default();
        let out = run(&["     C* Read the file"], 0, &opts, false);
        assert_eq!(out.action, Action::Replace(vec![FreeLine::comment(" Read the file")]));
        let out = run(&["        // already free"], 0, &opts, false);
        assert_eq!(out.action, Action::Keep);
    }

    #[test]
    fn test_directives() {
        let mut opts = ConvertOptions::default();
        assert_eq!(run(&["      /FREE"], 0, &opts, false).action, Action::Delete);
        assert_eq!(run(&["      /EJECT"], 0, &opts, false).action, Action::Delete);
        assert_eq!(run(&["      /IF DEFINED(X)"], 0, &opts, false).action, Action::Keep);
        assert_eq!(run(&["      /COPY QCPYSRC,HDR"], 0, &opts, false).action, Action::Keep);

        opts.replace_copy_in_rpg = true;
        assert_eq!(
            run(&["      /COPY QCPYSRC,HDR"], 0, &opts, false).action,
            Action::Replace(vec![FreeLine::Raw("      /INCLUDE QCPYSRC,HDR".to_string())])
        );
        assert_eq!(run(&["      /COPY QCPYSRC,HDR"], 0, &opts, true).action, Action::Keep);

        opts.remove_free_dir = false;
        assert_eq!(run(&["      /END-FREE"], 0, &opts, false).action, Action::Keep);
    }

    #[test]
    fn test_sql_block() {
        let opts = ConvertOptions::default();
        let out = run(
            &[
                "     C/EXEC SQL",
                "     C+ SELECT NAME INTO :NAME",
                "     C+   FROM CUST WHERE ID = :ID",
                "     C/END-EXEC",
            ],
            0,
            &opts,
            true,
        );
        assert_eq!(
            out.action,
            Action::Replace(vec![FreeLine::code(
                "EXEC SQL SELECT NAME INTO :NAME FROM CUST WHERE ID = :ID"
            )])
        );
    }

    #[test]
    fn test_io_specs_kept() {
        let opts = ConvertOptions::default();
        let out = run(&["     ICUSTREC"], 0, &opts, false);
        assert_eq!(out.action, Action::Keep);
    }
}
