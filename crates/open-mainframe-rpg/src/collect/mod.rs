//! Statement collection.
//!
//! A logical statement in fixed-format RPG can span many physical lines:
//! long names split with `...`, keyword-area continuations, conditioning
//! indicator lines, extended factor 2 text and compound `IFxx`/`ANDxx`
//! conditions. Each spec letter has a collector that, given any line of a
//! statement, walks backward to its first line and then forward to its
//! last, returning the physical lines and their indexes.
//!
//! Full-line comments met while walking forward are held back and only
//! become part of the statement if a later line continues it; trailing
//! comments are released to whatever follows.

pub mod boolean;
pub mod case;
pub mod cspec;
pub mod dspec;
pub mod extfactor2;
pub mod fspec;
pub mod hspec;
pub mod pspec;

use std::ops::RangeInclusive;

use tracing::debug;

use crate::source::{
    col, comment_text, inline_comment, is_comment, is_directive, is_empty_stmt, is_free_form,
    is_skip_stmt, is_sql_continuation, is_sql_end, is_sql_start, raw_col, spec_type,
    SourceFormat, SpecType, BODY_END,
};

pub use boolean::{BooleanBlock, Clause, Connector};
pub use case::{CaseArm, CaseChain};
pub use cspec::CalcSpec;

/// What kind of statement was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
    /// An H, F, D, I, C, O or P specification.
    Spec(SpecType),
    /// A full-line comment.
    Comment,
    /// A compiler directive.
    Directive,
    /// An embedded SQL block.
    Sql,
    /// Code that is already free-form.
    Free,
    /// A line with no content.
    Empty,
    /// Anything unrecognized; always left as written.
    Other,
}

/// A comment captured inside a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedComment {
    /// Comment text without its marker.
    pub text: String,
    /// Source line holding the comment.
    pub index: usize,
    /// From the columns 81-100 area of a code line.
    pub inline: bool,
}

/// Structure recovered from a calculation statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// Nothing beyond the raw lines.
    None,
    /// A single operation, possibly with extended factor 2.
    Calc(CalcSpec),
    /// `IFxx`/`WHENxx`/`DOWxx`/`DOUxx` with `ANDxx`/`ORxx` lines.
    Boolean(BooleanBlock),
    /// A `CASxx` chain.
    Case(CaseChain),
}

/// One logical statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedStmt {
    /// Statement kind.
    pub kind: StmtKind,
    /// Physical code lines, in order.
    pub lines: Vec<String>,
    /// Source indexes of `lines`.
    pub indexes: Vec<usize>,
    /// Declared name for D and P specs, reassembled across `...` lines.
    pub entity_name: Option<String>,
    /// Comments inside the statement's span.
    pub comments: Vec<EmbeddedComment>,
    /// Calculation structure.
    pub detail: Detail,
}

impl CollectedStmt {
    pub(crate) fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            indexes: Vec::new(),
            entity_name: None,
            comments: Vec::new(),
            detail: Detail::None,
        }
    }

    pub(crate) fn single(kind: StmtKind, lines: &[String], index: usize) -> Self {
        let mut stmt = Self::new(kind);
        stmt.push_line(lines, index);
        stmt
    }

    pub(crate) fn push_line(&mut self, lines: &[String], index: usize) {
        let line = &lines[index];
        if let Some(text) = inline_comment(line) {
            self.comments.push(EmbeddedComment {
                text,
                index,
                inline: true,
            });
        }
        self.lines.push(line.clone());
        self.indexes.push(index);
    }

    pub(crate) fn push_comment(&mut self, lines: &[String], index: usize) {
        self.comments.push(EmbeddedComment {
            text: comment_text(&lines[index]),
            index,
            inline: false,
        });
    }

    /// First source line covered.
    pub fn first_index(&self) -> usize {
        self.indexes.first().copied().unwrap_or(0)
    }

    /// Last source line covered, embedded comments included.
    pub fn last_index(&self) -> usize {
        let code = self.indexes.last().copied().unwrap_or(0);
        self.comments
            .iter()
            .map(|c| c.index)
            .fold(code, usize::max)
    }

    /// Inclusive range of source lines this statement replaces.
    pub fn span(&self) -> RangeInclusive<usize> {
        self.first_index()..=self.last_index()
    }

    /// Spec letter, for spec statements.
    pub fn spec_type(&self) -> Option<SpecType> {
        match self.kind {
            StmtKind::Spec(spec) => Some(spec),
            _ => None,
        }
    }

    /// Embedded SQL block.
    pub fn is_sql(&self) -> bool {
        self.kind == StmtKind::Sql
    }

    /// Already-free code collected for passthrough.
    pub fn is_collected(&self) -> bool {
        self.kind == StmtKind::Free
    }

    /// Full-line comment texts, in order.
    pub fn comment_texts(&self) -> impl Iterator<Item = &str> {
        self.comments.iter().map(|c| c.text.as_str())
    }
}

/// Previous line that is not a full-line comment, stopping at directives
/// and empty lines.
pub(crate) fn prev_code_line(lines: &[String], index: usize) -> Option<usize> {
    let mut i = index;
    while i > 0 {
        i -= 1;
        let line = &lines[i];
        if is_comment(line) {
            continue;
        }
        if is_directive(line) || is_empty_stmt(line, SourceFormat::Fixed) {
            return None;
        }
        return Some(i);
    }
    None
}

/// Next line that is not a full-line comment, stopping at directives and
/// empty lines.
pub(crate) fn next_code_line(lines: &[String], index: usize) -> Option<usize> {
    let mut i = index + 1;
    while i < lines.len() {
        let line = &lines[i];
        if is_comment(line) {
            i += 1;
            continue;
        }
        if is_directive(line) || is_empty_stmt(line, SourceFormat::Fixed) {
            return None;
        }
        return Some(i);
    }
    None
}

/// Lines a declaration scan steps over: comments, empty lines and every
/// directive except `/ENDIF`, which ends the block a declaration may sit in.
pub(crate) fn is_declaration_filler(line: &str) -> bool {
    is_skip_stmt(line, SourceFormat::Fixed)
        && !(is_directive(line) && col(line, 7, 12).eq_ignore_ascii_case("/ENDIF"))
}

/// Next line after `index` that a declaration scan stops at.
pub(crate) fn next_declaration_line(lines: &[String], index: usize) -> Option<usize> {
    (index + 1..lines.len()).find(|&i| !is_declaration_filler(&lines[i]))
}

/// Previous line before `index` that a declaration scan stops at.
pub(crate) fn prev_declaration_line(lines: &[String], index: usize) -> Option<usize> {
    (0..index).rev().find(|&i| !is_declaration_filler(&lines[i]))
}

/// Attach lines after the statement's last line while `accept(prev, line)`
/// holds. Comments between accepted lines are embedded; comments after the
/// last accepted line are left out.
pub(crate) fn extend_forward<F>(stmt: &mut CollectedStmt, lines: &[String], mut accept: F)
where
    F: FnMut(&str, &str) -> bool,
{
    let Some(&last) = stmt.indexes.last() else {
        return;
    };
    let mut pending: Vec<usize> = Vec::new();
    let mut i = last + 1;
    while i < lines.len() {
        let line = &lines[i];
        if is_comment(line) {
            pending.push(i);
            i += 1;
            continue;
        }
        if is_directive(line) || is_empty_stmt(line, SourceFormat::Fixed) {
            break;
        }
        let prev = stmt.lines.last().map(String::as_str).unwrap_or("");
        if !accept(prev, line) {
            break;
        }
        for c in pending.drain(..) {
            stmt.push_comment(lines, c);
        }
        stmt.push_line(lines, i);
        i += 1;
    }
}

fn is_spec(line: &str, spec: SpecType) -> bool {
    spec_type(line) == Some(spec)
}

/// A `...`-terminated name fragment filling a D or P line.
pub(crate) fn name_fragment(line: &str) -> Option<String> {
    let body = col(line, 7, BODY_END);
    let head = body.strip_suffix("...")?;
    (!head.is_empty() && !head.contains(' ')).then(|| head.to_string())
}

/// Columns 7-43 blank, keyword area 44-80 not: a keyword continuation.
pub(crate) fn is_just_keywords(line: &str) -> bool {
    crate::source::is_blank(line, 7, 43) && !crate::source::is_blank(line, 44, BODY_END)
}

/// Collect a D or P statement: name fragments, the declaring line, then
/// keyword continuations.
pub(crate) fn collect_named(lines: &[String], index: usize, spec: SpecType) -> CollectedStmt {
    let mut first = index;

    // Keyword continuations belong to the declaration above them.
    while is_just_keywords(&lines[first]) {
        match prev_code_line(lines, first) {
            Some(p) if is_spec(&lines[p], spec) => first = p,
            _ => break,
        }
    }
    // Name fragments precede the declaring line.
    while let Some(p) = prev_code_line(lines, first) {
        if is_spec(&lines[p], spec) && name_fragment(&lines[p]).is_some() {
            first = p;
        } else {
            break;
        }
    }

    let mut stmt = CollectedStmt::single(StmtKind::Spec(spec), lines, first);
    extend_forward(&mut stmt, lines, |prev, line| {
        is_spec(line, spec) && (name_fragment(prev).is_some() || is_just_keywords(line))
    });

    let mut name = String::new();
    for line in &stmt.lines {
        match name_fragment(line) {
            Some(fragment) => name.push_str(&fragment),
            None => {
                name.push_str(&col(line, 7, 21));
                break;
            }
        }
    }
    stmt.entity_name = Some(name);
    debug!(
        first = stmt.first_index(),
        last = stmt.last_index(),
        name = stmt.entity_name.as_deref().unwrap_or(""),
        "collected declaration"
    );
    stmt
}

/// Code part of a free-form line, without any `//` comment.
pub(crate) fn free_code(line: &str) -> String {
    let body = raw_col(line, 8, BODY_END);
    let mut quoted = false;
    let mut prev = ' ';
    let mut end = body.len();
    for (pos, ch) in body.char_indices() {
        if ch == '\'' {
            quoted = !quoted;
        }
        if !quoted && ch == '/' && prev == '/' {
            end = pos - 1;
            break;
        }
        prev = ch;
    }
    body[..end].trim().to_string()
}

fn ends_free_statement(line: &str) -> bool {
    let code = free_code(line);
    code.ends_with(';') || code.is_empty()
}

fn collect_free(lines: &[String], index: usize) -> CollectedStmt {
    let mut first = index;
    while let Some(p) = prev_code_line(lines, first) {
        if is_free_form(&lines[p]) && !ends_free_statement(&lines[p]) {
            first = p;
        } else {
            break;
        }
    }
    let mut stmt = CollectedStmt::single(StmtKind::Free, lines, first);
    extend_forward(&mut stmt, lines, |prev, line| {
        is_free_form(line) && !ends_free_statement(prev)
    });
    stmt
}

fn collect_sql(lines: &[String], index: usize) -> CollectedStmt {
    let mut first = index;
    if !is_sql_start(&lines[first]) {
        while let Some(p) = prev_code_line(lines, first) {
            first = p;
            if !is_sql_continuation(&lines[p]) {
                break;
            }
        }
        if !is_sql_start(&lines[first]) {
            return CollectedStmt::single(StmtKind::Other, lines, index);
        }
    }
    let mut stmt = CollectedStmt::single(StmtKind::Sql, lines, first);
    extend_forward(&mut stmt, lines, |prev, line| {
        !is_sql_end(prev) && (is_sql_continuation(line) || is_sql_end(line))
    });
    stmt
}

/// Collect the statement containing line `index`.
///
/// Returns `None` when the line belongs to a statement whose boundaries
/// cannot be determined, e.g. an `ORxx` with no opener above it.
pub fn collect_at(lines: &[String], index: usize) -> Option<CollectedStmt> {
    let line = lines.get(index)?;
    if is_sql_start(line) || is_sql_continuation(line) || is_sql_end(line) {
        return Some(collect_sql(lines, index));
    }
    if is_comment(line) {
        return Some(CollectedStmt::single(StmtKind::Comment, lines, index));
    }
    if is_directive(line) {
        return Some(CollectedStmt::single(StmtKind::Directive, lines, index));
    }
    if is_empty_stmt(line, SourceFormat::Fixed) {
        return Some(CollectedStmt::single(StmtKind::Empty, lines, index));
    }
    if is_free_form(line) {
        return Some(collect_free(lines, index));
    }
    match spec_type(line) {
        Some(SpecType::Control) => Some(hspec::collect(lines, index)),
        Some(SpecType::File) => Some(fspec::collect(lines, index)),
        Some(SpecType::Definition) => Some(dspec::collect(lines, index)),
        Some(SpecType::Procedure) => Some(pspec::collect(lines, index)),
        Some(SpecType::Calc) => cspec::collect(lines, index),
        Some(spec @ (SpecType::Input | SpecType::Output)) => {
            Some(CollectedStmt::single(StmtKind::Spec(spec), lines, index))
        }
        None => Some(CollectedStmt::single(StmtKind::Other, lines, index)),
    }
}

/// Collect every statement touching the inclusive line range `from..=to`,
/// in order. No line belongs to two statements.
pub fn collect_range(lines: &[String], from: usize, to: usize) -> Vec<CollectedStmt> {
    let mut out = Vec::new();
    if lines.is_empty() {
        return out;
    }
    let to = to.min(lines.len() - 1);
    let mut i = collect_at(lines, from)
        .map(|s| s.first_index())
        .unwrap_or(from)
        .min(from);
    while i <= to {
        let stmt = match collect_at(lines, i) {
            Some(stmt) if stmt.first_index() == i => stmt,
            _ => CollectedStmt::single(StmtKind::Other, lines, i),
        };
        i = stmt.last_index() + 1;
        out.push(stmt);
    }
    out
}

/// Collect every statement of a member.
pub fn collect_all(lines: &[String]) -> Vec<CollectedStmt> {
    if lines.is_empty() {
        return Vec::new();
    }
    collect_range(lines, 0, lines.len() - 1)
}
