//! Conversion runs.
//!
//! A run collects every statement touching the selected lines, converts
//! each one, and returns the results as plain data: one replace-range
//! edit per converted statement, the declarations and block closers to
//! insert elsewhere, and the diagnostics. Nothing is applied to the
//! source until [`apply_edits`] merges the whole batch, so a statement
//! that fails never leaves the member half converted.
//!
//! A failed statement is kept in fixed form behind a `// rpgfree:` note.
//! Opcodes without a free-form equivalent are kept silently and reported
//! as informational diagnostics.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::{debug, info, warn};

use crate::collect::{collect_range, name_fragment, next_declaration_line, CollectedStmt, Detail};
use crate::config::ConvertOptions;
use crate::convert::{convert_statement, Action, ConvertContext, Converted};
use crate::diagnostic::Diagnostic;
use crate::error::RpgError;
use crate::keylist::KeyListCache;
use crate::layout;
use crate::opcodes::typed_operands;
use crate::source::{
    col, has_embedded_sql, is_comment, is_directive, is_free_form, spec_type,
    SourceFormat, SpecType,
};
use crate::symbols::{ResolvedSymbols, SymbolResolver};

/// Replace source lines `start..=end` with `lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    /// Physical output lines; empty deletes the range.
    pub lines: Vec<String>,
}

/// Insert `lines` before source line `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// May equal the member length, meaning append.
    pub at: usize,
    pub lines: Vec<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    /// Disjoint edits in source order.
    pub edits: Vec<Edit>,
    /// Closers first, then declarations, each in request order.
    pub insertions: Vec<Insertion>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionResult {
    /// Any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Fixed-to-free converter.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the statements touching `selection` (0-based, inclusive),
    /// or the whole member when `selection` is `None`.
    ///
    /// Operand types are looked up through `resolver` one statement at a
    /// time, in source order.
    pub async fn convert<R: SymbolResolver>(
        &self,
        lines: &[String],
        selection: Option<RangeInclusive<usize>>,
        resolver: &R,
    ) -> ConversionResult {
        let mut result = ConversionResult::default();
        if lines.is_empty() {
            return result;
        }
        if SourceFormat::detect(lines) == SourceFormat::Free {
            info!("member is already **FREE; nothing to convert");
            return result;
        }

        let last = lines.len() - 1;
        let (from, to) = match selection {
            Some(range) => ((*range.start()).min(last), (*range.end()).min(last)),
            None => (0, last),
        };
        let keylists = KeyListCache::scan(lines);
        let sql_member = has_embedded_sql(lines);

        let mut closers: Vec<Insertion> = Vec::new();
        let mut declarations = Declarations::default();
        let mut converted_count = 0usize;

        for stmt in collect_range(lines, from, to) {
            let symbols = resolve_symbols(&stmt, resolver).await;
            let ctx = ConvertContext {
                options: &self.options,
                keylists: &keylists,
                lines,
                symbols: &symbols,
                sql_member,
            };
            let first = stmt.first_index();
            let last_line = stmt.last_index();

            let converted = match convert_statement(&stmt, &ctx) {
                Ok(converted) => converted,
                Err(err @ RpgError::UnsupportedOpcode { .. }) => {
                    debug!(line = first, error = %err, "left in fixed form");
                    result.diagnostics.push(Diagnostic::from(&err));
                    continue;
                }
                Err(err) => {
                    warn!(line = err.line(), code = err.code(), "statement passed through");
                    result.diagnostics.push(Diagnostic::from(&err));
                    result
                        .edits
                        .push(self.annotated(lines, &stmt, &err.to_string()));
                    continue;
                }
            };

            let Converted {
                action,
                declarations: extra,
                closer,
            } = converted;
            match action {
                Action::Keep => {}
                Action::Delete => result.edits.push(Edit {
                    start: first,
                    end: last_line,
                    lines: Vec::new(),
                }),
                Action::Replace(free) => {
                    converted_count += 1;
                    result.edits.push(Edit {
                        start: first,
                        end: last_line,
                        lines: layout::render(&free, &self.options),
                    });
                }
                Action::Annotate(note) => {
                    warn!(line = first, note = %note, "statement annotated");
                    result
                        .diagnostics
                        .push(Diagnostic::warning("annotated", note.clone(), first));
                    result.edits.push(self.annotated(lines, &stmt, &note));
                }
            }

            if let Some(closer) = closer {
                closers.push(Insertion {
                    at: closer_position(lines, last_line),
                    lines: layout::statement(&closer, &self.options),
                });
            }
            for decl in extra {
                if declarations.seen.insert(decl.name.to_ascii_uppercase()) {
                    let at = declaration_position(lines, first);
                    declarations.push(at, layout::statement(&decl.text, &self.options));
                }
            }
        }

        result.insertions = closers;
        result.insertions.extend(declarations.batches);
        info!(
            converted = converted_count,
            edits = result.edits.len(),
            insertions = result.insertions.len(),
            diagnostics = result.diagnostics.len(),
            "conversion finished"
        );
        result
    }

    /// The statement kept as written, behind a note.
    fn annotated(&self, lines: &[String], stmt: &CollectedStmt, note: &str) -> Edit {
        let start = stmt.first_index();
        let end = stmt.last_index();
        let mut out = vec![layout::annotation(note, &self.options)];
        out.extend(lines[start..=end].iter().cloned());
        Edit {
            start,
            end,
            lines: out,
        }
    }
}

/// Declarations grouped by insertion point, de-duplicated by name.
#[derive(Default)]
struct Declarations {
    seen: HashSet<String>,
    batches: Vec<Insertion>,
}

impl Declarations {
    fn push(&mut self, at: usize, lines: Vec<String>) {
        match self.batches.iter_mut().find(|b| b.at == at) {
            Some(batch) => batch.lines.extend(lines),
            None => self.batches.push(Insertion { at, lines }),
        }
    }
}

/// Look up the operand types a calculation needs. Lookups are awaited one
/// at a time.
async fn resolve_symbols<R: SymbolResolver>(stmt: &CollectedStmt, resolver: &R) -> ResolvedSymbols {
    let Detail::Calc(spec) = &stmt.detail else {
        return ResolvedSymbols::unavailable();
    };
    let names = typed_operands(spec);
    if names.is_empty() || !resolver.is_available() {
        return ResolvedSymbols::unavailable();
    }
    let mut symbols = ResolvedSymbols::available();
    for name in names {
        if let Some(info) = resolver.resolve(&name).await {
            symbols.insert(&name, info);
        }
    }
    symbols
}

/// A line that begins a new declaration or leaves the declaration
/// section: no `end-xx` may be placed past it.
fn is_declaration_boundary(lines: &[String], index: usize) -> bool {
    let line = &lines[index];
    if is_directive(line) {
        return col(line, 7, 12).eq_ignore_ascii_case("/ENDIF");
    }
    if spec_type(line) != Some(SpecType::Definition) {
        return true;
    }
    if name_fragment(line).is_some() {
        // A long name belongs to the first line after it that has no `...`.
        let mut next = next_declaration_line(lines, index);
        while let Some(i) = next {
            if name_fragment(&lines[i]).is_none() {
                return !col(&lines[i], 24, 25).is_empty();
            }
            next = next_declaration_line(lines, i);
        }
        return true;
    }
    !col(line, 24, 25).is_empty()
}

/// Where the closer of a block whose header ends at `last` goes.
fn closer_position(lines: &[String], last: usize) -> usize {
    let mut next = next_declaration_line(lines, last);
    while let Some(i) = next {
        if is_declaration_boundary(lines, i) {
            // Comments directly above the boundary stay with it.
            let mut at = i;
            while at > last + 1 && is_comment(&lines[at - 1]) {
                at -= 1;
            }
            return at;
        }
        next = next_declaration_line(lines, i);
    }
    lines.len()
}

/// A declaration-section line: an H, F or D spec, or a free-form
/// declaration.
fn is_declaration_line(line: &str) -> bool {
    match spec_type(line) {
        Some(SpecType::Control | SpecType::File | SpecType::Definition) => true,
        _ if is_free_form(line) => {
            let word = line.trim_start().to_ascii_lowercase();
            ["dcl-", "end-ds", "end-pr", "end-pi", "ctl-opt"]
                .iter()
                .any(|p| word.starts_with(p))
        }
        _ => false,
    }
}

/// Where a declaration requested by the statement at `index` goes: after
/// the nearest declaration line above it, or at the top of the member.
fn declaration_position(lines: &[String], index: usize) -> usize {
    (0..index)
        .rev()
        .find(|&i| is_declaration_line(&lines[i]))
        .map_or(0, |i| i + 1)
}

/// Merge a run's edits and insertions into a new member.
///
/// An insertion that falls inside an edited range moves to the end of
/// that range.
pub fn apply_edits(lines: &[String], result: &ConversionResult) -> Vec<String> {
    let mut edits: Vec<&Edit> = result.edits.iter().collect();
    edits.sort_by_key(|e| e.start);

    let mut insertions: Vec<(usize, &Insertion)> = result
        .insertions
        .iter()
        .map(|ins| {
            let at = edits
                .iter()
                .find(|e| e.start < ins.at && ins.at <= e.end)
                .map_or(ins.at, |e| e.end + 1);
            (at, ins)
        })
        .collect();
    insertions.sort_by_key(|(at, _)| *at);

    let mut out = Vec::with_capacity(lines.len());
    let mut pending = insertions.into_iter().peekable();
    let mut edits = edits.into_iter().peekable();
    let mut i = 0;
    while i <= lines.len() {
        while let Some((_, ins)) = pending.next_if(|(at, _)| *at <= i) {
            out.extend(ins.lines.iter().cloned());
        }
        if i == lines.len() {
            break;
        }
        match edits.next_if(|e| e.start == i) {
            Some(edit) => {
                out.extend(edit.lines.iter().cloned());
                i = edit.end + 1;
            }
            None => {
                out.push(lines[i].clone());
                i += 1;
            }
        }
    }
    out
}
