//! Structured flow: `DO`, `END`/`ENDDO`/`ENDCS`, subroutines.
//!
//! Fixed form closes every block with `END` (or `ENDDO`/`ENDCS`), while
//! free form names the closer after the block kind. The closer is found by
//! a nesting-aware scan over the original lines, counting both fixed
//! operations and statements that were already free-form.

use super::{operands, OpContext};
use crate::collect::case::find_chain_start;
use crate::collect::cspec::line_opcode;
use crate::collect::free_code;
use crate::collect::CalcSpec;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};
use crate::opcode::{is_case_opcode, split_comparison};
use crate::source::{col, is_free_form};

/// Kind of an open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Counted `DO`, converted to `FOR`.
    Do,
    /// `DOW`/`DOU` and their `xx` forms.
    DoWhile,
    If,
    /// `SELECT` or a `CASxx` chain.
    Select,
    For,
    Monitor,
}

impl Block {
    /// Free-form closer.
    pub fn closer(self) -> &'static str {
        match self {
            Block::Do | Block::For => "ENDFOR",
            Block::DoWhile => "ENDDO",
            Block::If => "ENDIF",
            Block::Select => "ENDSL",
            Block::Monitor => "ENDMON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Open(Block),
    Close,
    Neutral,
}

fn marker_for(name: &str) -> Marker {
    let base = split_comparison(name).map_or(name, |(base, _)| base);
    match base {
        "DO" if base == name => Marker::Open(Block::Do),
        "DOW" | "DOU" => Marker::Open(Block::DoWhile),
        "IF" => Marker::Open(Block::If),
        "SELECT" => Marker::Open(Block::Select),
        "FOR" => Marker::Open(Block::For),
        "MONITOR" => Marker::Open(Block::Monitor),
        "END" | "ENDDO" | "ENDIF" | "ENDSL" | "ENDCS" | "ENDFOR" | "ENDMON" => Marker::Close,
        _ => Marker::Neutral,
    }
}

fn marker(lines: &[String], index: usize) -> Marker {
    let line = &lines[index];
    if let Some(op) = line_opcode(line) {
        if is_case_opcode(&op.name) {
            return if find_chain_start(lines, index) == index {
                Marker::Open(Block::Select)
            } else {
                Marker::Neutral
            };
        }
        return marker_for(&op.name);
    }
    if is_free_form(line) {
        let code = free_code(line).to_ascii_uppercase();
        let word = code
            .split(|c: char| c.is_whitespace() || c == ';' || c == '(')
            .next()
            .unwrap_or("");
        return marker_for(word);
    }
    Marker::Neutral
}

/// The innermost block open at `index`, and its opener line.
pub fn find_opener(lines: &[String], index: usize) -> Option<(usize, Block)> {
    let mut depth = 0usize;
    for i in (0..index).rev() {
        match marker(lines, i) {
            Marker::Close => depth += 1,
            Marker::Open(block) if depth == 0 => return Some((i, block)),
            Marker::Open(_) => depth -= 1,
            Marker::Neutral => {}
        }
    }
    None
}

/// The line closing the block opened at `index`.
pub fn find_closer(lines: &[String], index: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, _) in lines.iter().enumerate().skip(index + 1) {
        match marker(lines, i) {
            Marker::Open(_) => depth += 1,
            Marker::Close if depth == 0 => return Some(i),
            Marker::Close => depth -= 1,
            Marker::Neutral => {}
        }
    }
    None
}

/// Number of counted `DO` loops enclosing `index`.
fn do_depth(lines: &[String], index: usize) -> usize {
    let mut depth = 0usize;
    let mut count = 0;
    for i in (0..index).rev() {
        match marker(lines, i) {
            Marker::Close => depth += 1,
            Marker::Open(block) if depth == 0 => {
                if block == Block::Do {
                    count += 1;
                }
            }
            Marker::Open(_) => depth -= 1,
            Marker::Neutral => {}
        }
    }
    count
}

/// `DO` becomes a counted `FOR`. Without an index field a work variable
/// is declared, numbered by nesting depth.
pub fn do_loop(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let start = if spec.factor1.is_empty() { "1" } else { spec.factor1.as_str() };
    let limit = if spec.factor2.is_empty() { "1" } else { spec.factor2.as_str() };
    let index = if spec.result.is_empty() {
        let depth = do_depth(ctx.lines, spec.index);
        let name = if depth == 0 {
            ctx.options.temp_var2.clone()
        } else {
            format!("{}_{depth}", ctx.options.temp_var2)
        };
        ctx.work_int(&name)
    } else {
        spec.result.clone()
    };
    let step = find_closer(ctx.lines, spec.index)
        .map(|end| col(&ctx.lines[end], 36, 49))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "1".to_string());
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "FOR {index} = {start} to {limit} by {step}"
    ))]))
}

/// `END` and `ENDDO`: the closer of the innermost open block.
pub fn end(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    match find_opener(ctx.lines, spec.index) {
        Some((_, block)) => Ok(Action::Replace(vec![FreeLine::code(block.closer())])),
        None => Err(RpgError::UnmatchedEnd { line: spec.index }),
    }
}

pub fn endcs(_spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code("ENDSL")]))
}

pub fn begsr(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    if spec.factor1.is_empty() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: "BEGSR".to_string(),
            operand: "a subroutine name in factor 1".to_string(),
        });
    }
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "BEGSR {}",
        spec.factor1
    ))]))
}

/// `ENDSR`; a factor 1 label has no free-form use and is dropped.
pub fn endsr(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(operands(&[
        "ENDSR",
        &spec.factor2,
    ]))]))
}

pub fn exsr(spec: &CalcSpec, _ctx: &mut OpContext<'_>) -> Result<Action> {
    Ok(Action::Replace(vec![FreeLine::code(format!(
        "EXSR {}",
        spec.factor2
    ))]))
}
