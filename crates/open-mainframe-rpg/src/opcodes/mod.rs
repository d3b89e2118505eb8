//! Per-opcode conversion.
//!
//! Every calculation opcode maps to one converter function in a static
//! table keyed on the base opcode name. A converter sees the split fields
//! of one [`CalcSpec`] and returns the free-form replacement. Resulting
//! indicators are handled afterwards by [`indicators::synthesize`], except
//! for the opcodes that set their indicators themselves.

pub mod arith;
pub mod bits;
pub mod datetime;
pub mod define;
pub mod file;
pub mod flow;
pub mod indicators;
pub mod lookup;
pub mod misc;
pub mod moves;
pub mod string;

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::collect::CalcSpec;
use crate::config::ConvertOptions;
use crate::convert::{Action, ExtraDecl, FreeLine};
use crate::error::Result;
use crate::keylist::KeyListCache;
use crate::opcode::{is_valid_opcode, Opcode};
use crate::symbols::{DataType, ResolvedSymbols, SymbolInfo};

/// State shared by the converters of one statement.
#[derive(Debug)]
pub struct OpContext<'a> {
    pub options: &'a ConvertOptions,
    pub keylists: &'a KeyListCache,
    /// The whole member.
    pub lines: &'a [String],
    pub symbols: &'a ResolvedSymbols,
    /// Work variables requested so far.
    pub declarations: Vec<ExtraDecl>,
}

impl<'a> OpContext<'a> {
    pub fn new(
        options: &'a ConvertOptions,
        keylists: &'a KeyListCache,
        lines: &'a [String],
        symbols: &'a ResolvedSymbols,
    ) -> Self {
        Self {
            options,
            keylists,
            lines,
            symbols,
            declarations: Vec::new(),
        }
    }

    /// Request a declaration; repeated names are ignored.
    pub fn declare(&mut self, name: &str, text: impl Into<String>) {
        if !self
            .declarations
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name))
        {
            self.declarations.push(ExtraDecl::new(name, text));
        }
    }

    /// Declare an `int(10)` work variable and return its name.
    pub fn work_int(&mut self, name: &str) -> String {
        self.declare(name, format!("dcl-s {name} int(10)"));
        name.to_string()
    }

    /// Type of an operand: literals are typed on sight, names come from
    /// the resolved symbols.
    pub fn operand_info(&self, operand: &str) -> Option<SymbolInfo> {
        let operand = operand.trim();
        if let Some(len) = literal_len(operand) {
            return Some(SymbolInfo::new(DataType::Char, Some(len), None));
        }
        if is_numeric_literal(operand) {
            let digits = operand.chars().filter(char::is_ascii_digit).count() as u32;
            let decimals = operand
                .split(['.', ','])
                .nth(1)
                .map_or(0, |d| d.len() as u32);
            return Some(SymbolInfo::new(DataType::Zoned, Some(digits), Some(decimals)));
        }
        self.symbols.get(operand).cloned()
    }
}

/// Signature of every opcode converter.
pub type OpFn = fn(&CalcSpec, &mut OpContext<'_>) -> Result<Action>;

static DISPATCH: LazyLock<HashMap<&'static str, OpFn>> = LazyLock::new(|| {
    let table: &[(&'static str, OpFn)] = &[
        ("ADD", arith::add),
        ("SUB", arith::sub),
        ("MULT", arith::mult),
        ("DIV", arith::div),
        ("Z-ADD", arith::z_add),
        ("Z-SUB", arith::z_sub),
        ("SQRT", arith::sqrt),
        ("XFOOT", arith::xfoot),
        ("MVR", arith::mvr),
        ("MOVE", moves::move_right),
        ("MOVEL", moves::move_left),
        ("MOVEA", moves::move_array),
        ("CAT", string::cat),
        ("SUBST", string::subst),
        ("SCAN", string::scan),
        ("CHECK", string::check),
        ("CHECKR", string::check),
        ("XLATE", string::xlate),
        ("TESTB", bits::testb),
        ("TESTN", bits::testn),
        ("TESTZ", bits::testz),
        ("BITON", bits::biton),
        ("BITOFF", bits::bitoff),
        ("LOOKUP", lookup::lookup),
        ("CHAIN", file::keyed),
        ("SETLL", file::keyed),
        ("SETGT", file::keyed),
        ("READE", file::keyed),
        ("READPE", file::keyed),
        ("DELETE", file::keyed),
        ("READ", file::record),
        ("READC", file::record),
        ("READP", file::record),
        ("WRITE", file::record),
        ("UPDATE", file::record),
        ("EXFMT", file::record),
        ("OPEN", file::record),
        ("CLOSE", file::record),
        ("UNLOCK", file::record),
        ("FEOD", file::record),
        ("EXTRCT", datetime::extrct),
        ("ADDDUR", datetime::adddur),
        ("SUBDUR", datetime::subdur),
        ("TIME", datetime::time),
        ("DO", flow::do_loop),
        ("END", flow::end),
        ("ENDDO", flow::end),
        ("ENDCS", flow::endcs),
        ("BEGSR", flow::begsr),
        ("ENDSR", flow::endsr),
        ("EXSR", flow::exsr),
        ("DEFINE", define::define),
        ("COMP", misc::comp),
        ("SETON", misc::seton),
        ("SETOFF", misc::setoff),
        ("OCCUR", misc::occur),
        ("ALLOC", misc::alloc),
        ("REALLOC", misc::realloc),
        ("SHTDN", misc::shtdn),
    ];
    table.iter().copied().collect()
});

/// Opcodes whose converters write their own indicator assignments.
const SELF_INDICATING: &[&str] = &[
    "LOOKUP", "TESTB", "TESTN", "TESTZ", "BITON", "BITOFF", "COMP", "SETON", "SETOFF", "SCAN",
    "CHECK", "CHECKR", "SHTDN",
];

/// Whether the generic resulting-indicator pass applies to `name`.
pub fn synthesizes_indicators(name: &str) -> bool {
    !SELF_INDICATING.contains(&name)
}

/// Convert one calculation operation.
pub fn convert_op(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let name = spec.opcode.name.as_str();
    let mut action = match DISPATCH.get(name) {
        Some(convert) => convert(spec, ctx)?,
        None => misc::passthrough(spec, ctx)?,
    };
    if synthesizes_indicators(name) {
        if let Action::Replace(lines) = &mut action {
            lines.extend(indicators::synthesize(spec));
        }
    }
    debug!(line = spec.index, opcode = %spec.opcode, "converted operation");
    Ok(action)
}

/// Operand names whose types `name`'s converter consults.
pub fn typed_operands(spec: &CalcSpec) -> Vec<String> {
    let names: Vec<&str> = match spec.opcode.name.as_str() {
        "MOVE" => vec![spec.factor2.as_str(), spec.result.as_str()],
        "SUBST" | "TIME" => vec![spec.result.as_str()],
        _ => Vec::new(),
    };
    names
        .into_iter()
        .filter(|n| !n.is_empty() && literal_len(n).is_none() && !is_numeric_literal(n))
        .filter(|n| !n.starts_with('*'))
        .map(str::to_string)
        .collect()
}

/// `target = expr`, carried by `EVAL(x)` when the opcode has extenders
/// such as half-adjust.
pub(crate) fn assign(opcode: &Opcode, target: &str, op: &str, expr: &str) -> String {
    let ext: String = opcode
        .extenders
        .iter()
        .filter(|c| matches!(**c, 'H' | 'M' | 'R'))
        .collect();
    if ext.is_empty() {
        format!("{target} {op} {expr}")
    } else {
        format!("EVAL({ext}) {target} {op} {expr}")
    }
}

/// Space-separated non-empty parts.
pub(crate) fn operands(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `a:b` at the first colon outside quotes and parentheses.
pub(crate) fn split_colon(text: &str) -> (String, Option<String>) {
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ':' if !quoted && depth == 0 => {
                return (
                    text[..i].trim().to_string(),
                    Some(text[i + 1..].trim().to_string()),
                );
            }
            _ => {}
        }
    }
    (text.trim().to_string(), None)
}

/// `*IN`, `*INxx`, `*IN(n)`, `*ON` or `*OFF`.
pub(crate) fn is_indicator(operand: &str) -> bool {
    let upper = operand.trim().to_ascii_uppercase();
    upper.starts_with("*IN") || upper == "*ON" || upper == "*OFF"
}

/// Figurative constants such as `*BLANKS` or `*ALL'x'`.
pub(crate) fn is_figurative(operand: &str) -> bool {
    let upper = operand.trim().to_ascii_uppercase();
    [
        "*BLANK", "*BLANKS", "*ZERO", "*ZEROS", "*HIVAL", "*LOVAL", "*NULL",
    ]
    .contains(&upper.as_str())
        || upper.starts_with("*ALL")
}

/// Unsigned or signed number, with optional decimal point.
pub(crate) fn is_numeric_literal(text: &str) -> bool {
    let t = text.trim();
    let t = t.strip_prefix(['-', '+']).unwrap_or(t);
    !t.is_empty()
        && t.chars().any(|c| c.is_ascii_digit())
        && t.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Content length of a quoted character literal.
pub(crate) fn literal_len(text: &str) -> Option<u32> {
    let inner = text.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'").chars().count() as u32)
}

/// `*INxx = expr`.
pub(crate) fn set_indicator(indicator: &str, expr: &str) -> FreeLine {
    FreeLine::code(format!("*IN{} = {expr}", indicator.trim().to_ascii_uppercase()))
}

/// The operation written out unchanged in free form: opcode then
/// operands in column order.
pub(crate) fn keyword_statement(spec: &CalcSpec, opcode: &Opcode) -> String {
    operands(&[
        opcode.to_string().as_str(),
        spec.factor1.as_str(),
        spec.factor2.as_str(),
        spec.result.as_str(),
    ])
}

/// Whether `name` is a known opcode at all.
pub(crate) fn is_known(name: &str) -> bool {
    is_valid_opcode(name)
}
