//! Calculation spec conversion.
//!
//! Compound conditions and `CASxx` chains render from their collected
//! structure; extended factor 2 operations are already expressions; every
//! other operation goes through the opcode table. Conditioning indicators
//! then wrap the result in `IF ... ENDIF`, except on the block opcodes,
//! where they join the block's own condition.

use super::{Action, ConvertContext, Converted, ExtraDecl, FreeLine};
use crate::collect::{extfactor2, CalcSpec, CollectedStmt, Detail};
use crate::error::{Result, RpgError};
use crate::opcode::is_unsupported_opcode;
use crate::opcodes::{convert_op, OpContext};
use crate::symbols::{result_field_info, DataType};

/// Opcodes whose extended factor 2 is a condition.
const CONDITION_OPENERS: &[&str] = &["IF", "DOW", "DOU", "WHEN", "ELSEIF"];

/// Block structure that a conditioning `IF` cannot be wrapped around.
const STRUCTURAL: &[&str] = &[
    "DO", "FOR", "END", "ENDDO", "ENDIF", "ENDSL", "ENDFOR", "ENDMON", "ENDCS", "ELSE", "OTHER",
    "SELECT", "MONITOR", "ON-ERROR", "BEGSR", "ENDSR",
];

pub fn convert(stmt: &CollectedStmt, ctx: &ConvertContext<'_>) -> Result<Converted> {
    match &stmt.detail {
        Detail::Boolean(block) => Ok(Converted::code(block.render())),
        Detail::Case(chain) => Ok(Converted::lines(
            chain.render().into_iter().map(FreeLine::Code).collect(),
        )),
        Detail::Calc(spec) => convert_calc(spec, ctx),
        Detail::None => Ok(Converted::keep()),
    }
}

fn convert_calc(spec: &CalcSpec, ctx: &ConvertContext<'_>) -> Result<Converted> {
    let name = spec.opcode.name.as_str();
    if is_unsupported_opcode(name) {
        return Err(RpgError::UnsupportedOpcode {
            line: spec.index,
            opcode: spec.opcode.to_string(),
        });
    }

    let (action, mut declarations) = if spec.extended {
        let text = match &spec.condition {
            Some(cond) if CONDITION_OPENERS.contains(&name) => {
                format!("{} ({cond}) and ({})", spec.opcode, spec.factor2)
            }
            _ => extfactor2::render(&spec.opcode, &spec.factor2),
        };
        (Action::Replace(vec![FreeLine::code(text)]), Vec::new())
    } else {
        let mut op_ctx = OpContext::new(ctx.options, ctx.keylists, ctx.lines, ctx.symbols);
        let action = convert_op(spec, &mut op_ctx)?;
        (action, op_ctx.declarations)
    };

    if name != "DEFINE" {
        if let Some(decl) = result_definition(spec) {
            declarations.insert(0, decl);
        }
    }

    let action = match (&spec.condition, action) {
        (Some(_), action) if spec.extended && CONDITION_OPENERS.contains(&name) => action,
        (Some(cond), Action::Replace(lines)) => {
            if STRUCTURAL.contains(&name) {
                Action::Annotate(format!(
                    "{} is conditioned by indicators; place the condition around the block by hand",
                    spec.opcode
                ))
            } else {
                Action::Replace(wrap_condition(cond, lines))
            }
        }
        (_, action) => action,
    };

    let mut converted = Converted::from(action);
    converted.declarations = declarations;
    Ok(converted)
}

/// `dcl-s` for a result field given a length on the operation line.
fn result_definition(spec: &CalcSpec) -> Option<ExtraDecl> {
    let info = result_field_info(spec)?;
    let length = info.length?;
    let text = match info.data_type {
        DataType::Packed => format!(
            "dcl-s {} packed({length}:{})",
            spec.result,
            info.decimals.unwrap_or(0)
        ),
        _ => format!("dcl-s {} char({length})", spec.result),
    };
    Some(ExtraDecl::new(spec.result.clone(), text))
}

fn wrap_condition(cond: &str, lines: Vec<FreeLine>) -> Vec<FreeLine> {
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(FreeLine::code(format!("IF {cond}")));
    out.extend(lines.into_iter().map(|line| match line {
        FreeLine::Code(text) => FreeLine::Code(format!("  {text}")),
        other => other,
    }));
    out.push(FreeLine::code("ENDIF"));
    out
}
