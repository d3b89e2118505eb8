//! `DEFINE`: definitions made in the calculation specs.
//!
//! Free form only declares in the declaration section, so the definition
//! moves there and the operation is left behind as a comment naming it.

use super::{split_colon, OpContext};
use crate::collect::CalcSpec;
use crate::convert::dspec::quote_name;
use crate::convert::{Action, FreeLine};
use crate::error::{Result, RpgError};

pub fn define(spec: &CalcSpec, ctx: &mut OpContext<'_>) -> Result<Action> {
    let kind = spec.factor1.to_ascii_uppercase();
    let name = spec.result.as_str();
    if name.is_empty() {
        return Err(RpgError::MissingOperand {
            line: spec.index,
            opcode: spec.opcode.to_string(),
            operand: "a result field".to_string(),
        });
    }
    let text = match kind.as_str() {
        "*LIKE" => like(spec),
        "*DTAARA" => data_area(spec),
        _ => {
            return Err(RpgError::InvalidField {
                line: spec.index,
                field: "DEFINE factor 1".to_string(),
                value: spec.factor1.clone(),
            })
        }
    };
    ctx.declare(name, text);
    Ok(Action::Replace(vec![FreeLine::comment(format!(
        " {} {} {} {}: moved to declarations",
        spec.opcode, spec.factor1, spec.factor2, name
    ))]))
}

fn like(spec: &CalcSpec) -> String {
    if spec.length.is_empty() {
        format!("dcl-s {} LIKE({})", spec.result, spec.factor2)
    } else {
        format!("dcl-s {} LIKE({} : {})", spec.result, spec.factor2, spec.length)
    }
}

/// `*DTAARA`: factor 2 names the data area, defaulting to the result
/// field. Without a length the result is a data structure defined
/// elsewhere.
fn data_area(spec: &CalcSpec) -> String {
    let (target, _) = split_colon(&spec.result);
    let area = if spec.factor2.is_empty() {
        quote_name(&target)
    } else {
        quote_name(&spec.factor2)
    };
    match spec.length.parse::<u32>() {
        Ok(len) if spec.decimals.is_empty() => {
            format!("dcl-s {target} char({len}) DTAARA({area})")
        }
        Ok(len) => format!(
            "dcl-s {target} packed({len} : {}) DTAARA({area})",
            spec.decimals
        ),
        Err(_) => format!("dcl-ds {target} DTAARA({area}) end-ds"),
    }
}
