//! Control spec conversion.

use super::Converted;
use crate::collect::CollectedStmt;
use crate::continuation::Joiner;
use crate::error::Result;
use crate::source::{raw_col, BODY_END};

/// Join every H line into one `ctl-opt` statement.
pub fn convert(stmt: &CollectedStmt) -> Result<Converted> {
    let mut joiner = Joiner::new();
    for line in &stmt.lines {
        joiner.push(&raw_col(line, 7, BODY_END));
    }
    let text = joiner.finish();
    if text.is_empty() {
        return Ok(Converted::delete());
    }
    let has_prefix = text
        .get(..7)
        .is_some_and(|p| p.eq_ignore_ascii_case("ctl-opt"));
    Ok(Converted::code(if has_prefix {
        text
    } else {
        format!("ctl-opt {text}")
    }))
}
