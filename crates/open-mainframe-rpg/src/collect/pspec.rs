//! Procedure spec collection; same shape as a definition.

use super::{collect_named, CollectedStmt};
use crate::source::SpecType;

/// Collect the procedure boundary containing line `index`.
pub fn collect(lines: &[String], index: usize) -> CollectedStmt {
    collect_named(lines, index, SpecType::Procedure)
}
